use once_cell::sync::Lazy;
use regex::Regex;

static INTERRUPT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(stop|wait|hold\s+on|pause|cancel|never\s*mind|shut\s+up|be\s+quiet|enough)\b",
    )
    .expect("static regex")
});

/// Whether a (partial) transcript asks the avatar to stop talking.
pub fn detect_interrupt(text: &str) -> bool {
    INTERRUPT.is_match(text)
}
