//! Rule-based cleanup of model output for text-to-speech.

use once_cell::sync::Lazy;
use regex::Regex;

/// One pattern substitution over the whole text.
#[derive(Debug, Clone)]
pub struct SanitizeRule {
    pub name: &'static str,
    pattern: Regex,
    replacement: &'static str,
}

impl SanitizeRule {
    /// Compile a rule. `replacement` may reference capture groups (`$1`).
    pub fn new(
        name: &'static str,
        pattern: &str,
        replacement: &'static str,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            name,
            pattern: Regex::new(pattern)?,
            replacement,
        })
    }

    fn apply(&self, text: &str) -> String {
        self.pattern.replace_all(text, self.replacement).into_owned()
    }
}

// Order matters: links before bare URLs, and attribution lines only after
// markup and lead-in phrases are gone so they sit at the start of their line.
const DEFAULT_RULES: &[(&str, &str, &str)] = &[
    ("markdown_link", r"\[([^\]]+)\]\([^)]+\)", "$1"),
    ("http_url", r#"(?i)https?://[^\s\])},"]*[^\s\])},".!?;:]"#, ""),
    ("www_url", r#"(?i)www\.[^\s\])},"]*[^\s\])},".!?;:]"#, ""),
    ("numeric_citation", r"\[\d+\]", ""),
    ("source_citation", r"(?i)\[source\d*\]", ""),
    ("citation_marker", r"(?i)\[citation[^\]]*\]", ""),
    ("ref_marker", r"(?i)\[ref[^\]]*\]", ""),
    ("source_paren", r"(?i)\(source[^)]*\)", ""),
    ("according_to", r"(?i)according to [^,.]+[,.]", ""),
    (
        "based_on_search",
        r"(?i)based on (my |the |our )?(search|research|findings)[^,.]*[,.]",
        "",
    ),
    ("i_found", r"(?i)\bI found (that |information |out )?", ""),
    (
        "from_what_i_found",
        r"(?i)from what I('ve| have)? (found|gathered|learned)[^,.]*[,.]",
        "",
    ),
    ("code_fence", r"(?s)```.*?```", ""),
    ("bold", r"\*\*([^*]+)\*\*", "$1"),
    ("italic", r"\*([^*\s][^*\n]*)\*", "$1"),
    ("bold_underscore", r"__([^_]+)__", "$1"),
    ("italic_underscore", r"\b_([^_\n]+)_\b", "$1"),
    ("inline_code", r"`([^`]+)`", "$1"),
    ("heading", r"(?m)^[ \t]*#+\s+", ""),
    ("bullet", r"(?m)^[ \t]*[-•*][ \t]+", ""),
    ("numbered_item", r"(?m)^[ \t]*\d+\.[ \t]+", ""),
    (
        "source_line",
        r"(?im)^[ \t]*(source|reference|citation|link|url)s?:.*$",
        "",
    ),
    (
        "read_more_line",
        r"(?im)^[ \t]*(learn more|read more|visit|check out|see more|more info) at.*$",
        "",
    ),
    ("more_info_line", r"(?im)^[ \t]*for more (information|details).*$", ""),
    ("hashtag", r"#\w+", ""),
    ("empty_parens", r"\(\s*\)", ""),
    ("empty_brackets", r"\[\s*\]", ""),
    ("space_before_punct", r"\s+([.,!?;:])", "$1"),
];

static DEFAULT_SANITIZER: Lazy<VoiceSanitizer> = Lazy::new(VoiceSanitizer::new);
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

/// Turns raw model text into something an avatar can read aloud.
///
/// Pure and total: any input produces a string, empty input produces `""`.
#[derive(Debug, Clone)]
pub struct VoiceSanitizer {
    rules: Vec<SanitizeRule>,
}

impl VoiceSanitizer {
    pub fn new() -> Self {
        let rules = DEFAULT_RULES
            .iter()
            .map(|(name, pattern, replacement)| {
                SanitizeRule::new(name, pattern, replacement).expect("built-in sanitize rule")
            })
            .collect();
        Self { rules }
    }

    /// Append a rule that runs after the built-in ones and before whitespace collapsing.
    pub fn with_rule(mut self, rule: SanitizeRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.name)
    }

    pub fn sanitize(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return String::new();
        }

        let mut out = text.to_string();
        for rule in &self.rules {
            out = rule.apply(&out);
        }
        // Rules above can leave " ," behind once the removed phrase is gone.
        out = collapse_repeated_punctuation(&out);
        out = WHITESPACE.replace_all(&out, " ").into_owned();
        let trimmed = out.trim();
        trimmed.to_string()
    }
}

impl Default for VoiceSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

/// "!!" -> "!", "..." -> "."; mixed runs like "?!" are kept.
fn collapse_repeated_punctuation(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev: Option<char> = None;
    for c in text.chars() {
        if matches!(c, '.' | ',' | '!' | '?' | ';' | ':') && prev == Some(c) {
            continue;
        }
        out.push(c);
        prev = Some(c);
    }
    out
}

/// Sanitize with the built-in rule set.
pub fn sanitize_for_voice(text: &str) -> String {
    DEFAULT_SANITIZER.sanitize(text)
}
