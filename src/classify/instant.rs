//! Canned replies for common conversational phrases.

use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;

use crate::cache::normalize_query;

const INSTANT_RESPONSES: &[(&str, &[&str])] = &[
    (
        "hello",
        &[
            "Hey there! How can I help you today?",
            "Hi! What's on your mind?",
            "Hello! Great to chat with you.",
        ],
    ),
    (
        "hi",
        &[
            "Hi! What can I do for you?",
            "Hey! How's it going?",
            "Hi there! What's up?",
        ],
    ),
    (
        "hey",
        &[
            "Hey! What can I help you with?",
            "Hey there! What's on your mind?",
            "Hey! Nice to hear from you.",
        ],
    ),
    (
        "good morning",
        &[
            "Good morning! Hope you're having a great day. What can I help with?",
            "Morning! How can I assist you today?",
            "Good morning! What's up?",
        ],
    ),
    (
        "good afternoon",
        &[
            "Good afternoon! How can I help you?",
            "Afternoon! What can I do for you?",
            "Good afternoon! What's on your mind?",
        ],
    ),
    (
        "good evening",
        &[
            "Good evening! How can I help you tonight?",
            "Evening! What can I do for you?",
            "Good evening! What brings you here?",
        ],
    ),
    (
        "thank you",
        &[
            "You're welcome! Let me know if you need anything else.",
            "Happy to help! Anything else?",
            "No problem at all!",
        ],
    ),
    ("thanks", &["You're welcome!", "No problem!", "Anytime!"]),
    (
        "bye",
        &[
            "Goodbye! Have a great day!",
            "See you later! Take care!",
            "Bye! Feel free to come back anytime.",
        ],
    ),
    (
        "goodbye",
        &[
            "Goodbye! Take care!",
            "See you! Have a wonderful day!",
            "Bye for now!",
        ],
    ),
    (
        "how are you",
        &[
            "I'm doing great, thanks for asking! How about you?",
            "I'm good! What can I help you with today?",
            "Doing well, thanks! What's on your mind?",
        ],
    ),
    (
        "what's up",
        &[
            "Not much, just here to help! What do you need?",
            "Hey! I'm ready to assist. What's going on?",
            "All good here! What can I do for you?",
        ],
    ),
    (
        "whats up",
        &[
            "Not much! What can I help you with?",
            "Hey! What's going on?",
            "All good! What do you need?",
        ],
    ),
];

static TABLE: Lazy<HashMap<&'static str, &'static [&'static str]>> =
    Lazy::new(|| INSTANT_RESPONSES.iter().copied().collect());

/// Canned reply for an exact (normalized) match, chosen uniformly at random.
///
/// Only whole-utterance matches count: "hi" hits, "tell me about hi-fi" does not.
pub fn lookup_instant(transcript: &str) -> Option<String> {
    lookup_instant_with(transcript, &mut rand::thread_rng())
}

pub fn lookup_instant_with<R: Rng + ?Sized>(transcript: &str, rng: &mut R) -> Option<String> {
    let replies = candidates(transcript)?;
    replies.choose(rng).map(|s| s.to_string())
}

/// All canned replies for `transcript`, if it is a known phrase.
pub fn candidates(transcript: &str) -> Option<&'static [&'static str]> {
    TABLE.get(normalize_query(transcript).as_str()).copied()
}

pub fn is_instant_phrase(transcript: &str) -> bool {
    candidates(transcript).is_some()
}
