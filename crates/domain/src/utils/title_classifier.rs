//! Meeting title classifier.
//!
//! Maps a raw calendar event title to one of three outcomes:
//! - not a meeting (`is_meeting = false`)
//! - an internal meeting (`is_meeting = true`, no client name)
//! - a client meeting with the captured client name
//!
//! Internal keywords are checked first so a title such as
//! "Reunião de Liderança" is never read as a meeting with client
//! "Liderança". Client patterns are then tried in a fixed order, first match
//! wins. Matching is case-insensitive and whole-word; the captured name is
//! returned with its original casing.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::MIN_CLIENT_NAME_CHARS;

/// Words that mark a meeting as internal. Portuguese and English.
const INTERNAL_KEYWORDS: &[&str] = &[
    "leadership",
    "team",
    "internal",
    "board",
    "one-on-one",
    "onboarding",
    "standup",
    "retro",
    "lideranca",
    "liderança",
    "equipe",
    "time",
    "interna",
    "interno",
    "diretoria",
    "gestão",
    "gestao",
];

/// Client-meeting lead words, in priority order. More specific phrasings
/// come first so generic ones do not shadow them.
const CLIENT_PATTERN_KEYWORDS: &[&[&str]] = &[
    &["apresentação", "apresentacao", "presentation"],
    &["demonstração", "demonstracao", "demo"],
    &["visita", "visit"],
    &["reunião", "reuniao", "meeting"],
    &["call", "ligação", "ligacao"],
];

/// Optional connector between the lead word and the client name. Matched
/// lower-case only, so a capitalised "Da"/"De" stays part of a surname.
const PREPOSITIONS: &str = "com|with|de|do|da|dos|das|para|pra|na|no|at|for|to";

const BRACKETS: &[char] = &['[', ']', '(', ')', '{', '}', '<', '>'];

#[allow(clippy::expect_used)]
static INTERNAL_REGEX: Lazy<Regex> = Lazy::new(|| {
    let alternation = INTERNAL_KEYWORDS.iter().map(|k| regex::escape(k)).collect::<Vec<_>>().join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternation})\b"))
        .expect("INTERNAL_REGEX should compile - this is a bug")
});

#[allow(clippy::expect_used)]
static CLIENT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    CLIENT_PATTERN_KEYWORDS
        .iter()
        .map(|keywords| {
            let alternation = keywords.iter().map(|k| regex::escape(k)).collect::<Vec<_>>().join("|");
            Regex::new(&format!(
                r"(?i)\b(?:{alternation})\b[\s:\-–|]*(?:(?-i:{PREPOSITIONS})(?:\s+|$))?(.*)$"
            ))
            .expect("client pattern should compile - this is a bug")
        })
        .collect()
});

/// Classification of an event title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleClassification {
    pub is_meeting: bool,
    pub client_name: Option<String>,
}

impl TitleClassification {
    const fn not_meeting() -> Self {
        Self { is_meeting: false, client_name: None }
    }

    const fn internal() -> Self {
        Self { is_meeting: true, client_name: None }
    }

    /// True when the title names a client and should become a lead.
    #[must_use]
    pub const fn is_lead(&self) -> bool {
        self.is_meeting && self.client_name.is_some()
    }
}

/// Classify a calendar event title.
///
/// # Examples
/// ```
/// use leadflow_domain::classify_event_title;
///
/// let result = classify_event_title("Reunião Ana Silva");
/// assert_eq!(result.client_name.as_deref(), Some("Ana Silva"));
///
/// assert!(!classify_event_title("Reunião de Equipe").is_lead());
/// assert!(!classify_event_title("Almoço").is_meeting);
/// ```
#[must_use]
pub fn classify_event_title(title: &str) -> TitleClassification {
    let title = title.trim();
    if title.is_empty() {
        return TitleClassification::not_meeting();
    }

    if INTERNAL_REGEX.is_match(title) {
        return TitleClassification::internal();
    }

    for pattern in CLIENT_PATTERNS.iter() {
        if let Some(captures) = pattern.captures(title) {
            let raw = captures.get(1).map_or("", |m| m.as_str());
            return TitleClassification {
                is_meeting: true,
                client_name: clean_client_name(raw),
            };
        }
    }

    TitleClassification::not_meeting()
}

fn clean_client_name(raw: &str) -> Option<String> {
    let stripped: String = raw.trim().chars().filter(|c| !BRACKETS.contains(c)).collect();
    let name = stripped.trim();
    (name.chars().count() >= MIN_CLIENT_NAME_CHARS).then(|| name.to_string())
}
