//! Per-value repair decision

use crate::sanitize::sanitize;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// What should happen to a fetched value
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// Parses as is; must not be touched
    AlreadyValid,
    /// Broken in a known way and parses once sanitized
    Fixable {
        /// Sanitized text that parsed
        sanitized: String,
        /// Parsed document, re-serialized on write-back
        parsed: Value,
    },
    /// Cannot be repaired automatically
    Invalid(InvalidReason),
}

impl Classification {
    /// Canonical compact text to write back, if the value is fixable
    ///
    /// Object members keep their original order.
    #[must_use]
    pub fn canonical_text(&self) -> Option<String> {
        match self {
            Classification::Fixable { parsed, .. } => Some(parsed.to_string()),
            _ => None,
        }
    }
}

/// Why a value was left broken
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvalidReason {
    /// Sanitization removed nothing, so the damage is of another kind
    SanitizeNoop {
        /// Error from the strict parse of the raw value
        parse_error: String,
    },
    /// Sanitization changed the text but it still does not parse
    StillBroken {
        /// Error from the parse of the sanitized value
        parse_error: String,
    },
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::SanitizeNoop { parse_error } => {
                write!(f, "sanitization made no changes ({parse_error})")
            }
            InvalidReason::StillBroken { parse_error } => {
                write!(f, "still invalid after sanitization: {parse_error}")
            }
        }
    }
}

/// Decide whether `raw` is valid, fixable or beyond repair
#[must_use]
pub fn classify(raw: &str) -> Classification {
    let first_error = match serde_json::from_str::<Value>(raw) {
        Ok(_) => return Classification::AlreadyValid,
        Err(e) => e,
    };

    let sanitized = sanitize(raw);
    if sanitized.as_ref() == raw {
        return Classification::Invalid(InvalidReason::SanitizeNoop {
            parse_error: first_error.to_string(),
        });
    }

    match serde_json::from_str::<Value>(&sanitized) {
        Ok(parsed) => Classification::Fixable {
            sanitized: sanitized.into_owned(),
            parsed,
        },
        Err(e) => Classification::Invalid(InvalidReason::StillBroken {
            parse_error: e.to_string(),
        }),
    }
}
