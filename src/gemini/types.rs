//! Wire types for Gemini `generateContent` replies.
//!
//! Decoding is tolerant: missing arrays and objects decode as empty so that
//! callers can tell an empty reply apart from a malformed one.

use serde::{Deserialize, Serialize};

/// Top-level reply from the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelReply {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

/// One candidate completion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

/// Content block of a candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// A single content part. Only text parts are produced for this service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Part {
    /// Returns the text of this part, or an empty string for non-text parts.
    pub fn as_text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

impl ModelReply {
    /// Builds a reply with a single candidate holding a single text part.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            candidates: vec![Candidate {
                content: Some(Content {
                    parts: vec![Part {
                        text: Some(text.into()),
                    }],
                }),
            }],
        }
    }

    /// Returns the first content part of the first candidate, if any.
    pub fn first_part(&self) -> Option<&Part> {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .and_then(|content| content.parts.first())
    }
}
