//! Types for structured model answers.

use serde::{Deserialize, Deserializer, Serialize};

/// An article the model considers relevant to the question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelevantArticle {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
}

impl RelevantArticle {
    /// Creates a new relevant-article reference.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// The decoded answer to a support question.
///
/// Serializes with the wire names `ai_summary_answer` and
/// `ai_relevant_articles`, both when decoding model output and when
/// rendering the HTTP response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredAnswer {
    #[serde(
        rename = "ai_summary_answer",
        default,
        deserialize_with = "null_as_default"
    )]
    pub summary: String,
    #[serde(
        rename = "ai_relevant_articles",
        default,
        deserialize_with = "null_as_default"
    )]
    pub relevant_articles: Vec<RelevantArticle>,
}

impl StructuredAnswer {
    /// Creates a new answer.
    pub fn new(summary: impl Into<String>, relevant_articles: Vec<RelevantArticle>) -> Self {
        Self {
            summary: summary.into(),
            relevant_articles,
        }
    }

    /// Serializes the relevant articles to the JSON form stored in history.
    pub fn relevant_articles_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.relevant_articles)
    }
}

// A JSON `null` is treated like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
