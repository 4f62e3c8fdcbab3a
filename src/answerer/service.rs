//! Answering support questions through the model seam.

use std::sync::Arc;

use thiserror::Error;

use crate::articles::Article;
use crate::gemini::{ModelError, ModelFactory};

use super::extract::{decode_answer, extract_json};
use super::prompt::build_prompt;
use super::types::StructuredAnswer;

/// Errors produced while answering a question.
#[derive(Debug, Error)]
pub enum AnswerError {
    /// No API key was configured
    #[error("API key is not configured")]
    Config,

    /// Creating or calling the model failed
    #[error("Model invocation failed: {0}")]
    ModelInvocation(#[source] ModelError),

    /// The reply had no candidate or the candidate had no content parts
    #[error("Received an empty response from the model")]
    EmptyResponse,

    /// The cleaned reply did not decode into a structured answer
    #[error("Response parse failure: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
        raw: String,
    },
}

/// Answers support questions using a generative model.
///
/// The model is obtained from the injected factory on every call, so the
/// network path can be swapped for a deterministic stand-in.
pub struct AnswerService {
    factory: Arc<dyn ModelFactory>,
    api_key: Option<String>,
}

impl AnswerService {
    /// Creates a new `AnswerService`.
    ///
    /// `api_key` is checked on each call; `None` or an empty key makes every
    /// call fail with [`AnswerError::Config`] before any model is created.
    #[must_use]
    pub fn new(factory: Arc<dyn ModelFactory>, api_key: Option<String>) -> Self {
        Self { factory, api_key }
    }

    /// Answers `query` using `articles` as the only context.
    pub fn answer(
        &self,
        query: &str,
        articles: &[Article],
    ) -> Result<StructuredAnswer, AnswerError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(AnswerError::Config)?;

        let model = self.factory.create(api_key).map_err(|e| {
            tracing::error!(error = %e, "Failed to create model client");
            AnswerError::ModelInvocation(e)
        })?;

        let prompt = build_prompt(query, articles);

        let reply = model.generate_content(&prompt).map_err(|e| {
            match e.detail() {
                Some(body) => {
                    tracing::error!(error = %e, body = %body, "Failed to generate content");
                }
                None => tracing::error!(error = %e, "Failed to generate content"),
            }
            AnswerError::ModelInvocation(e)
        })?;

        let part = reply.first_part().ok_or(AnswerError::EmptyResponse)?;
        let cleaned = extract_json(part.as_text());

        decode_answer(cleaned).map_err(|source| {
            tracing::warn!(raw = %cleaned, error = %source, "Failed to parse model response");
            AnswerError::Parse {
                source,
                raw: cleaned.to_string(),
            }
        })
    }
}
