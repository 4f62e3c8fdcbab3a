/// Gemini HTTP client module.
///
/// This module provides the model-invocation seam used by the answerer
/// (`GenerativeModel` and `ModelFactory`) together with a blocking client for
/// the Gemini `generateContent` REST endpoint.
mod client;
mod types;

pub use client::{
    DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT, GeminiClient, GeminiClientBuilder,
    GeminiFactory, GenerativeModel, ModelError, ModelFactory,
};
pub use types::{Candidate, Content, ModelReply, Part};
