//! Support-question answering using a generative model.
//!
//! This module builds the prompt from the question and the knowledge-base
//! articles, invokes the model through the [`crate::gemini::ModelFactory`]
//! seam, and decodes the loosely formatted reply into a [`StructuredAnswer`].

mod extract;
mod prompt;
mod service;
mod types;

pub use extract::{decode_answer, extract_json};
pub use prompt::build_prompt;
pub use service::{AnswerError, AnswerService};
pub use types::{RelevantArticle, StructuredAnswer};
