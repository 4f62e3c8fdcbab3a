pub mod answerer;
pub mod articles;
pub mod config;
pub mod gemini;
pub mod handler;
pub mod history;
pub mod telemetry;

#[cfg(test)]
mod test_support;

pub use answerer::{AnswerError, AnswerService, RelevantArticle, StructuredAnswer};
pub use articles::{Article, ArticleStore, StaticArticleStore};
pub use config::Config;
pub use gemini::{
    GeminiClientBuilder, GeminiFactory, GenerativeModel, ModelError, ModelFactory, ModelReply,
};
pub use handler::{AppState, QueryOrchestrator, SearchOutcome, router};
pub use history::{HistoryError, HistoryRecord, HistoryStore, NewHistoryRecord};
