//! Request orchestration for `/api/search-query`.

use std::sync::Arc;

use axum::http::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::answerer::{AnswerError, AnswerService, StructuredAnswer};
use crate::articles::ArticleStore;
use crate::history::{HistoryStore, NewHistoryRecord};

/// Incoming search request body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
}

/// Lifecycle of a single search request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Received,
    Validated,
    ArticlesLoaded,
    Answered,
    Persisted,
    Rendered,
    RejectedBadRequest,
    RejectedUpstreamFailure,
}

/// Errors that end a request early.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The body was not a JSON object with a string `query`
    #[error("Invalid request body: {0}")]
    InvalidBody(#[source] serde_json::Error),

    /// `query` was the empty string
    #[error("Query cannot be empty")]
    EmptyQuery,

    /// The answerer failed
    #[error("Upstream failure: {0}")]
    Upstream(#[source] AnswerError),
}

impl SearchError {
    /// HTTP status reported to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidBody(_) | Self::EmptyQuery => StatusCode::BAD_REQUEST,
            Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short client-facing message. Never includes inner error detail.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::InvalidBody(_) => "Invalid request body",
            Self::EmptyQuery => "Query cannot be empty",
            Self::Upstream(_) => "Failed to get response from AI service",
        }
    }

    /// Terminal state for a request that failed with this error.
    pub fn terminal_state(&self) -> RequestState {
        match self {
            Self::InvalidBody(_) | Self::EmptyQuery => RequestState::RejectedBadRequest,
            Self::Upstream(_) => RequestState::RejectedUpstreamFailure,
        }
    }
}

/// Result of handling one request: status, body and the terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub status: StatusCode,
    pub body: String,
    pub state: RequestState,
}

impl SearchOutcome {
    fn rendered(body: String) -> Self {
        Self {
            status: StatusCode::OK,
            body,
            state: RequestState::Rendered,
        }
    }

    fn rejected(error: &SearchError) -> Self {
        Self {
            status: error.status(),
            body: error.public_message().to_string(),
            state: error.terminal_state(),
        }
    }

    /// Returns true if the body is a JSON answer rather than a plain-text error.
    pub fn is_json(&self) -> bool {
        self.state == RequestState::Rendered
    }
}

/// Validates, answers and records one search request.
pub struct QueryOrchestrator {
    articles: Arc<dyn ArticleStore>,
    answerer: Arc<AnswerService>,
    history: Arc<HistoryStore>,
}

impl QueryOrchestrator {
    /// Creates a new orchestrator over its collaborators.
    pub fn new(
        articles: Arc<dyn ArticleStore>,
        answerer: Arc<AnswerService>,
        history: Arc<HistoryStore>,
    ) -> Self {
        Self {
            articles,
            answerer,
            history,
        }
    }

    /// Handles a raw request body and returns the response to send.
    ///
    /// Blocks for the duration of the model call. At most one history row
    /// is written, and only after an answer was produced.
    pub fn handle(&self, raw_body: &[u8]) -> SearchOutcome {
        let answer = match self.process(raw_body) {
            Ok(answer) => answer,
            Err(error) => {
                match &error {
                    SearchError::Upstream(inner) => {
                        tracing::error!(error = %inner, "Failed to answer search query");
                    }
                    _ => tracing::debug!(error = %error, "Rejected search request"),
                }
                return SearchOutcome::rejected(&error);
            }
        };

        match serde_json::to_string(&answer) {
            Ok(body) => {
                tracing::trace!(state = ?RequestState::Rendered, "Search request complete");
                SearchOutcome::rendered(body)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode answer");
                SearchOutcome {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: "Internal server error".to_string(),
                    state: RequestState::RejectedUpstreamFailure,
                }
            }
        }
    }

    fn process(&self, raw_body: &[u8]) -> Result<StructuredAnswer, SearchError> {
        tracing::trace!(state = ?RequestState::Received, bytes = raw_body.len());
        let request: SearchRequest =
            serde_json::from_slice(raw_body).map_err(SearchError::InvalidBody)?;

        // Only the exact empty string is rejected; whitespace passes through.
        if request.query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        tracing::trace!(state = ?RequestState::Validated, query = %request.query);

        let articles = self.articles.list();
        tracing::trace!(state = ?RequestState::ArticlesLoaded, count = articles.len());

        let answer = self
            .answerer
            .answer(&request.query, &articles)
            .map_err(SearchError::Upstream)?;
        tracing::trace!(state = ?RequestState::Answered);

        self.record(&request.query, &answer);
        tracing::trace!(state = ?RequestState::Persisted);

        Ok(answer)
    }

    /// Writes the history row. Failures are logged and never reach the caller.
    fn record(&self, query: &str, answer: &StructuredAnswer) {
        let result = NewHistoryRecord::from_answer(query, answer)
            .and_then(|record| self.history.append(&record));

        match result {
            Ok(id) => tracing::debug!(id, "Saved search to history"),
            Err(e) => tracing::error!(error = %e, "Failed to save search to history"),
        }
    }
}
