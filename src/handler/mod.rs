//! Search request handling.
//!
//! [`QueryOrchestrator`] is the composition root: it validates a raw request
//! body, loads articles, asks the answerer, records history and renders the
//! result. [`router`] exposes it over HTTP.

mod orchestrator;
mod routes;

pub use orchestrator::{QueryOrchestrator, RequestState, SearchError, SearchOutcome, SearchRequest};
pub use routes::{AppState, router};
