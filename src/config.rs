//! Service configuration from command-line flags and environment.

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL, GeminiFactory};

/// kbsearch - knowledge-base support search backed by Gemini
#[derive(Clone, Parser)]
#[command(name = "kbsearch")]
#[command(about = "Answers support questions from the knowledge base using Gemini")]
#[command(version)]
pub struct Config {
    /// API key for the Gemini API
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Gemini model name
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Base URL of the Gemini API
    #[arg(long, env = "GEMINI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Timeout for a single model call, in seconds
    #[arg(
        long = "timeout-secs",
        env = "GEMINI_TIMEOUT_SECS",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,

    /// Path of the SQLite search history database
    #[arg(long, env = "KBSEARCH_DB_PATH", default_value = "./search.db")]
    pub db_path: PathBuf,

    /// Address to listen on
    #[arg(long, env = "KBSEARCH_BIND", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,
}

impl Config {
    /// Returns the model call timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns true if a non-empty API key is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.is_empty())
    }

    /// Builds the Gemini model factory for this configuration.
    pub fn model_factory(&self) -> GeminiFactory {
        GeminiFactory::new(self.base_url.clone(), self.model.clone(), self.timeout())
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("db_path", &self.db_path)
            .field("bind", &self.bind)
            .finish()
    }
}
