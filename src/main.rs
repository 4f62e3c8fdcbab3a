use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use kbsearch::{
    AnswerService, AppState, Config, HistoryStore, QueryOrchestrator, StaticArticleStore, router,
    telemetry,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before parsing so clap sees its values
    let dotenv = dotenvy::dotenv();
    telemetry::init();
    if let Err(e) = dotenv {
        tracing::warn!("No .env file loaded ({e}), reading configuration from the environment");
    }

    let config = Config::parse();
    tracing::debug!(?config, "Loaded configuration");

    ensure_database_directory(&config.db_path)?;
    let history = HistoryStore::open(&config.db_path).with_context(|| {
        format!(
            "Failed to open search history database: {}",
            config.db_path.display()
        )
    })?;
    tracing::info!(path = %config.db_path.display(), "Search history database initialized");

    if !config.has_api_key() {
        tracing::warn!(
            "GEMINI_API_KEY is not set; search requests will fail until it is configured"
        );
    }

    let answerer = AnswerService::new(Arc::new(config.model_factory()), config.api_key.clone());
    let orchestrator = QueryOrchestrator::new(
        Arc::new(StaticArticleStore::new()),
        Arc::new(answerer),
        Arc::new(history),
    );
    let app = router(AppState::new(Arc::new(orchestrator)));

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;
    tracing::info!("kbsearch listening on {}", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("kbsearch shut down");
    Ok(())
}

/// Ensures the parent directory of the database file exists.
///
/// Creates the directory structure if it doesn't exist using `create_dir_all`.
fn ensure_database_directory(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create database directory: {}", parent.display())
        })?;
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn ensure_database_directory_creates_parents() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("data").join("nested").join("search.db");

        ensure_database_directory(&db_path).unwrap();

        assert!(db_path.parent().unwrap().is_dir());
    }

    #[test]
    fn ensure_database_directory_accepts_bare_file_name() {
        assert!(ensure_database_directory(Path::new("search.db")).is_ok());
    }
}
