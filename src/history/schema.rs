/// Schema for the search history table.
///
/// Uses CREATE TABLE/INDEX IF NOT EXISTS for idempotent execution.
/// Rows are only ever inserted; `id` is AUTOINCREMENT so identifiers are
/// never reused.
pub const INITIAL_SCHEMA: &str = r#"
-- One row per answered search query
CREATE TABLE IF NOT EXISTS search_history (
    id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
    user_query TEXT,
    ai_summary_answer TEXT,
    ai_relevant_articles TEXT,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

-- Index for reading history by creation date
CREATE INDEX IF NOT EXISTS idx_search_history_created ON search_history(created_at);
"#;
