//! Knowledge-base articles.
//!
//! The article set is static reference data. It sits behind the
//! [`ArticleStore`] trait so a real index can replace it without touching
//! the answerer or the request handler.

use serde::{Deserialize, Serialize};

/// A knowledge-base entry offered to the model as context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub content: String,
}

impl Article {
    /// Creates a new article.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
        }
    }
}

/// Read-only source of knowledge-base articles.
///
/// Implementations must return the same sequence, in the same order, on
/// every call for the lifetime of the process.
pub trait ArticleStore: Send + Sync {
    /// Returns every known article.
    fn list(&self) -> Vec<Article>;
}

/// The fixed three-article knowledge base shipped with the service.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticArticleStore;

impl StaticArticleStore {
    pub fn new() -> Self {
        Self
    }
}

impl ArticleStore for StaticArticleStore {
    fn list(&self) -> Vec<Article> {
        vec![
            Article::new(
                "kb-001",
                "How to reset your password",
                "To reset your password, go to the login page and click on the \
                 'Forgot Password' link. You will receive an email with instructions \
                 on how to set a new password. Make sure to choose a strong password \
                 that you haven't used before.",
            ),
            Article::new(
                "kb-002",
                "VPN Connection Issues",
                "If you are having trouble connecting to the company VPN, first ensure \
                 you have the latest version of the VPN client installed. Second, check \
                 your internet connection to make sure it is stable. If the problem \
                 persists, try restarting your computer. Contact IT support if you are \
                 still unable to connect.",
            ),
            Article::new(
                "kb-003",
                "Setting up a new printer",
                "To set up a new printer, first connect it to the network via an ethernet \
                 cable or Wi-Fi. Then, go to your computer's system settings, find the \
                 'Printers & Scanners' section, and click 'Add Printer'. Your computer \
                 should automatically detect the printer. If not, you may need to install \
                 drivers from the manufacturer's website.",
            ),
        ]
    }
}
