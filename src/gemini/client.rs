/// Gemini HTTP client implementation.
///
/// This module provides `GeminiClient` for making synchronous HTTP requests to the
/// Gemini API, along with the error type, builder, and the factory seam that the
/// answerer depends on.
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use thiserror::Error;

use super::types::ModelReply;

/// Default API host for Gemini.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model name.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Default request timeout for a single model call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that can occur when invoking the model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Network-related errors (connection failures, DNS resolution, etc.)
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The request did not complete within the configured timeout
    #[error("Request timed out")]
    Timeout(#[source] reqwest::Error),

    /// The API rejected the credential
    #[error("Authentication rejected: status {status}")]
    Auth { status: u16, body: String },

    /// Any other non-success HTTP status
    #[error("HTTP error: status {status}")]
    Http { status: u16, body: String },

    /// The reply body was not a valid `generateContent` response
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Invalid URL configuration error
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ModelError {
    /// Returns the response body the API sent with a rejected request.
    ///
    /// Kept out of `Display` so it only reaches server-side logs.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Auth { body, .. } | Self::Http { body, .. } => Some(body),
            _ => None,
        }
    }

    fn from_transport(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error)
        } else {
            Self::Network(error)
        }
    }
}

/// A generative model that turns a prompt into a reply.
///
/// This trait is the seam between the answerer and the network. Tests
/// implement it with deterministic stand-ins.
pub trait GenerativeModel: Send + Sync {
    /// Sends `prompt` as the sole input and returns the raw reply.
    fn generate_content(&self, prompt: &str) -> Result<ModelReply, ModelError>;
}

/// Creates a [`GenerativeModel`] for a given API key.
///
/// Any `Fn(&str) -> Result<Box<dyn GenerativeModel>, ModelError>` closure is a factory.
pub trait ModelFactory: Send + Sync {
    fn create(&self, api_key: &str) -> Result<Box<dyn GenerativeModel>, ModelError>;
}

impl<F> ModelFactory for F
where
    F: Fn(&str) -> Result<Box<dyn GenerativeModel>, ModelError> + Send + Sync,
{
    fn create(&self, api_key: &str) -> Result<Box<dyn GenerativeModel>, ModelError> {
        self(api_key)
    }
}

/// Builder for constructing `GeminiClient` instances.
///
/// # Examples
///
/// ```
/// use kbsearch::gemini::GeminiClientBuilder;
///
/// let client = GeminiClientBuilder::new("secret")
///     .model("gemini-1.5-pro")
///     .build()
///     .expect("Failed to create client");
/// assert_eq!(client.model(), "gemini-1.5-pro");
/// ```
pub struct GeminiClientBuilder {
    api_key: String,
    base_url: Option<String>,
    model: Option<String>,
    timeout: Option<Duration>,
}

impl GeminiClientBuilder {
    /// Creates a new builder for the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            model: None,
            timeout: None,
        }
    }

    /// Sets the base URL for the Gemini API.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the model name (e.g., "gemini-1.5-flash").
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the request timeout for a single call.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the `GeminiClient` with the configured settings.
    ///
    /// Unset values fall back to [`DEFAULT_BASE_URL`], [`DEFAULT_MODEL`] and
    /// [`DEFAULT_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// Returns `ModelError::InvalidUrl` if the base URL does not parse, or
    /// `ModelError::Network` if the underlying HTTP client cannot be created.
    pub fn build(self) -> Result<GeminiClient, ModelError> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);

        reqwest::Url::parse(&base_url)
            .map_err(|e| ModelError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(ModelError::Network)?;

        Ok(GeminiClient {
            client,
            api_key: self.api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        })
    }
}

/// Synchronous HTTP client for the Gemini `generateContent` endpoint.
///
/// Calls are made once; there is no retry. Cloning shares the underlying
/// connection pool.
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::blocking::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    /// Returns the base URL configured for this client.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the model name configured for this client.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

impl GenerativeModel for GeminiClient {
    fn generate_content(&self, prompt: &str) -> Result<ModelReply, ModelError> {
        let url = self.endpoint();
        let request_body = serde_json::json!({
            "contents": [
                { "parts": [ { "text": prompt } ] }
            ]
        });

        tracing::debug!(model = %self.model, "Sending generateContent request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .map_err(ModelError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let status = status.as_u16();
            let body = response.text().unwrap_or_default();
            if status == 401 || status == 403 {
                return Err(ModelError::Auth { status, body });
            }
            return Err(ModelError::Http { status, body });
        }

        let text = response.text().map_err(ModelError::from_transport)?;
        serde_json::from_str(&text).map_err(ModelError::Serialization)
    }
}

/// Factory producing a [`GeminiClient`] per API key.
///
/// The client is built on first use and reused while the key stays the
/// same. Building is deferred because a blocking client must not be created
/// on an async runtime thread.
pub struct GeminiFactory {
    base_url: String,
    model: String,
    timeout: Duration,
    cached: Mutex<Option<GeminiClient>>,
}

impl Default for GeminiFactory {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT)
    }
}

impl GeminiFactory {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            timeout,
            cached: Mutex::new(None),
        }
    }
}

impl ModelFactory for GeminiFactory {
    fn create(&self, api_key: &str) -> Result<Box<dyn GenerativeModel>, ModelError> {
        let mut cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(client) = cached.as_ref()
            && client.api_key == api_key
        {
            return Ok(Box::new(client.clone()));
        }

        let client = GeminiClientBuilder::new(api_key)
            .base_url(self.base_url.clone())
            .model(self.model.clone())
            .timeout(self.timeout)
            .build()?;
        tracing::debug!(model = %self.model, "Built Gemini client");

        *cached = Some(client.clone());
        Ok(Box::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn network_error_variant_display() {
        let reqwest_error = reqwest::blocking::Client::new()
            .get("not-a-valid-url")
            .build()
            .unwrap_err();
        let error = ModelError::from_transport(reqwest_error);

        assert!(matches!(error, ModelError::Network(_)));
        assert!(error.to_string().contains("Network error"));
    }

    #[test]
    fn http_error_includes_status() {
        let error = ModelError::Http {
            status: 503,
            body: "overloaded".to_string(),
        };
        let msg = error.to_string();
        assert!(msg.contains("HTTP error"));
        assert!(msg.contains("503"));
        assert!(!msg.contains("overloaded"));
        assert_eq!(error.detail(), Some("overloaded"));
    }

    #[test]
    fn auth_error_keeps_body_as_detail() {
        let error = ModelError::Auth {
            status: 403,
            body: "API key not valid".to_string(),
        };
        assert!(!error.to_string().contains("API key not valid"));
        assert_eq!(error.detail(), Some("API key not valid"));
        assert_eq!(ModelError::InvalidUrl("x".to_string()).detail(), None);
    }

    #[test]
    fn serialization_error_chains_source() {
        let json_error = serde_json::from_str::<serde_json::Value>("nope").unwrap_err();
        let error = ModelError::Serialization(json_error);
        assert!(error.source().is_some());
    }

    #[test]
    fn builder_applies_defaults() {
        let client = GeminiClientBuilder::new("key").build().unwrap();
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
        assert_eq!(client.model(), DEFAULT_MODEL);
    }

    #[test]
    fn builder_overrides_take_precedence() {
        let client = GeminiClientBuilder::new("key")
            .base_url("http://localhost:9000/")
            .model("gemini-test")
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap();

        assert_eq!(client.base_url(), "http://localhost:9000");
        assert_eq!(client.model(), "gemini-test");
        assert_eq!(
            client.endpoint(),
            "http://localhost:9000/v1beta/models/gemini-test:generateContent"
        );
    }

    #[test]
    fn build_rejects_invalid_url() {
        let result = GeminiClientBuilder::new("key")
            .base_url("not-a-valid-url")
            .build();
        assert!(matches!(result, Err(ModelError::InvalidUrl(_))));
    }

    #[test]
    fn closure_is_a_model_factory() {
        struct Echo;

        impl GenerativeModel for Echo {
            fn generate_content(&self, prompt: &str) -> Result<ModelReply, ModelError> {
                Ok(ModelReply::from_text(prompt))
            }
        }

        let factory = |_key: &str| -> Result<Box<dyn GenerativeModel>, ModelError> {
            Ok(Box::new(Echo))
        };

        let model = factory.create("key").unwrap();
        let reply = model.generate_content("ping").unwrap();
        assert_eq!(reply.first_part().unwrap().as_text(), "ping");
    }

    #[test]
    fn gemini_factory_builds_client() {
        let factory = GeminiFactory::new("http://localhost:9000", "gemini-test", DEFAULT_TIMEOUT);
        assert!(factory.create("key").is_ok());

        let factory = GeminiFactory::new("::bad::", "gemini-test", DEFAULT_TIMEOUT);
        assert!(matches!(
            factory.create("key"),
            Err(ModelError::InvalidUrl(_))
        ));
        assert!(factory.cached.lock().unwrap().is_none());
    }

    #[test]
    fn gemini_factory_reuses_client_for_same_key() {
        let factory = GeminiFactory::new("http://localhost:9000", "gemini-test", DEFAULT_TIMEOUT);

        factory.create("first").unwrap();
        factory.create("first").unwrap();
        assert_eq!(
            factory.cached.lock().unwrap().as_ref().map(|c| c.api_key.clone()),
            Some("first".to_string())
        );

        factory.create("second").unwrap();
        assert_eq!(
            factory.cached.lock().unwrap().as_ref().map(|c| c.api_key.clone()),
            Some("second".to_string())
        );
    }
}
