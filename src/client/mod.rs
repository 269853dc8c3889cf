//! Typed HTTP client for the DevForge API.
//!
//! [`ApiClient`] covers the public surface. [`ApiClient::login`] probes the
//! admin credential and, only when the server accepts it, yields an
//! [`AdminSession`] that owns the credential for the admin calls.
//!
//! ```rust,ignore
//! let client = ApiClient::new("http://127.0.0.1:5000")?;
//! let session = client.login("admin", "secret").await?;
//! let templates = session.templates().list().await?;
//! let client = session.logout();
//! ```

mod session;

pub use session::{
    validate_upload, AdminSession, CollectionClient, ContactsClient, MAX_UPLOAD_BYTES,
};

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

use crate::envelope::decode_envelope;
use crate::models::{NewContact, PortfolioItem, Record, TeamMember, Template};
use crate::validation::ValidationError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server rejected the admin credential (401).
    #[error("{0}")]
    Auth(String),

    #[error("{0}")]
    NotFound(String),

    /// Any other non-2xx response or `success: false`, with the server's
    /// message when it sent one.
    #[error("{0}")]
    Request(String),

    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ClientError {
    pub fn is_auth(&self) -> bool {
        matches!(self, ClientError::Auth(_))
    }
}

/// Unauthenticated client. Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("devforge-client/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    /// Sends a request and decodes the envelope. No retries.
    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Option<T>, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        decode_envelope(status, &body)
    }

    /// Like [`send`](Self::send) for calls whose success always carries data.
    pub(crate) async fn fetch<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        self.send(request)
            .await?
            .ok_or_else(|| ClientError::Request("Malformed response: missing data".to_string()))
    }

    /// Public listing of any collection, in display order.
    pub async fn list<R: Record>(&self) -> Result<Vec<R>, ClientError> {
        let path = format!("/api/{}", R::COLLECTION.path());
        self.fetch(self.request(reqwest::Method::GET, &path)).await
    }

    pub async fn list_templates(&self) -> Result<Vec<Template>, ClientError> {
        self.list().await
    }

    pub async fn get_template(&self, id: &str) -> Result<Template, ClientError> {
        let path = format!("/api/templates/{}", id);
        self.fetch(self.request(reqwest::Method::GET, &path)).await
    }

    pub async fn list_portfolio(&self) -> Result<Vec<PortfolioItem>, ClientError> {
        self.list().await
    }

    pub async fn list_team(&self) -> Result<Vec<TeamMember>, ClientError> {
        self.list().await
    }

    pub async fn submit_contact(&self, contact: &NewContact) -> Result<(), ClientError> {
        let request = self.request(reqwest::Method::POST, "/api/contact").json(contact);
        self.send::<serde_json::Value>(request).await?;
        Ok(())
    }

    /// Checks the credential against `GET /admin/verify`. A rejected
    /// credential is [`ClientError::Auth`] and no session is created.
    pub async fn login(&self, username: &str, password: &str) -> Result<AdminSession, ClientError> {
        let session = AdminSession::new(self.clone(), username, password);
        session.verify().await?;
        tracing::debug!(username = %username, "admin session established");
        Ok(session)
    }
}
