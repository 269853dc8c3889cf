use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Method, RequestBuilder,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

use super::{ApiClient, ClientError};
use crate::admin::{AdminResource, ContactsResource};
use crate::models::{
    ContactSubmission, DashboardStats, PortfolioItem, Record, TeamMember, Template, UploadedImage,
};
use crate::validation::ValidationError;

/// Largest image the server accepts.
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Checks an upload before any bytes leave the machine.
pub fn validate_upload(content_type: &str, size: u64) -> Result<(), ValidationError> {
    if !content_type.trim().to_ascii_lowercase().starts_with("image/") {
        return Err(ValidationError::NotAnImage);
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(ValidationError::FileTooLarge {
            size,
            max: MAX_UPLOAD_BYTES,
        });
    }
    Ok(())
}

#[derive(Clone)]
struct Credential {
    username: String,
    password: String,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// An authenticated admin context. Every admin call sends the credential it
/// owns; nothing is stored anywhere else.
#[derive(Debug, Clone)]
pub struct AdminSession {
    client: ApiClient,
    credential: Credential,
}

impl AdminSession {
    pub(super) fn new(client: ApiClient, username: &str, password: &str) -> Self {
        Self {
            client,
            credential: Credential {
                username: username.to_string(),
                password: password.to_string(),
            },
        }
    }

    pub fn username(&self) -> &str {
        &self.credential.username
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, path)
            .basic_auth(&self.credential.username, Some(&self.credential.password))
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        self.client.fetch(request).await
    }

    async fn send_ack(&self, request: RequestBuilder) -> Result<(), ClientError> {
        self.client.send::<serde_json::Value>(request).await?;
        Ok(())
    }

    pub(super) async fn verify(&self) -> Result<(), ClientError> {
        self.send_ack(self.request(Method::GET, "/admin/verify")).await
    }

    pub fn collection<R: Record>(&self) -> CollectionClient<R> {
        CollectionClient {
            session: self.clone(),
            _record: PhantomData,
        }
    }

    pub fn templates(&self) -> CollectionClient<Template> {
        self.collection()
    }

    pub fn portfolio(&self) -> CollectionClient<PortfolioItem> {
        self.collection()
    }

    pub fn team(&self) -> CollectionClient<TeamMember> {
        self.collection()
    }

    pub fn contacts(&self) -> ContactsClient {
        ContactsClient {
            session: self.clone(),
        }
    }

    pub async fn stats(&self) -> Result<DashboardStats, ClientError> {
        self.fetch(self.request(Method::GET, "/admin/stats")).await
    }

    /// Uploads one image into `bucket/folder` and returns its public URL with
    /// metadata. Content type and size are checked first.
    pub async fn upload_image(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        content_type: &str,
        bucket: &str,
        folder: &str,
    ) -> Result<UploadedImage, ClientError> {
        validate_upload(content_type, bytes.len() as u64)?;

        let part = Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(content_type)?;
        let request = self
            .request(Method::POST, "/admin/upload")
            .query(&[("bucket", bucket), ("folder", folder)])
            .multipart(Form::new().part("file", part));

        self.fetch(request).await
    }

    /// Ends the session, dropping the credential.
    pub fn logout(self) -> ApiClient {
        tracing::debug!(username = %self.credential.username, "admin session closed");
        self.client
    }
}

/// Admin CRUD for one collection.
#[derive(Debug, Clone)]
pub struct CollectionClient<R> {
    session: AdminSession,
    _record: PhantomData<fn() -> R>,
}

#[derive(Serialize)]
struct ReorderBody<'a> {
    order: &'a [String],
}

impl<R: Record> CollectionClient<R> {
    fn base(&self) -> String {
        format!("/admin/{}", R::COLLECTION.path())
    }

    pub async fn list(&self) -> Result<Vec<R>, ClientError> {
        self.session
            .fetch(self.session.request(Method::GET, &self.base()))
            .await
    }

    pub async fn create(&self, draft: &R::Draft) -> Result<R, ClientError> {
        let request = self.session.request(Method::POST, &self.base()).json(draft);
        self.session.fetch(request).await
    }

    pub async fn update(&self, id: &str, draft: &R::Draft) -> Result<R, ClientError> {
        let path = format!("{}/{}", self.base(), id);
        let request = self.session.request(Method::PUT, &path).json(draft);
        self.session.fetch(request).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ClientError> {
        let path = format!("{}/{}", self.base(), id);
        self.session
            .send_ack(self.session.request(Method::DELETE, &path))
            .await
    }

    /// Sends the complete id order of the collection.
    pub async fn reorder(&self, order: &[String]) -> Result<(), ClientError> {
        let path = format!("{}/reorder", self.base());
        let request = self
            .session
            .request(Method::POST, &path)
            .json(&ReorderBody { order });
        self.session.send_ack(request).await
    }
}

/// Admin access to the contact inbox.
#[derive(Debug, Clone)]
pub struct ContactsClient {
    session: AdminSession,
}

impl ContactsClient {
    pub async fn list(&self) -> Result<Vec<ContactSubmission>, ClientError> {
        self.session
            .fetch(self.session.request(Method::GET, "/admin/contacts"))
            .await
    }

    pub async fn mark_read(&self, id: &str) -> Result<ContactSubmission, ClientError> {
        let path = format!("/admin/contacts/{}/read", id);
        self.session
            .fetch(self.session.request(Method::PUT, &path))
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ClientError> {
        let path = format!("/admin/contacts/{}", id);
        self.session
            .send_ack(self.session.request(Method::DELETE, &path))
            .await
    }
}

#[async_trait]
impl<R: Record> AdminResource<R> for CollectionClient<R> {
    async fn list(&self) -> Result<Vec<R>, ClientError> {
        CollectionClient::list(self).await
    }

    async fn create(&self, draft: &R::Draft) -> Result<R, ClientError> {
        CollectionClient::create(self, draft).await
    }

    async fn update(&self, id: &str, draft: &R::Draft) -> Result<R, ClientError> {
        CollectionClient::update(self, id, draft).await
    }

    async fn delete(&self, id: &str) -> Result<(), ClientError> {
        CollectionClient::delete(self, id).await
    }

    async fn reorder(&self, order: &[String]) -> Result<(), ClientError> {
        CollectionClient::reorder(self, order).await
    }
}

#[async_trait]
impl ContactsResource for ContactsClient {
    async fn list(&self) -> Result<Vec<ContactSubmission>, ClientError> {
        ContactsClient::list(self).await
    }

    async fn mark_read(&self, id: &str) -> Result<ContactSubmission, ClientError> {
        ContactsClient::mark_read(self, id).await
    }

    async fn delete(&self, id: &str) -> Result<(), ClientError> {
        ContactsClient::delete(self, id).await
    }
}
