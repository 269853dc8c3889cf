//! Admin-side content management: list state, CRUD controllers, ordering
//! and the contact inbox.
//!
//! Controllers talk to the server through [`AdminResource`] and
//! [`ContactsResource`], which the API client implements.

pub mod controller;
pub mod inbox;
pub mod reorder;

pub use controller::{CollectionController, EditForm, FormMode, PendingDelete};
pub use inbox::ContactsInbox;
pub use reorder::{move_item, DragSession, ReorderOutcome};

use async_trait::async_trait;
use thiserror::Error;

use crate::client::ClientError;
use crate::models::{ContactSubmission, Record};

#[async_trait]
pub trait AdminResource<R: Record>: Send + Sync {
    async fn list(&self) -> Result<Vec<R>, ClientError>;

    async fn create(&self, draft: &R::Draft) -> Result<R, ClientError>;

    async fn update(&self, id: &str, draft: &R::Draft) -> Result<R, ClientError>;

    async fn delete(&self, id: &str) -> Result<(), ClientError>;

    async fn reorder(&self, order: &[String]) -> Result<(), ClientError>;
}

#[async_trait]
pub trait ContactsResource: Send + Sync {
    async fn list(&self) -> Result<Vec<ContactSubmission>, ClientError>;

    async fn mark_read(&self, id: &str) -> Result<ContactSubmission, ClientError>;

    async fn delete(&self, id: &str) -> Result<(), ClientError>;
}

#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Caught locally; the form is left open.
    #[error("{0}")]
    Invalid(String),

    #[error("no form is open")]
    NoForm,

    #[error("'{0}' is not in the current list")]
    UnknownId(String),
}

/// Lifecycle of a fetched list.
#[derive(Debug, Clone, PartialEq)]
pub enum ListState<T> {
    Idle,
    Fetching,
    Ready(Vec<T>),
    Error(String),
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        ListState::Idle
    }
}

impl<T> ListState<T> {
    /// Items of a successful load; empty in every other state.
    pub fn items(&self) -> &[T] {
        match self {
            ListState::Ready(items) => items,
            _ => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ListState::Idle | ListState::Fetching)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ListState::Error(message) => Some(message),
            _ => None,
        }
    }

    pub(crate) fn from_result(result: Result<Vec<T>, ClientError>) -> Self {
        match result {
            Ok(items) => ListState::Ready(items),
            Err(e) => {
                tracing::warn!(error = %e, "list fetch failed");
                ListState::Error(e.to_string())
            }
        }
    }
}

/// Splits a comma separated field: trimmed, empties dropped, duplicates kept.
pub fn parse_list_field(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Inverse of [`parse_list_field`] for pre-filling an edit form.
pub fn join_list_field(items: &[String]) -> String {
    items.join(", ")
}
