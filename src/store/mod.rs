//! Content store seams.
//!
//! The server talks to the content collections only through these traits.
//! `db` provides the Postgres implementation, `memory` the in-process one used
//! when no database is configured and by the tests.

pub mod memory;

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

use crate::models::{ContactSubmission, NewContact, PortfolioItem, Record, TeamMember, Template};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{noun} '{id}' not found")]
    NotFound { noun: &'static str, id: String },

    #[error("invalid order: {0}")]
    InvalidOrder(String),

    #[error("{0}")]
    Invalid(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    pub fn not_found(noun: &'static str, id: &str) -> Self {
        StoreError::NotFound {
            noun,
            id: id.to_string(),
        }
    }
}

#[async_trait]
pub trait CollectionStore<R: Record>: Send + Sync {
    /// All records in display order.
    async fn list(&self) -> Result<Vec<R>, StoreError>;

    async fn get(&self, id: &str) -> Result<R, StoreError>;

    /// Appends a record; its display order is the collection length.
    async fn create(&self, draft: R::Draft) -> Result<R, StoreError>;

    async fn update(&self, id: &str, draft: R::Draft) -> Result<R, StoreError>;

    /// Removes a record and compacts the remaining display orders.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// Rewrites every display order from a full permutation of the ids,
    /// atomically.
    async fn reorder(&self, order: &[String]) -> Result<(), StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;
}

#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Newest first.
    async fn list(&self) -> Result<Vec<ContactSubmission>, StoreError>;

    async fn create(&self, contact: NewContact) -> Result<ContactSubmission, StoreError>;

    async fn mark_read(&self, id: &str) -> Result<ContactSubmission, StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;

    async fn count_unread(&self) -> Result<usize, StoreError>;
}

/// Liveness probe used by the health routes.
#[async_trait]
pub trait StorePing: Send + Sync {
    async fn ping(&self) -> Result<std::time::Duration, StoreError>;

    fn backend(&self) -> &'static str;
}

/// Handles to every collection, shared by the request handlers.
#[derive(Clone)]
pub struct Stores {
    pub templates: Arc<dyn CollectionStore<Template>>,
    pub portfolio: Arc<dyn CollectionStore<PortfolioItem>>,
    pub team: Arc<dyn CollectionStore<TeamMember>>,
    pub contacts: Arc<dyn ContactStore>,
    pub ping: Arc<dyn StorePing>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            templates: Arc::new(memory::MemoryCollection::<Template>::default()),
            portfolio: Arc::new(memory::MemoryCollection::<PortfolioItem>::default()),
            team: Arc::new(memory::MemoryCollection::<TeamMember>::default()),
            contacts: Arc::new(memory::MemoryContacts::default()),
            ping: Arc::new(memory::MemoryPing),
        }
    }
}

/// Picks the store of a record type out of [`Stores`].
pub trait StoredIn: Record {
    fn store(stores: &Stores) -> &dyn CollectionStore<Self>;
}

impl StoredIn for Template {
    fn store(stores: &Stores) -> &dyn CollectionStore<Self> {
        stores.templates.as_ref()
    }
}

impl StoredIn for PortfolioItem {
    fn store(stores: &Stores) -> &dyn CollectionStore<Self> {
        stores.portfolio.as_ref()
    }
}

impl StoredIn for TeamMember {
    fn store(stores: &Stores) -> &dyn CollectionStore<Self> {
        stores.team.as_ref()
    }
}

/// Checks that `order` names every id in `existing` exactly once.
pub fn check_permutation<'a>(
    existing: impl IntoIterator<Item = &'a str>,
    order: &[String],
) -> Result<(), StoreError> {
    let existing: HashSet<&str> = existing.into_iter().collect();
    let mut seen = HashSet::with_capacity(order.len());

    for id in order {
        if !seen.insert(id.as_str()) {
            return Err(StoreError::InvalidOrder(format!("id '{}' appears more than once", id)));
        }
        if !existing.contains(id.as_str()) {
            return Err(StoreError::InvalidOrder(format!("unknown id '{}'", id)));
        }
    }

    if seen.len() != existing.len() {
        return Err(StoreError::InvalidOrder(format!(
            "order lists {} of {} ids",
            seen.len(),
            existing.len()
        )));
    }

    Ok(())
}
