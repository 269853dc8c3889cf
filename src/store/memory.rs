use async_trait::async_trait;
use chrono::Utc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{check_permutation, CollectionStore, ContactStore, StoreError, StorePing};
use crate::models::{sort_for_display, ContactSubmission, NewContact, Record};

/// Process-local collection. Records are kept in display order.
pub struct MemoryCollection<R> {
    records: RwLock<Vec<R>>,
}

impl<R> Default for MemoryCollection<R> {
    fn default() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }
}

fn renumber<R: Record>(records: &mut [R]) {
    for (index, record) in records.iter_mut().enumerate() {
        record.set_display_order(index as i32);
    }
}

#[async_trait]
impl<R: Record> CollectionStore<R> for MemoryCollection<R> {
    async fn list(&self) -> Result<Vec<R>, StoreError> {
        let mut records = self.records.read().await.clone();
        sort_for_display(&mut records);
        Ok(records)
    }

    async fn get(&self, id: &str) -> Result<R, StoreError> {
        self.records
            .read()
            .await
            .iter()
            .find(|r| r.id() == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(R::COLLECTION.noun(), id))
    }

    async fn create(&self, draft: R::Draft) -> Result<R, StoreError> {
        R::check_draft(&draft).map_err(StoreError::Invalid)?;

        let mut records = self.records.write().await;
        let record = R::from_draft(
            Uuid::new_v4().to_string(),
            records.len() as i32,
            Utc::now(),
            draft,
        );
        records.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: &str, draft: R::Draft) -> Result<R, StoreError> {
        R::check_draft(&draft).map_err(StoreError::Invalid)?;

        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| StoreError::not_found(R::COLLECTION.noun(), id))?;
        record.apply(draft);
        Ok(record.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let index = records
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| StoreError::not_found(R::COLLECTION.noun(), id))?;
        records.remove(index);
        sort_for_display(&mut records);
        renumber(&mut records);
        Ok(())
    }

    async fn reorder(&self, order: &[String]) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        check_permutation(records.iter().map(|r| r.id()), order)?;

        let mut reordered = Vec::with_capacity(records.len());
        for id in order {
            if let Some(index) = records.iter().position(|r| r.id() == id) {
                reordered.push(records.swap_remove(index));
            }
        }
        renumber(&mut reordered);
        *records = reordered;
        Ok(())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.records.read().await.len())
    }
}

#[derive(Default)]
pub struct MemoryContacts {
    submissions: RwLock<Vec<ContactSubmission>>,
}

#[async_trait]
impl ContactStore for MemoryContacts {
    async fn list(&self) -> Result<Vec<ContactSubmission>, StoreError> {
        let mut submissions = self.submissions.read().await.clone();
        submissions.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(submissions)
    }

    async fn create(&self, contact: NewContact) -> Result<ContactSubmission, StoreError> {
        let submission = ContactSubmission::new(Uuid::new_v4().to_string(), Utc::now(), contact);
        self.submissions.write().await.push(submission.clone());
        Ok(submission)
    }

    async fn mark_read(&self, id: &str) -> Result<ContactSubmission, StoreError> {
        let mut submissions = self.submissions.write().await;
        let submission = submissions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| StoreError::not_found("contact", id))?;
        submission.is_read = true;
        Ok(submission.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut submissions = self.submissions.write().await;
        let before = submissions.len();
        submissions.retain(|s| s.id != id);
        if submissions.len() == before {
            return Err(StoreError::not_found("contact", id));
        }
        Ok(())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.submissions.read().await.len())
    }

    async fn count_unread(&self) -> Result<usize, StoreError> {
        Ok(self
            .submissions
            .read()
            .await
            .iter()
            .filter(|s| !s.is_read)
            .count())
    }
}

pub struct MemoryPing;

#[async_trait]
impl StorePing for MemoryPing {
    async fn ping(&self) -> Result<Duration, StoreError> {
        let start = Instant::now();
        Ok(start.elapsed())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
