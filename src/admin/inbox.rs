use super::controller::PendingDelete;
use super::{AdminError, ContactsResource, ListState};
use crate::models::ContactSubmission;

/// Admin view of contact submissions, newest first as the server sends them.
pub struct ContactsInbox<A> {
    api: A,
    state: ListState<ContactSubmission>,
}

impl<A: ContactsResource> ContactsInbox<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: ListState::Idle,
        }
    }

    pub fn state(&self) -> &ListState<ContactSubmission> {
        &self.state
    }

    pub fn items(&self) -> &[ContactSubmission] {
        self.state.items()
    }

    pub fn unread_count(&self) -> usize {
        self.items().iter().filter(|c| !c.is_read).count()
    }

    pub async fn refresh(&mut self) {
        self.state = ListState::Fetching;
        self.state = ListState::from_result(self.api.list().await);
    }

    pub async fn mark_read(&mut self, id: &str) -> Result<(), AdminError> {
        self.api.mark_read(id).await?;
        self.refresh().await;
        Ok(())
    }

    pub fn request_delete(&self, id: &str) -> Result<PendingDelete, AdminError> {
        if self.items().iter().any(|c| c.id == id) {
            Ok(PendingDelete::new(id.to_string()))
        } else {
            Err(AdminError::UnknownId(id.to_string()))
        }
    }

    pub async fn confirm_delete(&mut self, pending: PendingDelete) -> Result<(), AdminError> {
        self.api.delete(pending.id()).await?;
        tracing::info!(contact_id = %pending.id(), "contact deleted");
        self.refresh().await;
        Ok(())
    }
}
