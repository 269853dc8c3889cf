//! Contact intake: the public contact form, its validation gate and the
//! submit flow.

use async_trait::async_trait;

use crate::client::{ApiClient, ClientError};
use crate::models::NewContact;
use crate::validation::{is_valid_email, Field, ValidationError};

/// Message shown for any transport or server failure during submission.
pub const RETRY_MESSAGE: &str = "Failed to send request. Please try again.";

/// Validated, trimmed submission ready to send.
pub type ContactPayload = NewContact;

/// Raw form input, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub project_type: String,
    pub message: String,
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl ContactForm {
    /// Checks name, then email, then message, stopping at the first failure.
    /// Phone and project type are free-form.
    pub fn validate(&self) -> Result<ContactPayload, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyField(Field::Name));
        }

        let email = self.email.trim();
        if email.is_empty() {
            return Err(ValidationError::EmptyField(Field::Email));
        }
        if !is_valid_email(email) {
            return Err(ValidationError::InvalidFormat(Field::Email));
        }

        let message = self.message.trim();
        if message.is_empty() {
            return Err(ValidationError::EmptyField(Field::Message));
        }

        Ok(NewContact {
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
            phone: optional(&self.phone),
            project_type: optional(&self.project_type),
        })
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl From<NewContact> for ContactForm {
    fn from(contact: NewContact) -> Self {
        Self {
            name: contact.name,
            email: contact.email,
            message: contact.message,
            phone: contact.phone.unwrap_or_default(),
            project_type: contact.project_type.unwrap_or_default(),
        }
    }
}

/// Network seam of the intake flow.
#[async_trait]
pub trait ContactApi: Send + Sync {
    async fn submit_contact(&self, contact: &NewContact) -> Result<(), ClientError>;
}

#[async_trait]
impl ContactApi for ApiClient {
    async fn submit_contact(&self, contact: &NewContact) -> Result<(), ClientError> {
        ApiClient::submit_contact(self, contact).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeError {
    /// Caught before the network; attributable to a field.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// Transport or server failure; the form is kept for a retry.
    #[error("{RETRY_MESSAGE}")]
    Retryable,
}

/// Hosts a contact form and submits it.
pub struct ContactIntake<A> {
    api: A,
    pub form: ContactForm,
}

impl<A: ContactApi> ContactIntake<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            form: ContactForm::default(),
        }
    }

    /// Validates and submits. On success the form is cleared; the caller
    /// closes whatever hosts it. On failure the form is left as typed.
    pub async fn submit(&mut self) -> Result<(), IntakeError> {
        let payload = self.form.validate()?;

        match self.api.submit_contact(&payload).await {
            Ok(()) => {
                self.form.clear();
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "contact submission failed");
                Err(IntakeError::Retryable)
            }
        }
    }
}
