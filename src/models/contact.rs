use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Stored contact-form submission. Created only by the public intake flow.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub project_type: Option<String>,
    pub message: String,
    pub is_read: bool,
    pub submitted_at: DateTime<Utc>,
}

/// Body of `POST /api/contact`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,
}

impl ContactSubmission {
    pub fn new(id: String, submitted_at: DateTime<Utc>, contact: NewContact) -> Self {
        Self {
            id,
            name: contact.name,
            email: contact.email,
            phone: contact.phone,
            project_type: contact.project_type,
            message: contact.message,
            is_read: false,
            submitted_at,
        }
    }
}
