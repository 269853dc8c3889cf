//! Content models shared by the server, the stores and the API client.

pub mod contact;
pub mod portfolio;
pub mod team;
pub mod template;

pub use contact::{ContactSubmission, NewContact};
pub use portfolio::{PortfolioDraft, PortfolioItem};
pub use team::{ColorTheme, TeamDraft, TeamMember};
pub use template::{Difficulty, Template, TemplateDraft};

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// The three admin-managed, ordered collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Templates,
    Portfolio,
    Team,
}

impl Collection {
    /// Path segment used under `/api` and `/admin`.
    pub fn path(self) -> &'static str {
        match self {
            Collection::Templates => "templates",
            Collection::Portfolio => "portfolio",
            Collection::Team => "team",
        }
    }

    pub fn table(self) -> &'static str {
        match self {
            Collection::Templates => "project_templates",
            Collection::Portfolio => "portfolio_projects",
            Collection::Team => "team_members",
        }
    }

    /// Singular noun for log lines and messages.
    pub fn noun(self) -> &'static str {
        match self {
            Collection::Templates => "template",
            Collection::Portfolio => "project",
            Collection::Team => "team member",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// A record of an ordered collection.
///
/// `Draft` is the editable subset: everything except the id, the display
/// order and the timestamps, which the store owns.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + Unpin + 'static {
    type Draft: Clone + Default + Serialize + DeserializeOwned + Send + Sync + 'static;

    const COLLECTION: Collection;

    fn id(&self) -> &str;

    fn display_order(&self) -> i32;

    fn set_display_order(&mut self, order: i32);

    fn created_at(&self) -> DateTime<Utc>;

    /// Image shown on the public card, if one was set.
    fn image_ref(&self) -> Option<&str>;

    fn from_draft(id: String, display_order: i32, created_at: DateTime<Utc>, draft: Self::Draft)
        -> Self;

    /// Replaces the editable fields.
    fn apply(&mut self, draft: Self::Draft);

    /// Server-side check of a draft before it is stored.
    fn check_draft(draft: &Self::Draft) -> Result<(), String>;

    /// The free-text list edited as a comma separated field (tags or skills).
    fn list_field(draft: &Self::Draft) -> &[String];

    fn set_list_field(draft: &mut Self::Draft, values: Vec<String>);

    /// Draft pre-filled from an existing record, for the edit form.
    fn to_draft(&self) -> Self::Draft;
}

/// Display-order sort used by every collection listing: ascending order,
/// newest first on ties.
pub fn sort_for_display<R: Record>(records: &mut [R]) {
    records.sort_by(|a, b| {
        a.display_order()
            .cmp(&b.display_order())
            .then_with(|| b.created_at().cmp(&a.created_at()))
    });
}

pub(crate) fn require_text(value: &str, field: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} is required", field))
    } else {
        Ok(())
    }
}

/// Result of an image upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    pub url: String,
    pub filename: String,
    pub size: usize,
    pub mime_type: String,
}

/// Admin dashboard counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub templates: usize,
    pub portfolio: usize,
    pub team: usize,
    pub contacts: usize,
    pub unread_contacts: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn member(id: &str, order: i32, age_minutes: i64) -> TeamMember {
        TeamMember::from_draft(
            id.to_string(),
            order,
            Utc::now() - Duration::minutes(age_minutes),
            TeamDraft {
                name: id.to_string(),
                role: "Engineer".to_string(),
                ..TeamDraft::default()
            },
        )
    }

    #[test]
    fn test_sort_for_display_orders_by_display_order_then_newest() {
        let mut members = vec![member("c", 2, 0), member("old", 1, 10), member("new", 1, 1)];
        sort_for_display(&mut members);
        let ids: Vec<&str> = members.iter().map(|m| m.id()).collect();
        assert_eq!(ids, vec!["new", "old", "c"]);
    }

    #[test]
    fn test_collection_paths_and_tables() {
        assert_eq!(Collection::Templates.path(), "templates");
        assert_eq!(Collection::Portfolio.table(), "portfolio_projects");
        assert_eq!(Collection::Team.to_string(), "team");
    }
}
