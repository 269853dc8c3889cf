use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{require_text, Collection, Record};

/// Delivered project shown in the public portfolio.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct PortfolioItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub tags: Vec<String>,
    pub live_link: Option<String>,
    pub github_link: Option<String>,
    pub is_featured: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortfolioDraft {
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub tags: Vec<String>,
    pub live_link: Option<String>,
    pub github_link: Option<String>,
    pub is_featured: bool,
}

impl Record for PortfolioItem {
    type Draft = PortfolioDraft;

    const COLLECTION: Collection = Collection::Portfolio;

    fn id(&self) -> &str {
        &self.id
    }

    fn display_order(&self) -> i32 {
        self.display_order
    }

    fn set_display_order(&mut self, order: i32) {
        self.display_order = order;
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn image_ref(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    fn from_draft(
        id: String,
        display_order: i32,
        created_at: DateTime<Utc>,
        draft: PortfolioDraft,
    ) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            image_url: draft.image_url,
            tags: draft.tags,
            live_link: draft.live_link,
            github_link: draft.github_link,
            is_featured: draft.is_featured,
            display_order,
            created_at,
        }
    }

    fn apply(&mut self, draft: PortfolioDraft) {
        self.title = draft.title;
        self.description = draft.description;
        self.image_url = draft.image_url;
        self.tags = draft.tags;
        self.live_link = draft.live_link;
        self.github_link = draft.github_link;
        self.is_featured = draft.is_featured;
    }

    fn check_draft(draft: &PortfolioDraft) -> Result<(), String> {
        require_text(&draft.title, "title")?;
        require_text(&draft.description, "description")
    }

    fn list_field(draft: &PortfolioDraft) -> &[String] {
        &draft.tags
    }

    fn set_list_field(draft: &mut PortfolioDraft, values: Vec<String>) {
        draft.tags = values;
    }

    fn to_draft(&self) -> PortfolioDraft {
        PortfolioDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            image_url: self.image_url.clone(),
            tags: self.tags.clone(),
            live_link: self.live_link.clone(),
            github_link: self.github_link.clone(),
            is_featured: self.is_featured,
        }
    }
}
