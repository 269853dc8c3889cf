use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{require_text, Collection, Record};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
        }
    }
}

impl TryFrom<String> for Difficulty {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "Beginner" => Ok(Difficulty::Beginner),
            "Intermediate" => Ok(Difficulty::Intermediate),
            "Advanced" => Ok(Difficulty::Advanced),
            other => Err(format!("unknown difficulty '{}'", other)),
        }
    }
}

/// Project template offered to students.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    #[sqlx(try_from = "String")]
    pub difficulty: Difficulty,
    pub tags: Vec<String>,
    pub features: Option<Vec<String>>,
    pub live_preview_url: Option<String>,
    pub is_featured: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateDraft {
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub difficulty: Difficulty,
    pub tags: Vec<String>,
    pub features: Option<Vec<String>>,
    pub live_preview_url: Option<String>,
    pub is_featured: bool,
}

impl Record for Template {
    type Draft = TemplateDraft;

    const COLLECTION: Collection = Collection::Templates;

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
        draft: TemplateDraft,
    ) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            image_url: draft.image_url,
            difficulty: draft.difficulty,
            tags: draft.tags,
            features: draft.features,
            live_preview_url: draft.live_preview_url,
            is_featured: draft.is_featured,
            display_order,
            created_at,
        }
    }

    fn apply(&mut self, draft: TemplateDraft) {
        self.title = draft.title;
        self.description = draft.description;
        self.image_url = draft.image_url;
        self.difficulty = draft.difficulty;
        self.tags = draft.tags;
        self.features = draft.features;
        self.live_preview_url = draft.live_preview_url;
        self.is_featured = draft.is_featured;
    }

    fn check_draft(draft: &TemplateDraft) -> Result<(), String> {
        require_text(&draft.title, "title")?;
        require_text(&draft.description, "description")
    }

    fn list_field(draft: &TemplateDraft) -> &[String] {
        &draft.tags
    }

    fn set_list_field(draft: &mut TemplateDraft, values: Vec<String>) {
        draft.tags = values;
    }

    fn to_draft(&self) -> TemplateDraft {
        TemplateDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            image_url: self.image_url.clone(),
            difficulty: self.difficulty,
            tags: self.tags.clone(),
            features: self.features.clone(),
            live_preview_url: self.live_preview_url.clone(),
            is_featured: self.is_featured,
        }
    }
}
