use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{require_text, Collection, Record};

/// Card accent for a team member. Presentation only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTheme {
    #[default]
    Primary,
    Secondary,
}

impl ColorTheme {
    pub fn as_str(self) -> &'static str {
        match self {
            ColorTheme::Primary => "primary",
            ColorTheme::Secondary => "secondary",
        }
    }
}

impl TryFrom<String> for ColorTheme {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "primary" => Ok(ColorTheme::Primary),
            "secondary" => Ok(ColorTheme::Secondary),
            other => Err(format!("unknown color theme '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    pub role: String,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub avatar_url: Option<String>,
    pub github_url: Option<String>,
    pub linkedin_url: Option<String>,
    #[sqlx(try_from = "String")]
    pub color_theme: ColorTheme,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamDraft {
    pub name: String,
    pub role: String,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub avatar_url: Option<String>,
    pub github_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub color_theme: ColorTheme,
}

impl Record for TeamMember {
    type Draft = TeamDraft;

    const COLLECTION: Collection = Collection::Team;

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
        self.avatar_url.as_deref()
    }

    fn from_draft(
        id: String,
        display_order: i32,
        created_at: DateTime<Utc>,
        draft: TeamDraft,
    ) -> Self {
        Self {
            id,
            name: draft.name,
            role: draft.role,
            bio: draft.bio,
            skills: draft.skills,
            avatar_url: draft.avatar_url,
            github_url: draft.github_url,
            linkedin_url: draft.linkedin_url,
            color_theme: draft.color_theme,
            display_order,
            created_at,
        }
    }

    fn apply(&mut self, draft: TeamDraft) {
        self.name = draft.name;
        self.role = draft.role;
        self.bio = draft.bio;
        self.skills = draft.skills;
        self.avatar_url = draft.avatar_url;
        self.github_url = draft.github_url;
        self.linkedin_url = draft.linkedin_url;
        self.color_theme = draft.color_theme;
    }

    fn check_draft(draft: &TeamDraft) -> Result<(), String> {
        require_text(&draft.name, "name")?;
        require_text(&draft.role, "role")
    }

    fn list_field(draft: &TeamDraft) -> &[String] {
        &draft.skills
    }

    fn set_list_field(draft: &mut TeamDraft, values: Vec<String>) {
        draft.skills = values;
    }

    fn to_draft(&self) -> TeamDraft {
        TeamDraft {
            name: self.name.clone(),
            role: self.role.clone(),
            bio: self.bio.clone(),
            skills: self.skills.clone(),
            avatar_url: self.avatar_url.clone(),
            github_url: self.github_url.clone(),
            linkedin_url: self.linkedin_url.clone(),
            color_theme: self.color_theme,
        }
    }
}
