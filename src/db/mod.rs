pub mod postgres;

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;
use url::Url;

use crate::models::{PortfolioItem, TeamMember, Template};
use crate::store::Stores;

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgresql://localhost/devforge".to_string()),
            max_connections: std::env::var("DB_POOL_MAX")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            min_connections: std::env::var("DB_POOL_MIN")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
            connect_timeout_secs: std::env::var("DB_CONNECT_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            idle_timeout_secs: std::env::var("DB_IDLE_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(300),
        }
    }
}

/// Database URL with the password swapped for `***`, safe to log.
fn redact_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) => {
            if url.password().is_some() && url.set_password(Some("***")).is_err() {
                return "<unloggable database url>".to_string();
            }
            url.to_string()
        }
        Err(_) => "<unparseable database url>".to_string(),
    }
}

pub async fn init_pool(config: &DbConfig) -> Result<PgPool, sqlx::Error> {
    tracing::info!("Initializing database connection pool...");
    tracing::debug!("Database URL: {}", redact_url(&config.url));

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(std::time::Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(std::time::Duration::from_secs(1800))
        .test_before_acquire(true)
        .connect(&config.url)
        .await?;

    sqlx::query("SELECT 1").fetch_one(&pool).await?;

    tracing::info!("Database connection pool initialized successfully");
    Ok(pool)
}

/// Postgres-backed handles for every collection.
pub fn stores(pool: PgPool) -> Stores {
    Stores {
        templates: Arc::new(postgres::PgCollection::<Template>::new(pool.clone())),
        portfolio: Arc::new(postgres::PgCollection::<PortfolioItem>::new(pool.clone())),
        team: Arc::new(postgres::PgCollection::<TeamMember>::new(pool.clone())),
        contacts: Arc::new(postgres::PgContacts::new(pool.clone())),
        ping: Arc::new(postgres::PgPing::new(pool)),
    }
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running database migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS project_templates (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            image_url TEXT,
            difficulty TEXT NOT NULL DEFAULT 'Intermediate',
            tags TEXT[] NOT NULL DEFAULT '{}',
            features TEXT[],
            live_preview_url TEXT,
            is_featured BOOLEAN NOT NULL DEFAULT false,
            display_order INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
    "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS portfolio_projects (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            image_url TEXT,
            tags TEXT[] NOT NULL DEFAULT '{}',
            live_link TEXT,
            github_link TEXT,
            is_featured BOOLEAN NOT NULL DEFAULT false,
            display_order INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
    "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS team_members (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            role TEXT NOT NULL,
            bio TEXT,
            skills TEXT[] NOT NULL DEFAULT '{}',
            avatar_url TEXT,
            github_url TEXT,
            linkedin_url TEXT,
            color_theme TEXT NOT NULL DEFAULT 'primary',
            display_order INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
    "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS contact_submissions (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            phone TEXT,
            project_type TEXT,
            message TEXT NOT NULL,
            is_read BOOLEAN NOT NULL DEFAULT false,
            submitted_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
    "#,
    )
    .execute(pool)
    .await?;

    for statement in [
        "CREATE INDEX IF NOT EXISTS idx_project_templates_order ON project_templates(display_order, created_at DESC)",
        "CREATE INDEX IF NOT EXISTS idx_portfolio_projects_order ON portfolio_projects(display_order, created_at DESC)",
        "CREATE INDEX IF NOT EXISTS idx_team_members_order ON team_members(display_order, created_at DESC)",
        "CREATE INDEX IF NOT EXISTS idx_contact_submissions_submitted_at ON contact_submissions(submitted_at DESC)",
        "CREATE INDEX IF NOT EXISTS idx_contact_submissions_is_read ON contact_submissions(is_read)",
    ] {
        sqlx::query(statement).execute(pool).await?;
    }

    tracing::info!("Database migrations completed successfully");

    Ok(())
}
