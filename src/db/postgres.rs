//! Postgres implementation of the store traits.

use async_trait::async_trait;
use sqlx::{
    postgres::{PgArguments, PgRow},
    query::QueryAs,
    FromRow, PgPool, Postgres,
};
use std::marker::PhantomData;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::models::{
    ContactSubmission, NewContact, PortfolioItem, Record, TeamMember, Template,
};
use crate::store::{check_permutation, CollectionStore, ContactStore, StoreError, StorePing};

type RecordQuery<'q, R> = QueryAs<'q, Postgres, R, PgArguments>;

/// Column layout of a collection's editable fields.
pub trait PgRecord: Record + for<'r> FromRow<'r, PgRow> {
    /// Editable columns, in the order [`PgRecord::bind_draft`] binds them.
    const COLUMNS: &'static [&'static str];

    fn bind_draft<'q>(
        query: RecordQuery<'q, Self>,
        draft: &'q Self::Draft,
    ) -> RecordQuery<'q, Self>;
}

impl PgRecord for Template {
    const COLUMNS: &'static [&'static str] = &[
        "title",
        "description",
        "image_url",
        "difficulty",
        "tags",
        "features",
        "live_preview_url",
        "is_featured",
    ];

    fn bind_draft<'q>(
        query: RecordQuery<'q, Self>,
        draft: &'q Self::Draft,
    ) -> RecordQuery<'q, Self> {
        query
            .bind(&draft.title)
            .bind(&draft.description)
            .bind(&draft.image_url)
            .bind(draft.difficulty.as_str())
            .bind(&draft.tags)
            .bind(&draft.features)
            .bind(&draft.live_preview_url)
            .bind(draft.is_featured)
    }
}

impl PgRecord for PortfolioItem {
    const COLUMNS: &'static [&'static str] = &[
        "title",
        "description",
        "image_url",
        "tags",
        "live_link",
        "github_link",
        "is_featured",
    ];

    fn bind_draft<'q>(
        query: RecordQuery<'q, Self>,
        draft: &'q Self::Draft,
    ) -> RecordQuery<'q, Self> {
        query
            .bind(&draft.title)
            .bind(&draft.description)
            .bind(&draft.image_url)
            .bind(&draft.tags)
            .bind(&draft.live_link)
            .bind(&draft.github_link)
            .bind(draft.is_featured)
    }
}

impl PgRecord for TeamMember {
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "role",
        "bio",
        "skills",
        "avatar_url",
        "github_url",
        "linkedin_url",
        "color_theme",
    ];

    fn bind_draft<'q>(
        query: RecordQuery<'q, Self>,
        draft: &'q Self::Draft,
    ) -> RecordQuery<'q, Self> {
        query
            .bind(&draft.name)
            .bind(&draft.role)
            .bind(&draft.bio)
            .bind(&draft.skills)
            .bind(&draft.avatar_url)
            .bind(&draft.github_url)
            .bind(&draft.linkedin_url)
            .bind(draft.color_theme.as_str())
    }
}

fn insert_sql(table: &str, columns: &[&str]) -> String {
    let placeholders: Vec<String> = (0..columns.len()).map(|i| format!("${}", i + 3)).collect();
    format!(
        "INSERT INTO {table} (id, display_order, {}) VALUES ($1, $2, {}) RETURNING *",
        columns.join(", "),
        placeholders.join(", ")
    )
}

fn update_sql(table: &str, columns: &[&str]) -> String {
    let assignments: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| format!("{} = ${}", column, i + 2))
        .collect();
    format!(
        "UPDATE {table} SET {} WHERE id = $1 RETURNING *",
        assignments.join(", ")
    )
}

pub struct PgCollection<R> {
    pool: PgPool,
    _record: PhantomData<fn() -> R>,
}

impl<R> PgCollection<R> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _record: PhantomData,
        }
    }
}

#[async_trait]
impl<R: PgRecord> CollectionStore<R> for PgCollection<R> {
    async fn list(&self) -> Result<Vec<R>, StoreError> {
        let table = R::COLLECTION.table();
        let records = sqlx::query_as::<_, R>(&format!(
            "SELECT * FROM {table} ORDER BY display_order ASC, created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    async fn get(&self, id: &str) -> Result<R, StoreError> {
        let table = R::COLLECTION.table();
        sqlx::query_as::<_, R>(&format!("SELECT * FROM {table} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found(R::COLLECTION.noun(), id))
    }

    async fn create(&self, draft: R::Draft) -> Result<R, StoreError> {
        R::check_draft(&draft).map_err(StoreError::Invalid)?;
        let table = R::COLLECTION.table();

        let mut tx = self.pool.begin().await?;
        sqlx::query(&format!("LOCK TABLE {table} IN SHARE ROW EXCLUSIVE MODE"))
            .execute(&mut *tx)
            .await?;

        let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&mut *tx)
            .await?;

        let sql = insert_sql(table, R::COLUMNS);
        let query = sqlx::query_as::<_, R>(&sql)
            .bind(Uuid::new_v4().to_string())
            .bind(count as i32);
        let record = R::bind_draft(query, &draft).fetch_one(&mut *tx).await?;

        tx.commit().await?;
        Ok(record)
    }

    async fn update(&self, id: &str, draft: R::Draft) -> Result<R, StoreError> {
        R::check_draft(&draft).map_err(StoreError::Invalid)?;

        let sql = update_sql(R::COLLECTION.table(), R::COLUMNS);
        let query = sqlx::query_as::<_, R>(&sql).bind(id);
        R::bind_draft(query, &draft)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found(R::COLLECTION.noun(), id))
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let table = R::COLLECTION.table();

        let mut tx = self.pool.begin().await?;
        sqlx::query(&format!("LOCK TABLE {table} IN SHARE ROW EXCLUSIVE MODE"))
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query(&format!("DELETE FROM {table} WHERE id = $1"))
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(R::COLLECTION.noun(), id));
        }

        sqlx::query(&format!(
            r#"
            UPDATE {table} AS t
            SET display_order = ranked.new_order
            FROM (
                SELECT id,
                       (ROW_NUMBER() OVER (ORDER BY display_order ASC, created_at DESC) - 1)::INT AS new_order
                FROM {table}
            ) AS ranked
            WHERE t.id = ranked.id
            "#
        ))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn reorder(&self, order: &[String]) -> Result<(), StoreError> {
        let table = R::COLLECTION.table();

        let mut tx = self.pool.begin().await?;
        sqlx::query(&format!("LOCK TABLE {table} IN SHARE ROW EXCLUSIVE MODE"))
            .execute(&mut *tx)
            .await?;

        let existing: Vec<(String,)> = sqlx::query_as(&format!("SELECT id FROM {table}"))
            .fetch_all(&mut *tx)
            .await?;
        check_permutation(existing.iter().map(|(id,)| id.as_str()), order)?;

        sqlx::query(&format!(
            r#"
            UPDATE {table} AS t
            SET display_order = (data.ord - 1)::INT
            FROM UNNEST($1::TEXT[]) WITH ORDINALITY AS data(id, ord)
            WHERE t.id = data.id
            "#
        ))
        .bind(order)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let table = R::COLLECTION.table();
        let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }
}

pub struct PgContacts {
    pool: PgPool,
}

impl PgContacts {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContactStore for PgContacts {
    async fn list(&self) -> Result<Vec<ContactSubmission>, StoreError> {
        let submissions = sqlx::query_as::<_, ContactSubmission>(
            "SELECT * FROM contact_submissions ORDER BY submitted_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(submissions)
    }

    async fn create(&self, contact: NewContact) -> Result<ContactSubmission, StoreError> {
        let submission = sqlx::query_as::<_, ContactSubmission>(
            r#"
            INSERT INTO contact_submissions (id, name, email, phone, project_type, message)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&contact.name)
        .bind(&contact.email)
        .bind(&contact.phone)
        .bind(&contact.project_type)
        .bind(&contact.message)
        .fetch_one(&self.pool)
        .await?;
        Ok(submission)
    }

    async fn mark_read(&self, id: &str) -> Result<ContactSubmission, StoreError> {
        sqlx::query_as::<_, ContactSubmission>(
            "UPDATE contact_submissions SET is_read = true WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("contact", id))
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM contact_submissions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("contact", id));
        }
        Ok(())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM contact_submissions")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }

    async fn count_unread(&self) -> Result<usize, StoreError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM contact_submissions WHERE is_read = false")
                .fetch_one(&self.pool)
                .await?;
        Ok(count as usize)
    }
}

pub struct PgPing {
    pool: PgPool,
}

impl PgPing {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StorePing for PgPing {
    async fn ping(&self) -> Result<Duration, StoreError> {
        let start = Instant::now();
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(start.elapsed())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_sql_numbers_placeholders_after_id_and_order() {
        let sql = insert_sql("team_members", &["name", "role"]);
        assert_eq!(
            sql,
            "INSERT INTO team_members (id, display_order, name, role) VALUES ($1, $2, $3, $4) RETURNING *"
        );
    }

    #[test]
    fn test_update_sql_binds_id_first() {
        let sql = update_sql("project_templates", &["title", "tags"]);
        assert_eq!(
            sql,
            "UPDATE project_templates SET title = $2, tags = $3 WHERE id = $1 RETURNING *"
        );
    }

    #[test]
    fn test_columns_match_draft_fields() {
        assert_eq!(Template::COLUMNS.len(), 8);
        assert_eq!(PortfolioItem::COLUMNS.len(), 7);
        assert_eq!(TeamMember::COLUMNS.len(), 8);
    }
}
