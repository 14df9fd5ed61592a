use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::IdeaStore;
use crate::models::idea::{Idea, IdeaChanges, NewIdea};

const IDEA_COLUMNS: &str =
    "id, name, email, description, attachment_path, status, priority, comment, submitted_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    /// Run pending migrations from the migrations/ directory.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub async fn ping(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl IdeaStore for PgStore {
    async fn insert(&self, idea: NewIdea) -> anyhow::Result<Idea> {
        let row = sqlx::query_as::<_, Idea>(&format!(
            r#"INSERT INTO ideas (name, email, description, attachment_path, status, priority, comment, submitted_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING {}"#,
            IDEA_COLUMNS
        ))
        .bind(&idea.name)
        .bind(&idea.email)
        .bind(&idea.description)
        .bind(&idea.attachment_path)
        .bind(idea.status)
        .bind(idea.priority)
        .bind(&idea.comment)
        .bind(idea.submitted_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list(&self) -> anyhow::Result<Vec<Idea>> {
        let rows = sqlx::query_as::<_, Idea>(&format!(
            "SELECT {} FROM ideas ORDER BY submitted_at ASC, id ASC",
            IDEA_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Idea>> {
        let row = sqlx::query_as::<_, Idea>(&format!(
            "SELECT {} FROM ideas WHERE id = $1",
            IDEA_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update(&self, id: Uuid, changes: &IdeaChanges) -> anyhow::Result<Option<Idea>> {
        let row = sqlx::query_as::<_, Idea>(&format!(
            r#"UPDATE ideas
               SET status   = COALESCE($2, status),
                   priority = COALESCE($3, priority),
                   comment  = COALESCE($4, comment)
               WHERE id = $1
               RETURNING {}"#,
            IDEA_COLUMNS
        ))
        .bind(id)
        .bind(changes.status)
        .bind(changes.priority)
        .bind(changes.comment.as_deref())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM ideas WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
