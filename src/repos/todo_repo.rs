/*
 * Responsibility
 * - todos CRUD, always scoped to the owning user
 * - Rows are keyed by ("userId", "todoId"); listing goes through "userId"
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::repos::error::RepoResult;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct TodoRow {
    #[sqlx(rename = "userId")]
    pub user_id: String,

    #[sqlx(rename = "todoId")]
    pub todo_id: Uuid,

    #[sqlx(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    pub name: String,

    #[sqlx(rename = "dueDate")]
    pub due_date: String,

    pub done: bool,

    #[sqlx(rename = "attachmentUrl")]
    pub attachment_url: Option<String>,
}

/// Partial update: `None` leaves the column unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TodoUpdate {
    pub name: Option<String>,
    pub due_date: Option<String>,
    pub done: Option<bool>,
}

/// Persistence contract for todo items.
#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn list_by_user(&self, user_id: &str) -> RepoResult<Vec<TodoRow>>;

    async fn get(&self, user_id: &str, todo_id: Uuid) -> RepoResult<Option<TodoRow>>;

    async fn create(&self, row: &TodoRow) -> RepoResult<TodoRow>;

    // Returns None when the user has no such todo.
    async fn update(
        &self,
        user_id: &str,
        todo_id: Uuid,
        update: &TodoUpdate,
    ) -> RepoResult<Option<TodoRow>>;

    async fn set_attachment_url(
        &self,
        user_id: &str,
        todo_id: Uuid,
        attachment_url: &str,
    ) -> RepoResult<bool>;

    async fn delete(&self, user_id: &str, todo_id: Uuid) -> RepoResult<bool>;
}

#[derive(Clone, Debug)]
pub struct PgTodoRepo {
    pool: PgPool,
}

impl PgTodoRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TodoStore for PgTodoRepo {
    async fn list_by_user(&self, user_id: &str) -> RepoResult<Vec<TodoRow>> {
        let rows = sqlx::query_as::<_, TodoRow>(
            r#"
            SELECT
                "userId", "todoId", "createdAt", name, "dueDate", done, "attachmentUrl"
            FROM todos
            WHERE "userId" = $1
            ORDER BY "createdAt" DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn get(&self, user_id: &str, todo_id: Uuid) -> RepoResult<Option<TodoRow>> {
        let row = sqlx::query_as::<_, TodoRow>(
            r#"
            SELECT
                "userId", "todoId", "createdAt", name, "dueDate", done, "attachmentUrl"
            FROM todos
            WHERE "userId" = $1 AND "todoId" = $2
            "#,
        )
        .bind(user_id)
        .bind(todo_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn create(&self, row: &TodoRow) -> RepoResult<TodoRow> {
        let row = sqlx::query_as::<_, TodoRow>(
            r#"
            INSERT INTO todos
                ("userId", "todoId", "createdAt", name, "dueDate", done, "attachmentUrl")
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING
                "userId", "todoId", "createdAt", name, "dueDate", done, "attachmentUrl"
            "#,
        )
        .bind(&row.user_id)
        .bind(row.todo_id)
        .bind(row.created_at)
        .bind(&row.name)
        .bind(&row.due_date)
        .bind(row.done)
        .bind(row.attachment_url.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update(
        &self,
        user_id: &str,
        todo_id: Uuid,
        update: &TodoUpdate,
    ) -> RepoResult<Option<TodoRow>> {
        let row = sqlx::query_as::<_, TodoRow>(
            r#"
            UPDATE todos
            SET
                name = COALESCE($3, name),
                "dueDate" = COALESCE($4, "dueDate"),
                done = COALESCE($5, done)
            WHERE "userId" = $1 AND "todoId" = $2
            RETURNING
                "userId", "todoId", "createdAt", name, "dueDate", done, "attachmentUrl"
            "#,
        )
        .bind(user_id)
        .bind(todo_id)
        .bind(update.name.as_deref())
        .bind(update.due_date.as_deref())
        .bind(update.done)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn set_attachment_url(
        &self,
        user_id: &str,
        todo_id: Uuid,
        attachment_url: &str,
    ) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE todos
            SET "attachmentUrl" = $3
            WHERE "userId" = $1 AND "todoId" = $2
            "#,
        )
        .bind(user_id)
        .bind(todo_id)
        .bind(attachment_url)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, user_id: &str, todo_id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM todos
            WHERE "userId" = $1 AND "todoId" = $2
            "#,
        )
        .bind(user_id)
        .bind(todo_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
