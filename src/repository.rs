use crate::models::{Article, ArticleInput, User};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// RepoError
///
/// Persistence failures surfaced to handlers. A unique-key violation is
/// reported separately so callers can answer 409 instead of 500.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("record already exists")]
    Conflict,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Repository Trait
///
/// The persistence collaborator behind the blog handlers. Handlers only see
/// this contract, so tests can swap in an in-memory implementation.
///
/// **Send + Sync + async_trait** are required to share it as
/// `Arc<dyn Repository>` across request tasks.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn get_user(&self, username: &str) -> Result<Option<User>, RepoError>;
    // Fails with `RepoError::Conflict` when the username is taken.
    async fn create_user(&self, user: User) -> Result<User, RepoError>;

    // --- Article Retrieval ---
    // Public listing: `private = false` only.
    async fn get_public_articles(&self) -> Result<Vec<Article>, RepoError>;
    async fn get_public_articles_by(&self, username: &str) -> Result<Vec<Article>, RepoError>;
    // Owner view: private articles included.
    async fn get_articles_by(&self, username: &str) -> Result<Vec<Article>, RepoError>;
    async fn get_article(&self, id: Uuid) -> Result<Option<Article>, RepoError>;

    // --- Owner Actions ---
    async fn create_article(&self, username: &str, input: ArticleInput)
    -> Result<Article, RepoError>;
    // Owner-Only: `None` when the article is missing or belongs to someone else.
    async fn update_article(
        &self,
        id: Uuid,
        username: &str,
        input: ArticleInput,
    ) -> Result<Option<Article>, RepoError>;
    // Owner-Only: `false` when nothing was deleted.
    async fn delete_article(&self, id: Uuid, username: &str) -> Result<bool, RepoError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

const ARTICLE_COLUMNS: &str = "id, title, description, content, username, private, created_at";

/// PostgresRepository
///
/// The `Repository` implementation backed by PostgreSQL.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// ensure_schema
    ///
    /// Creates the `users` and `articles` tables when they are missing. Safe to
    /// run at every startup.
    pub async fn ensure_schema(&self) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                username      TEXT PRIMARY KEY,
                email         TEXT NOT NULL,
                password_hash TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS articles (
                id          UUID PRIMARY KEY,
                title       TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                content     TEXT NOT NULL DEFAULT '',
                username    TEXT NOT NULL REFERENCES users (username) ON DELETE CASCADE,
                private     BOOLEAN NOT NULL DEFAULT FALSE,
                created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn map_insert_err(err: sqlx::Error) -> RepoError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return RepoError::Conflict;
        }
    }
    RepoError::Database(err)
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn get_user(&self, username: &str) -> Result<Option<User>, RepoError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT username, email, password_hash FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_user(&self, user: User) -> Result<User, RepoError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING username, email, password_hash
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_err)
    }

    async fn get_public_articles(&self) -> Result<Vec<Article>, RepoError> {
        let sql = format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles WHERE private = false ORDER BY created_at DESC"
        );
        let articles = sqlx::query_as::<_, Article>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(articles)
    }

    async fn get_public_articles_by(&self, username: &str) -> Result<Vec<Article>, RepoError> {
        let sql = format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles \
             WHERE username = $1 AND private = false ORDER BY created_at DESC"
        );
        let articles = sqlx::query_as::<_, Article>(&sql)
            .bind(username)
            .fetch_all(&self.pool)
            .await?;
        Ok(articles)
    }

    async fn get_articles_by(&self, username: &str) -> Result<Vec<Article>, RepoError> {
        let sql = format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles WHERE username = $1 ORDER BY created_at DESC"
        );
        let articles = sqlx::query_as::<_, Article>(&sql)
            .bind(username)
            .fetch_all(&self.pool)
            .await?;
        Ok(articles)
    }

    async fn get_article(&self, id: Uuid) -> Result<Option<Article>, RepoError> {
        let sql = format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = $1");
        let article = sqlx::query_as::<_, Article>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(article)
    }

    async fn create_article(
        &self,
        username: &str,
        input: ArticleInput,
    ) -> Result<Article, RepoError> {
        let sql = format!(
            "INSERT INTO articles (id, title, description, content, username, private) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {ARTICLE_COLUMNS}"
        );
        sqlx::query_as::<_, Article>(&sql)
            .bind(Uuid::new_v4())
            .bind(input.title)
            .bind(input.description)
            .bind(input.content)
            .bind(username)
            .bind(input.private)
            .fetch_one(&self.pool)
            .await
            .map_err(map_insert_err)
    }

    async fn update_article(
        &self,
        id: Uuid,
        username: &str,
        input: ArticleInput,
    ) -> Result<Option<Article>, RepoError> {
        let sql = format!(
            "UPDATE articles SET title = $1, description = $2, content = $3, private = $4 \
             WHERE id = $5 AND username = $6 RETURNING {ARTICLE_COLUMNS}"
        );
        let article = sqlx::query_as::<_, Article>(&sql)
            .bind(input.title)
            .bind(input.description)
            .bind(input.content)
            .bind(input.private)
            .bind(id)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(article)
    }

    async fn delete_article(&self, id: Uuid, username: &str) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM articles WHERE id = $1 AND username = $2")
            .bind(id)
            .bind(username)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
