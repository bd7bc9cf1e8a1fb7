mod postgres;
mod sqlite;

pub use postgres::PgStore;
pub use sqlite::SqliteStore;

use crate::app_env;
use crate::domain::StoreError;
use crate::domain::post::{Post, PostStore, PostWithAuthor};
use crate::domain::todo::{TodoItem, TodoStore};
use crate::domain::user::{User, UserStore};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::FromRow;
use std::env;
use tracing::info;

/// The full capability set a database backend provides: the three entity ports plus
/// idempotent schema creation. Selected once at startup via [connect]; handlers only
/// ever see the trait.
#[async_trait]
pub trait Store: UserStore + PostStore + TodoStore {
    /// Creates the `users`, `posts` and `todos` tables if they are absent. Safe to
    /// call on every startup; never drops or alters an existing table.
    async fn ensure_schema(&self) -> Result<(), StoreError>;
}

/// Which database engine backs the application, resolved once from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    Postgres { url: String },
    Sqlite { db_file: String },
}

impl BackendConfig {
    /// Picks the backend: a populated [app_env::DB_URL] selects PostgreSQL, its
    /// absence the local SQLite file from [app_env::SQLITE_DB_FILE] (default
    /// `app.db`).
    pub fn from_env() -> Self {
        match env::var(app_env::DB_URL) {
            Ok(url) if !url.is_empty() => BackendConfig::Postgres { url },
            _ => BackendConfig::Sqlite {
                db_file: env::var(app_env::SQLITE_DB_FILE)
                    .unwrap_or_else(|_| "app.db".to_owned()),
            },
        }
    }
}

/// Connects the configured backend and returns it behind the [Store] interface.
pub async fn connect(config: BackendConfig) -> Result<Box<dyn Store>, anyhow::Error> {
    match config {
        BackendConfig::Postgres { url } => {
            info!("Using the PostgreSQL backend");
            Ok(Box::new(PgStore::connect(&url).await?))
        }
        BackendConfig::Sqlite { db_file } => {
            info!("Using the SQLite backend at {db_file}");
            Ok(Box::new(SqliteStore::connect(&db_file).await?))
        }
    }
}

impl From<sqlx::Error> for StoreError {
    /// Normalizes the backends' distinct unique-violation errors into the one
    /// duplicate-key condition callers match on.
    fn from(err: sqlx::Error) -> Self {
        let is_unique_violation = matches!(
            &err,
            sqlx::Error::Database(db_err)
                if matches!(db_err.kind(), sqlx::error::ErrorKind::UniqueViolation)
        );

        if is_unique_violation {
            StoreError::DuplicateKey
        } else {
            StoreError::CommsFailure(err.into())
        }
    }
}

/// Row shapes shared by both backends. The column lists in the adapters' SELECTs line
/// up with these field names.
#[derive(FromRow)]
pub(crate) struct UserRow {
    id: i32,
    username: String,
    email: Option<String>,
    created_at: NaiveDateTime,
}

impl From<UserRow> for User {
    fn from(value: UserRow) -> Self {
        User {
            id: value.id,
            username: value.username,
            email: value.email,
            created_at: value.created_at,
        }
    }
}

#[derive(FromRow)]
pub(crate) struct PostRow {
    id: i32,
    title: String,
    content: String,
    author_id: Option<i32>,
    created_at: NaiveDateTime,
}

impl From<PostRow> for Post {
    fn from(value: PostRow) -> Self {
        Post {
            id: value.id,
            title: value.title,
            content: value.content,
            author_id: value.author_id,
            created_at: value.created_at,
        }
    }
}

#[derive(FromRow)]
pub(crate) struct PostWithAuthorRow {
    id: i32,
    title: String,
    content: String,
    author: String,
    created_at: NaiveDateTime,
}

impl From<PostWithAuthorRow> for PostWithAuthor {
    fn from(value: PostWithAuthorRow) -> Self {
        PostWithAuthor {
            id: value.id,
            title: value.title,
            content: value.content,
            author: value.author,
            created_at: value.created_at,
        }
    }
}

#[derive(FromRow)]
pub(crate) struct TodoRow {
    id: i32,
    task: String,
    completed: bool,
    user_id: Option<i32>,
    created_at: NaiveDateTime,
}

impl From<TodoRow> for TodoItem {
    fn from(value: TodoRow) -> Self {
        TodoItem {
            id: value.id,
            task: value.task,
            completed: value.completed,
            owner_id: value.user_id,
            created_at: value.created_at,
        }
    }
}
