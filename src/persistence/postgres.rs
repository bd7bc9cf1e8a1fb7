use super::{PostRow, PostWithAuthorRow, Store, TodoRow, UserRow};
use crate::domain::StoreError;
use crate::domain::post::{NewPost, Post, PostStore, PostWithAuthor};
use crate::domain::todo::{NewTodo, TodoItem, TodoStore};
use crate::domain::user::{User, UserStore};
use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

/// The server-based backend. Uses `$n` placeholders and `SERIAL` surrogate keys.
pub struct PgStore {
    pool: PgPool,
}

const SCHEMA: [&str; 3] = [
    "CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        username TEXT UNIQUE NOT NULL,
        password_hash TEXT NOT NULL,
        email TEXT,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE TABLE IF NOT EXISTS posts (
        id SERIAL PRIMARY KEY,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        author_id INTEGER REFERENCES users (id),
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE TABLE IF NOT EXISTS todos (
        id SERIAL PRIMARY KEY,
        task TEXT NOT NULL,
        completed BOOLEAN NOT NULL DEFAULT FALSE,
        user_id INTEGER REFERENCES users (id),
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    )",
];

impl PgStore {
    pub async fn connect(url: &str) -> Result<Self, anyhow::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect(url)
            .await
            .context("connecting to PostgreSQL")?;

        Ok(PgStore { pool })
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }

        Ok(())
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(
        &self,
        username: &str,
        password_digest: &str,
        email: Option<&str>,
    ) -> Result<i32, StoreError> {
        let id: i32 = sqlx::query_scalar(
            "INSERT INTO users (username, password_hash, email) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(username)
        .bind(password_digest)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn user_by_credentials(
        &self,
        username: &str,
        password_digest: &str,
    ) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, email, created_at FROM users \
             WHERE username = $1 AND password_hash = $2",
        )
        .bind(username)
        .bind(password_digest)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user.map(User::from))
    }
}

#[async_trait]
impl PostStore for PgStore {
    async fn insert_post(&self, author_id: i32, post: &NewPost) -> Result<i32, StoreError> {
        let id: i32 = sqlx::query_scalar(
            "INSERT INTO posts (title, content, author_id) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&post.title)
        .bind(&post.content)
        .bind(author_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn recent_posts_with_authors(
        &self,
        limit: i64,
    ) -> Result<Vec<PostWithAuthor>, StoreError> {
        let posts = sqlx::query_as::<_, PostWithAuthorRow>(
            "SELECT p.id, p.title, p.content, u.username AS author, p.created_at \
             FROM posts p JOIN users u ON p.author_id = u.id \
             ORDER BY p.created_at DESC, p.id DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts.into_iter().map(PostWithAuthor::from).collect())
    }

    async fn post_with_author(&self, post_id: i32) -> Result<Option<PostWithAuthor>, StoreError> {
        let post = sqlx::query_as::<_, PostWithAuthorRow>(
            "SELECT p.id, p.title, p.content, u.username AS author, p.created_at \
             FROM posts p JOIN users u ON p.author_id = u.id WHERE p.id = $1",
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post.map(PostWithAuthor::from))
    }

    async fn posts_by_author(&self, author_id: i32) -> Result<Vec<Post>, StoreError> {
        let posts = sqlx::query_as::<_, PostRow>(
            "SELECT id, title, content, author_id, created_at FROM posts \
             WHERE author_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts.into_iter().map(Post::from).collect())
    }
}

#[async_trait]
impl TodoStore for PgStore {
    async fn insert_todo(&self, owner_id: i32, new_todo: &NewTodo) -> Result<i32, StoreError> {
        let id: i32 = sqlx::query_scalar(
            "INSERT INTO todos (task, user_id) VALUES ($1, $2) RETURNING id",
        )
        .bind(&new_todo.task)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn todos_for_owner(&self, owner_id: i32) -> Result<Vec<TodoItem>, StoreError> {
        let todos = sqlx::query_as::<_, TodoRow>(
            "SELECT id, task, completed, user_id, created_at FROM todos \
             WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(todos.into_iter().map(TodoItem::from).collect())
    }

    async fn set_todo_completed(
        &self,
        todo_id: i32,
        owner_id: i32,
        completed: bool,
    ) -> Result<(), StoreError> {
        // Zero affected rows is fine: the owner filter swallows foreign ids.
        sqlx::query("UPDATE todos SET completed = $1 WHERE id = $2 AND user_id = $3")
            .bind(completed)
            .bind(todo_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_todo(&self, todo_id: i32, owner_id: i32) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM todos WHERE id = $1 AND user_id = $2")
            .bind(todo_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
