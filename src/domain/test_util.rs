use crate::auth::password;
use crate::domain::StoreError;
use crate::domain::post::{NewPost, Post, PostStore, PostWithAuthor};
use crate::domain::todo::{NewTodo, TodoItem, TodoStore};
use crate::domain::user::{User, UserStore};
use crate::persistence::Store;
use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime};
use std::sync::{Arc, RwLock};

/// Simulated connection state for the in-memory store, so tests can exercise the
/// port-error paths without a database.
pub enum Connectivity {
    Connected,
    Disconnected,
}

impl Connectivity {
    pub fn blow_up_if_disconnected(&self) -> Result<(), anyhow::Error> {
        match self {
            Connectivity::Connected => Ok(()),
            Connectivity::Disconnected => Err(anyhow!("could not reach the database")),
        }
    }
}

/// A user row as the in-memory store keeps it, digest included, so tests can assert
/// on what actually got persisted.
#[derive(Clone, Debug)]
pub struct StoredUser {
    pub id: i32,
    pub username: String,
    pub password_digest: String,
    pub email: Option<String>,
    pub created_at: NaiveDateTime,
}

struct StoreState {
    connectivity: Connectivity,
    clock_ticks: i64,
    next_user_id: i32,
    next_post_id: i32,
    next_todo_id: i32,
    users: Vec<StoredUser>,
    posts: Vec<Post>,
    todos: Vec<TodoItem>,
}

/// In-memory stand-in for the real database backends. Clones share the same state, so
/// a test can keep a handle for assertions after moving another copy into the app.
#[derive(Clone)]
pub struct InMemoryStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        InMemoryStore {
            state: Arc::new(RwLock::new(StoreState {
                connectivity: Connectivity::Connected,
                clock_ticks: 0,
                next_user_id: 0,
                next_post_id: 0,
                next_todo_id: 0,
                users: Vec::new(),
                posts: Vec::new(),
                todos: Vec::new(),
            })),
        }
    }

    /// Makes every subsequent port call fail as if the database were unreachable.
    pub fn disconnect(&self) {
        let mut state = self.state.write().expect("in-memory store lock poisoned");
        state.connectivity = Connectivity::Disconnected;
    }

    /// Inserts a user directly, digesting the given plaintext password the same way
    /// registration does. Returns the new user's id.
    pub fn seed_user(&self, username: &str, plain_password: &str) -> i32 {
        let mut state = self.state.write().expect("in-memory store lock poisoned");
        state.next_user_id += 1;
        let id = state.next_user_id;
        let created_at = state.tick();
        state.users.push(StoredUser {
            id,
            username: username.to_owned(),
            password_digest: password::digest(plain_password),
            email: None,
            created_at,
        });
        id
    }

    pub fn users(&self) -> Vec<StoredUser> {
        self.state
            .read()
            .expect("in-memory store lock poisoned")
            .users
            .clone()
    }

    pub fn posts(&self) -> Vec<Post> {
        self.state
            .read()
            .expect("in-memory store lock poisoned")
            .posts
            .clone()
    }

    pub fn todos(&self) -> Vec<TodoItem> {
        self.state
            .read()
            .expect("in-memory store lock poisoned")
            .todos
            .clone()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreState {
    /// Advances the fake clock one second per row so creation order and timestamp
    /// order always agree.
    fn tick(&mut self) -> NaiveDateTime {
        self.clock_ticks += 1;
        DateTime::from_timestamp(1_700_000_000 + self.clock_ticks, 0)
            .expect("fake clock out of range")
            .naive_utc()
    }
}

fn newest_first<T, K: Ord>(mut rows: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
    rows
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn insert_user(
        &self,
        username: &str,
        password_digest: &str,
        email: Option<&str>,
    ) -> Result<i32, StoreError> {
        let mut state = self.state.write().expect("in-memory store lock poisoned");
        state.connectivity.blow_up_if_disconnected()?;

        if state.users.iter().any(|user| user.username == username) {
            return Err(StoreError::DuplicateKey);
        }

        state.next_user_id += 1;
        let id = state.next_user_id;
        let created_at = state.tick();
        state.users.push(StoredUser {
            id,
            username: username.to_owned(),
            password_digest: password_digest.to_owned(),
            email: email.map(str::to_owned),
            created_at,
        });

        Ok(id)
    }

    async fn user_by_credentials(
        &self,
        username: &str,
        password_digest: &str,
    ) -> Result<Option<User>, StoreError> {
        let state = self.state.read().expect("in-memory store lock poisoned");
        state.connectivity.blow_up_if_disconnected()?;

        Ok(state
            .users
            .iter()
            .find(|user| user.username == username && user.password_digest == password_digest)
            .map(|user| User {
                id: user.id,
                username: user.username.clone(),
                email: user.email.clone(),
                created_at: user.created_at,
            }))
    }
}

#[async_trait]
impl PostStore for InMemoryStore {
    async fn insert_post(&self, author_id: i32, post: &NewPost) -> Result<i32, StoreError> {
        let mut state = self.state.write().expect("in-memory store lock poisoned");
        state.connectivity.blow_up_if_disconnected()?;

        state.next_post_id += 1;
        let id = state.next_post_id;
        let created_at = state.tick();
        state.posts.push(Post {
            id,
            title: post.title.clone(),
            content: post.content.clone(),
            author_id: Some(author_id),
            created_at,
        });

        Ok(id)
    }

    async fn recent_posts_with_authors(
        &self,
        limit: i64,
    ) -> Result<Vec<PostWithAuthor>, StoreError> {
        let state = self.state.read().expect("in-memory store lock poisoned");
        state.connectivity.blow_up_if_disconnected()?;

        let joined: Vec<PostWithAuthor> = state
            .posts
            .iter()
            .filter_map(|post| join_author(post, &state.users))
            .collect();

        Ok(newest_first(joined, |post| (post.created_at, post.id))
            .into_iter()
            .take(limit as usize)
            .collect())
    }

    async fn post_with_author(&self, post_id: i32) -> Result<Option<PostWithAuthor>, StoreError> {
        let state = self.state.read().expect("in-memory store lock poisoned");
        state.connectivity.blow_up_if_disconnected()?;

        Ok(state
            .posts
            .iter()
            .find(|post| post.id == post_id)
            .and_then(|post| join_author(post, &state.users)))
    }

    async fn posts_by_author(&self, author_id: i32) -> Result<Vec<Post>, StoreError> {
        let state = self.state.read().expect("in-memory store lock poisoned");
        state.connectivity.blow_up_if_disconnected()?;

        let authored: Vec<Post> = state
            .posts
            .iter()
            .filter(|post| post.author_id == Some(author_id))
            .cloned()
            .collect();

        Ok(newest_first(authored, |post| (post.created_at, post.id)))
    }
}

fn join_author(post: &Post, users: &[StoredUser]) -> Option<PostWithAuthor> {
    let author = users.iter().find(|user| Some(user.id) == post.author_id)?;
    Some(PostWithAuthor {
        id: post.id,
        title: post.title.clone(),
        content: post.content.clone(),
        author: author.username.clone(),
        created_at: post.created_at,
    })
}

#[async_trait]
impl TodoStore for InMemoryStore {
    async fn insert_todo(&self, owner_id: i32, new_todo: &NewTodo) -> Result<i32, StoreError> {
        let mut state = self.state.write().expect("in-memory store lock poisoned");
        state.connectivity.blow_up_if_disconnected()?;

        state.next_todo_id += 1;
        let id = state.next_todo_id;
        let created_at = state.tick();
        state.todos.push(TodoItem {
            id,
            task: new_todo.task.clone(),
            completed: false,
            owner_id: Some(owner_id),
            created_at,
        });

        Ok(id)
    }

    async fn todos_for_owner(&self, owner_id: i32) -> Result<Vec<TodoItem>, StoreError> {
        let state = self.state.read().expect("in-memory store lock poisoned");
        state.connectivity.blow_up_if_disconnected()?;

        let owned: Vec<TodoItem> = state
            .todos
            .iter()
            .filter(|todo| todo.owner_id == Some(owner_id))
            .cloned()
            .collect();

        Ok(newest_first(owned, |todo| (todo.created_at, todo.id)))
    }

    async fn set_todo_completed(
        &self,
        todo_id: i32,
        owner_id: i32,
        completed: bool,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().expect("in-memory store lock poisoned");
        state.connectivity.blow_up_if_disconnected()?;

        if let Some(todo) = state
            .todos
            .iter_mut()
            .find(|todo| todo.id == todo_id && todo.owner_id == Some(owner_id))
        {
            todo.completed = completed;
        }

        Ok(())
    }

    async fn delete_todo(&self, todo_id: i32, owner_id: i32) -> Result<(), StoreError> {
        let mut state = self.state.write().expect("in-memory store lock poisoned");
        state.connectivity.blow_up_if_disconnected()?;

        state
            .todos
            .retain(|todo| !(todo.id == todo_id && todo.owner_id == Some(owner_id)));

        Ok(())
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
