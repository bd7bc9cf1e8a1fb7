use crate::domain;
use chrono::NaiveDateTime;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use validator::Validate;

/// Form body for the registration page. The password is validated here but only its
/// digest ever reaches the store.
#[derive(Deserialize, Display, Validate)]
#[display("{username}")]
#[cfg_attr(test, derive(Serialize))]
pub struct RegisterForm {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
    pub email: Option<String>,
}

impl RegisterForm {
    /// Browsers submit an empty string for a blank email field; that's stored as no
    /// email at all.
    pub fn into_new_user(self) -> domain::user::NewUser {
        domain::user::NewUser {
            username: self.username,
            password: self.password,
            email: self.email.filter(|email| !email.is_empty()),
        }
    }
}

/// Form body for the login page
#[derive(Deserialize)]
#[cfg_attr(test, derive(Serialize))]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl From<LoginForm> for domain::user::Credentials {
    fn from(value: LoginForm) -> Self {
        domain::user::Credentials {
            username: value.username,
            password: value.password,
        }
    }
}

/// Form body for the post composer
#[derive(Deserialize, Validate)]
#[cfg_attr(test, derive(Serialize))]
pub struct PostForm {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
}

impl From<PostForm> for domain::post::NewPost {
    fn from(value: PostForm) -> Self {
        domain::post::NewPost {
            title: value.title,
            content: value.content,
        }
    }
}

/// DTO for a returned todo on the API
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug, PartialEq))]
pub struct TodoItem {
    #[schema(example = 3)]
    pub id: i32,
    #[schema(example = "buy milk")]
    pub task: String,
    pub completed: bool,
    pub created_at: NaiveDateTime,
}

impl From<domain::todo::TodoItem> for TodoItem {
    fn from(value: domain::todo::TodoItem) -> Self {
        TodoItem {
            id: value.id,
            task: value.task,
            completed: value.completed,
            created_at: value.created_at,
        }
    }
}

/// DTO for creating a new todo via the API
#[derive(Deserialize, Validate, ToSchema)]
#[cfg_attr(test, derive(Serialize))]
pub struct NewTodo {
    #[validate(length(min = 1))]
    #[schema(example = "buy milk")]
    pub task: String,
}

impl From<NewTodo> for domain::todo::NewTodo {
    fn from(value: NewTodo) -> Self {
        domain::todo::NewTodo { task: value.task }
    }
}

/// DTO for updating a todo's completion flag via the API. A body without the flag
/// means "not completed".
#[derive(Deserialize, ToSchema)]
#[cfg_attr(test, derive(Serialize))]
pub struct UpdateTodo {
    #[serde(default)]
    pub completed: bool,
}

/// DTO for a todo immediately after creation
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug, PartialEq))]
pub struct CreatedTodo {
    #[schema(example = 3)]
    pub id: i32,
    #[schema(example = "buy milk")]
    pub task: String,
    pub completed: bool,
}

/// Acknowledgement body for todo updates and deletions. Also returned when the id
/// didn't match anything the caller owns.
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug))]
pub struct UpdateAck {
    pub success: bool,
}

/// Collects the schema definitions for the OpenAPI document
#[derive(OpenApi)]
#[openapi(components(schemas(TodoItem, NewTodo, UpdateTodo, CreatedTodo, UpdateAck)))]
pub struct OpenApiSchemas;
