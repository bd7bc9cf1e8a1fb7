use crate::auth::session::AuthSession;
use crate::dto::{CreatedTodo, NewTodo, TodoItem, UpdateAck, UpdateTodo};
use crate::routing_utils::{DomainErrorResponse, Json, ValidationErrorResponse};
use crate::{AppState, SharedData, domain, dto};
use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::ErrorResponse;
use axum::routing::{get, put};
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;
use validator::Validate;

/// OpenAPI definitions for the todo API
#[derive(OpenApi)]
#[openapi(paths(list_todos, create_todo, update_todo, delete_todo))]
pub struct TodoApi;

/// Adds the JSON todo routes; mounted under `/api` by the router assembly.
pub fn todo_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/:todo_id", put(update_todo).delete(delete_todo))
}

/// Lists the caller's todos, newest first.
#[utoipa::path(
    get,
    path = "/api/todos",
    responses(
        (status = 200, description = "The caller's todos, newest first", body = [TodoItem]),
        (status = 303, description = "Redirect to the login page when no session is active"),
    )
)]
async fn list_todos(
    session: AuthSession,
    State(shared): AppState,
) -> Result<Json<Vec<dto::TodoItem>>, DomainErrorResponse> {
    info!("Listing todos for user {}", session.user_id);
    let todos = domain::todo::todos_owned_by(session.user_id, &*shared.store).await?;

    Ok(Json(todos.into_iter().map(dto::TodoItem::from).collect()))
}

/// Creates a todo owned by the caller.
#[utoipa::path(
    post,
    path = "/api/todos",
    request_body = NewTodo,
    responses(
        (status = 201, description = "The created todo", body = CreatedTodo),
        (status = 400, description = "The task was missing or empty"),
        (status = 303, description = "Redirect to the login page when no session is active"),
    )
)]
async fn create_todo(
    session: AuthSession,
    State(shared): AppState,
    Json(new_todo): Json<dto::NewTodo>,
) -> Result<(StatusCode, Json<dto::CreatedTodo>), ErrorResponse> {
    info!("User {} is creating a todo", session.user_id);
    new_todo
        .validate()
        .map_err(ValidationErrorResponse::from)?;

    let task = new_todo.task.clone();
    let todo_id = domain::todo::create_todo(session.user_id, &new_todo.into(), &*shared.store)
        .await
        .map_err(DomainErrorResponse::from)?;

    Ok((
        StatusCode::CREATED,
        Json(dto::CreatedTodo {
            id: todo_id,
            task,
            completed: false,
        }),
    ))
}

/// Sets the completion flag on one of the caller's todos. An id belonging to someone
/// else (or to nobody) changes nothing and still acknowledges success.
#[utoipa::path(
    put,
    path = "/api/todos/{todo_id}",
    request_body = UpdateTodo,
    params(("todo_id" = i32, Path, description = "Surrogate id of the todo to update")),
    responses(
        (status = 200, description = "Acknowledgement, whether or not a row matched", body = UpdateAck),
        (status = 303, description = "Redirect to the login page when no session is active"),
    )
)]
async fn update_todo(
    session: AuthSession,
    State(shared): AppState,
    Path(todo_id): Path<i32>,
    Json(update): Json<dto::UpdateTodo>,
) -> Result<Json<dto::UpdateAck>, DomainErrorResponse> {
    info!("User {} is updating todo {todo_id}", session.user_id);
    domain::todo::set_completed(session.user_id, todo_id, update.completed, &*shared.store).await?;

    Ok(Json(dto::UpdateAck { success: true }))
}

/// Deletes one of the caller's todos, with the same silent no-match policy as the
/// update.
#[utoipa::path(
    delete,
    path = "/api/todos/{todo_id}",
    params(("todo_id" = i32, Path, description = "Surrogate id of the todo to delete")),
    responses(
        (status = 200, description = "Acknowledgement, whether or not a row matched", body = UpdateAck),
        (status = 303, description = "Redirect to the login page when no session is active"),
    )
)]
async fn delete_todo(
    session: AuthSession,
    State(shared): AppState,
    Path(todo_id): Path<i32>,
) -> Result<Json<dto::UpdateAck>, DomainErrorResponse> {
    info!("User {} is deleting todo {todo_id}", session.user_id);
    domain::todo::remove_todo(session.user_id, todo_id, &*shared.store).await?;

    Ok(Json(dto::UpdateAck { success: true }))
}
