use crate::SharedData;
use axum::Router;
use std::sync::Arc;

pub mod pages;
pub mod swagger;
pub mod todos;

#[cfg(test)]
pub mod test_util;

/// Assembles the full application router: the server-rendered pages at the root, the
/// JSON todo API under `/api`, the API documentation, and a rendered 404 for
/// everything else.
pub fn build_router(shared: Arc<SharedData>) -> Router {
    Router::new()
        .merge(pages::page_routes())
        .nest("/api", todos::todo_routes())
        .merge(swagger::build_documentation())
        .fallback(pages::not_found)
        .with_state(shared)
}
