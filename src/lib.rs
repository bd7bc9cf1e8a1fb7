use axum::extract::State;
use std::sync::Arc;

pub mod api;
pub mod app_env;
pub mod auth;
pub mod domain;
pub mod dto;
pub mod logging;
pub mod persistence;
pub mod routing_utils;

pub use api::build_router;

use crate::auth::session::SessionStore;
use crate::persistence::Store;

/// Data shared by every request handler: the storage backend chosen at startup and
/// the server-side session store.
pub struct SharedData {
    pub store: Box<dyn Store>,
    pub sessions: SessionStore,
}

/// Type alias for the state extractor used across route handlers
pub type AppState = State<Arc<SharedData>>;
