use anyhow::Context;
use dotenv::dotenv;
use microblog::auth::session::SessionStore;
use microblog::persistence::BackendConfig;
use microblog::{SharedData, api, app_env, logging, persistence};
use std::env;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    logging::setup_logging(logging::init_env_filter());

    let store = persistence::connect(BackendConfig::from_env()).await?;
    store
        .ensure_schema()
        .await
        .context("preparing the database schema")?;

    let shared = Arc::new(SharedData {
        store,
        sessions: SessionStore::new(),
    });
    let app = logging::attach_tracing_http(api::build_router(shared));

    let addr = env::var(app_env::LISTEN_ADDR).unwrap_or_else(|_| "0.0.0.0:8080".to_owned());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("Listening on {addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
