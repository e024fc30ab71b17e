use std::future::Future;

use axum::Router;
use configs::AppConfig;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes;
use crate::state::AppState;
use service::{file::item_store::ItemStore, runtime};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Open the item store described by `cfg` and wrap it into handler state.
pub async fn build_state(cfg: &AppConfig) -> Result<AppState, StartupError> {
    let storage = &cfg.storage;
    runtime::ensure_env(&storage.items_path, storage.seed_path.as_deref()).await?;
    let store = ItemStore::with_seed(&storage.items_path, storage.seed_path.as_deref()).await?;
    info!(path = %store.path().display(), "item store ready");
    Ok(AppState::new(store))
}

pub fn build_app(state: AppState) -> Router {
    routes::build_router(state, build_cors())
}

/// Serve `app` on an already bound listener until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

async fn ctrl_c() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("received Ctrl+C, shutting down");
    }
}

/// Public entry: build the app and run the HTTP server until Ctrl+C.
pub async fn run(cfg: AppConfig) -> Result<(), StartupError> {
    let state = build_state(&cfg).await?;
    let app = build_app(state);

    let bind = cfg.bind_addr();
    let listener = TcpListener::bind(&bind)
        .await
        .map_err(|e| StartupError::InvalidConfig(format!("cannot bind {bind}: {e}")))?;
    let addr = listener.local_addr().map_err(anyhow::Error::from)?;
    info!(%addr, "starting item server");
    serve(listener, app, ctrl_c()).await?;
    Ok(())
}
