use std::{future::Future, net::SocketAddr, path::Path, sync::Arc};

use axum::Router;
use configs::{AppConfig, StorageConfig};
use service::todo::{TodoRepository, TodoStore};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes::{self, AppState};

const DEMO_TODOS: &[(&str, i64)] = &[("Milch holen", 1), ("Wasser holen", 2), ("Brötchen holen", 1)];

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Create the todo store described by the storage config: file-backed when
/// persistence is on, otherwise purely in memory.
pub async fn build_store(cfg: &StorageConfig) -> anyhow::Result<Arc<TodoStore>> {
    let store = if cfg.persist {
        // the store itself never creates directories; make sure the first save can land
        let path = Path::new(&cfg.path);
        common::env::ensure_data_dir(path).await?;
        TodoStore::open(path).await
    } else {
        info!(event = "store_in_memory", "persistence disabled; todos live in memory only");
        TodoStore::in_memory()
    };
    if cfg.seed_demo {
        let seeded = store.seed_if_empty(DEMO_TODOS).await?;
        if seeded > 0 {
            info!(event = "store_seeded", count = seeded, "seeded demo todos");
        }
    }
    Ok(store)
}

/// Build the application router around an already-initialised store.
pub fn build_app(store: Arc<dyn TodoRepository>) -> Router {
    routes::build_router(AppState::new(store), build_cors())
}

/// Public entry: build the store and app, then serve until `shutdown` resolves.
pub async fn run<F>(cfg: AppConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    // store first: a bad data directory should fail startup before we bind
    let store = build_store(&cfg.storage).await?;
    let persist = store.is_persistent();
    let app = build_app(store);

    // bind by name so hosts like `localhost` resolve; log the concrete address
    let listener = tokio::net::TcpListener::bind(cfg.bind_addr()).await?;
    let addr: SocketAddr = listener.local_addr()?;
    info!(%addr, persist, "todo service listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    info!("todo service stopped");
    Ok(())
}
