use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Json, Router,
};
use common::types::Health;
use service::todo::TodoRepository;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

pub mod todos;

/// Shared handler state; the store is injected once at startup.
#[derive(Clone)]
pub struct AppState {
    pub todos: Arc<dyn TodoRepository>,
}

impl AppState {
    pub fn new(todos: Arc<dyn TodoRepository>) -> Self {
        Self { todos }
    }
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn index() -> &'static str {
    "Hello my name is Tom"
}

/// Build the full application router.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let todo_routes = Router::new()
        .route("/todos", post(todos::create_todo).delete(todos::delete_todos))
        .route("/todos/all", get(todos::list_all).delete(todos::delete_all))
        .route("/todos/byid", get(todos::get_by_id))
        .route("/todos/byuserid", get(todos::list_by_user))
        .route("/todos/byname", get(todos::list_by_name))
        .route("/todos/update", put(todos::update_by_query))
        .route("/todos/:id", put(todos::update_by_path).delete(todos::delete_by_path));

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .merge(todo_routes)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                        .on_request(DefaultOnRequest::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                        .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
                )
                .layer(cors),
        )
}
