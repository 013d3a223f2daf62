pub mod config;
pub mod core;
pub mod database;
pub mod directory;
pub mod entities;
pub mod errors;
pub mod filtering;
pub mod pagination;
pub mod state;
pub mod telemetry;

use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

pub use crate::{
    config::AppConfig,
    core::DirectoryResource,
    errors::{ApiError, StartupError},
    state::AppState,
};

/// Base path of every directory route.
pub const API_BASE: &str = "/api/v1/directory";

#[derive(OpenApi)]
#[openapi(info(
    title = "Trikona directory",
    description = "Filtered search and CRUD over students, corporates, colleges and professionals"
))]
struct ApiDoc;

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Assemble the full HTTP application around `state`.
pub fn app(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest(API_BASE, directory::router())
        .split_for_parts();

    router
        .route("/health", get(health))
        .route(
            "/api-docs/openapi.json",
            get(move || {
                let api = api.clone();
                async move { Json(api) }
            }),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
