pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;

use std::sync::Arc;

use axum::{middleware as axum_middleware, routing::get, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use database::Store;
use services::{NetworkService, SubstationService};

/// Shared per-request state: the two managers over one store backend.
#[derive(Clone)]
pub struct AppState {
    pub substations: SubstationService,
    pub networks: NetworkService,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            substations: SubstationService::new(store.clone()),
            networks: NetworkService::new(store),
        }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_routes())
        // Protected resources
        .merge(protected_routes(state))
        // Global middleware; auth_context runs before route-level require_auth
        .layer(axum_middleware::from_fn(middleware::auth::auth_context))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn auth_routes() -> Router {
    use axum::routing::post;

    Router::new().route("/auth/login", post(handlers::auth::login))
}

fn protected_routes(state: AppState) -> Router {
    use handlers::{networks, substations};

    Router::new()
        .route(
            "/subestacoes",
            get(substations::get_all).post(substations::create),
        )
        .route(
            "/subestacoes/:id",
            get(substations::get_by_id)
                .put(substations::update)
                .delete(substations::delete),
        )
        .route("/redesmt", get(networks::get_all).post(networks::create))
        .route(
            "/redesmt/:id",
            get(networks::get_by_id).delete(networks::delete),
        )
        .route_layer(axum_middleware::from_fn(middleware::auth::require_auth))
        .with_state(state)
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "name": "gridref-api",
        "version": version,
        "description": "Reference-data API for grid substations and medium-voltage networks",
        "endpoints": {
            "login": "POST /auth/login (public)",
            "substations": "/subestacoes[/:id] (protected)",
            "networks": "/redesmt[/:id] (protected)",
        }
    }))
}

async fn health() -> axum::response::Json<Value> {
    axum::response::Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
    }))
}
