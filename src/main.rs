use std::sync::Arc;

use gridref_api::database::{memory::MemStore, postgres::PgStore, Store};
use gridref_api::{app, AppState};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, GRIDREF_* vars.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = gridref_api::config::config();
    tracing::info!("starting gridref-api in {:?} mode", config.environment);

    let store: Arc<dyn Store> = match &config.database.url {
        Some(url) => {
            let store = PgStore::connect(url, config.database.max_connections)
                .await
                .unwrap_or_else(|e| panic!("failed to connect to database: {}", e));
            tracing::info!("using Postgres store");
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store");
            Arc::new(MemStore::new())
        }
    };

    let app = app(AppState::new(store));

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("gridref-api listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
