use axum::{
    Router, middleware,
    routing::{get, post},
};

use std::sync::Arc;

use crate::{
    auth::{self, AuthConfig, JwtKeys},
    health, items, purchasings, suppliers,
};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub keys: Arc<JwtKeys>,
}

fn router(state: ServerState) -> Router {
    let protected = Router::new()
        .route(
            "/suppliers",
            get(suppliers::list).post(suppliers::supplier_new),
        )
        .route(
            "/suppliers/{id}",
            get(suppliers::get)
                .put(suppliers::supplier_update)
                .delete(suppliers::supplier_delete),
        )
        .route("/items", get(items::list).post(items::item_new))
        .route(
            "/items/{id}",
            get(items::get)
                .put(items::item_update)
                .delete(items::item_delete),
        )
        .route(
            "/purchasings",
            get(purchasings::list).post(purchasings::purchasing_new),
        )
        .route("/purchasings/{id}", get(purchasings::get))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    Router::new()
        .route("/health", get(health::get))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .merge(protected)
        .with_state(state)
}

/// Build the application router around an engine.
pub fn app(engine: Engine, auth: &AuthConfig) -> Router {
    router(ServerState {
        engine: Arc::new(engine),
        keys: Arc::new(JwtKeys::new(auth)),
    })
}

/// Serve on an already bound listener until ctrl-c.
pub async fn run_with_listener(
    engine: Engine,
    auth: AuthConfig,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(engine, &auth))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
