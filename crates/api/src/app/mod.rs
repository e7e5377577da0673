//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store/transfer wiring for both API versions
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request DTOs
//! - `errors.rs`: consistent error responses

use axum::{Router, routing::get};

use crate::middleware::ApiKeyState;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppConfig;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// V1 (`/api/airdrop`) is backed by the in-memory store and always mounted;
/// V2 (`/api/v2/airdrop`) is backed by Postgres and mounted only when a
/// database URL is configured.
pub async fn build_app(config: AppConfig) -> anyhow::Result<Router> {
    let auth = ApiKeyState::new(config.api_key.clone());
    let services = services::build_services(&config).await?;

    let mut app = Router::new()
        .route("/health", get(routes::system::health))
        .nest(
            "/api/airdrop",
            routes::airdrop::router(services.airdrops_v1, auth.clone(), false),
        );

    if let Some(airdrops_v2) = services.airdrops_v2 {
        app = app.nest(
            "/api/v2/airdrop",
            routes::airdrop::router(airdrops_v2, auth, true),
        );
    }

    Ok(app)
}
