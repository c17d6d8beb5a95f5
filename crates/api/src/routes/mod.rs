pub mod health;
pub mod review;
pub mod settings;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /review      review session (import, dataset, decisions, regeneration, export)
/// /settings    persisted generation settings
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/review", review::router())
        .nest("/settings", settings::router())
}
