use axum::routing::get;
use axum::Router;

use crate::handlers::settings;
use crate::state::AppState;

/// Routes mounted at `/api/v1/settings`.
///
/// ```text
/// GET    /generation    get_generation
/// PUT    /generation    update_generation
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/generation",
        get(settings::get_generation).put(settings::update_generation),
    )
}
