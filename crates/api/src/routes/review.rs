//! Route definitions for the review session.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{comparison, export, outfits, regeneration, review};
use crate::state::AppState;

/// Routes mounted at `/api/v1/review`.
///
/// ```text
/// POST   /import                      import_images (multipart)
/// POST   /dataset                     load_dataset
/// GET    /items                       list_items
/// GET    /current                     current
/// POST   /next                        next
/// POST   /previous                    previous
/// POST   /items/{id}/approve          approve
/// POST   /items/{id}/reject           reject
/// PUT    /items/{id}/prompt           edit_prompt
/// POST   /items/{id}/prompt/reset     reset_prompt
/// POST   /items/{id}/regenerate       regenerate
/// GET    /stats                       stats
/// GET    /outfits                     list_overrides
/// PUT    /outfits/{character}         set_override
/// DELETE /outfits/{character}         clear_override
/// POST   /compare/pointer             pointer
/// GET    /export                      export_approved
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/import", post(review::import_images))
        .route("/dataset", post(review::load_dataset))
        .route("/items", get(review::list_items))
        .route("/current", get(review::current))
        .route("/next", post(review::next))
        .route("/previous", post(review::previous))
        .route("/items/{id}/approve", post(review::approve))
        .route("/items/{id}/reject", post(review::reject))
        .route("/items/{id}/prompt", put(review::edit_prompt))
        .route("/items/{id}/prompt/reset", post(review::reset_prompt))
        .route("/items/{id}/regenerate", post(regeneration::regenerate))
        .route("/stats", get(review::stats))
        .route("/outfits", get(outfits::list_overrides))
        .route(
            "/outfits/{character}",
            put(outfits::set_override).delete(outfits::clear_override),
        )
        .route("/compare/pointer", post(comparison::pointer))
        .route("/export", get(export::export_approved))
}
