//! Handler for scene regeneration.
//!
//! The session lock is never held across the generation call: the item and
//! overrides are snapshotted under a read lock, the coordinator talks to
//! the backend with no lock held, and only the write-back takes the write
//! lock. Imports and dataset reloads proceed while a regeneration runs.
//!
//! The item is claimed before the snapshot and released after the
//! write-back, so a second request for it cannot start from a snapshot the
//! first one is about to replace.

use axum::extract::{Path, State};
use axum::Json;
use sceneqa_core::error::CoreError;
use sceneqa_core::regeneration::RegenerationError;
use sceneqa_core::review::ReviewItem;
use sceneqa_core::types::ItemId;
use sceneqa_events::bus::{ITEM_REGENERATED, REGENERATION_FAILED};
use sceneqa_events::ReviewEvent;

use crate::error::AppResult;
use crate::handlers::review::item_response;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/review/items/{id}/regenerate
///
/// Returns the updated item: new `sourceUrl`, the old one as
/// `previousUrl`, status back to pending. On failure the item is left as
/// it was.
pub async fn regenerate(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
) -> AppResult<Json<DataResponse<ReviewItem>>> {
    let claim = state.regeneration.begin(id)?;

    let (item, overrides) = {
        let session = state.session.read().await;
        let item = session
            .ledger
            .get(id)
            .cloned()
            .ok_or(CoreError::NotFound {
                entity: "ReviewItem",
                id,
            })?;
        (item, session.overrides.clone())
    };
    let endpoint = state.settings.backend_endpoint().await;

    let updated = match state
        .regeneration
        .run(&claim, &item, &overrides, &endpoint)
        .await
    {
        Ok(updated) => updated,
        Err(e) => {
            if let RegenerationError::Service(msg) = &e {
                state.event_bus.publish(
                    ReviewEvent::new(REGENERATION_FAILED)
                        .for_item(id)
                        .with_payload(serde_json::json!({ "error": msg })),
                );
            }
            return Err(e.into());
        }
    };

    let applied = {
        let mut session = state.session.write().await;
        session.ledger.apply_regenerated(&updated)?;
        // The active item now has a fresh before/after pair.
        if session.ledger.current().is_some_and(|c| c.id == id) {
            session.comparison.reset();
        }
        session.ledger.get(id).cloned()
    };
    drop(claim);

    state.event_bus.publish(
        ReviewEvent::new(ITEM_REGENERATED)
            .for_item(id)
            .with_payload(serde_json::json!({
                "source_url": updated.source_url,
                "previous_url": updated.previous_url,
            })),
    );

    item_response(id, applied)
}
