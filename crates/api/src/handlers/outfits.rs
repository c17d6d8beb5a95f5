//! Handlers for session-wide outfit overrides.

use axum::extract::{Path, State};
use axum::Json;
use sceneqa_core::outfit_overrides::OutfitOverrides;
use sceneqa_core::scene::{CharacterName, Outfit};
use serde::Deserialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SetOutfitRequest {
    pub outfit: String,
}

/// GET /api/v1/review/outfits
pub async fn list_overrides(State(state): State<AppState>) -> Json<DataResponse<OutfitOverrides>> {
    let overrides = state.session.read().await.overrides.clone();
    Json(DataResponse { data: overrides })
}

/// PUT /api/v1/review/outfits/{character}
pub async fn set_override(
    State(state): State<AppState>,
    Path(character): Path<String>,
    Json(input): Json<SetOutfitRequest>,
) -> AppResult<Json<DataResponse<OutfitOverrides>>> {
    let name: CharacterName = character.parse()?;
    let outfit: Outfit = input.outfit.parse()?;

    let overrides = {
        let mut session = state.session.write().await;
        session.overrides.set(name, outfit);
        session.overrides.clone()
    };

    tracing::debug!(character = %name, outfit = %outfit, "Outfit override set");
    Ok(Json(DataResponse { data: overrides }))
}

/// DELETE /api/v1/review/outfits/{character}
///
/// Clearing a character without an override is not an error.
pub async fn clear_override(
    State(state): State<AppState>,
    Path(character): Path<String>,
) -> AppResult<Json<DataResponse<OutfitOverrides>>> {
    let name: CharacterName = character.parse()?;

    let overrides = {
        let mut session = state.session.write().await;
        session.overrides.clear(name);
        session.overrides.clone()
    };

    tracing::debug!(character = %name, "Outfit override cleared");
    Ok(Json(DataResponse { data: overrides }))
}
