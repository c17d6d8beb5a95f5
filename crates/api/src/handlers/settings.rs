//! Handlers for persisted generation settings.

use axum::extract::State;
use axum::Json;
use sceneqa_events::bus::GENERATION_SETTINGS_UPDATED;
use sceneqa_events::ReviewEvent;
use serde::Deserialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::settings::GenerationSettings;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGenerationSettings {
    pub backend_endpoint: String,
}

/// GET /api/v1/settings/generation
pub async fn get_generation(State(state): State<AppState>) -> Json<DataResponse<GenerationSettings>> {
    Json(DataResponse {
        data: state.settings.get().await,
    })
}

/// PUT /api/v1/settings/generation
///
/// Validates and persists the new backend endpoint. Regenerations already
/// in flight keep the endpoint they started with.
pub async fn update_generation(
    State(state): State<AppState>,
    Json(input): Json<UpdateGenerationSettings>,
) -> AppResult<Json<DataResponse<GenerationSettings>>> {
    let settings = state
        .settings
        .set_backend_endpoint(&input.backend_endpoint)
        .await?;

    state.event_bus.publish(
        ReviewEvent::new(GENERATION_SETTINGS_UPDATED).with_payload(serde_json::json!({
            "backend_endpoint": settings.backend_endpoint,
        })),
    );

    Ok(Json(DataResponse { data: settings }))
}
