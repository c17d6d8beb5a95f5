use axum::extract::State;
use axum::Json;
use sceneqa_core::comparison::{ComparisonController, CropFractions, PointerEvent};
use serde::Serialize;

use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonState {
    pub split_fraction: f64,
    pub dragging: bool,
    pub crop: CropFractions,
}

impl From<&ComparisonController> for ComparisonState {
    fn from(c: &ComparisonController) -> Self {
        Self {
            split_fraction: c.split_fraction(),
            dragging: c.is_dragging(),
            crop: c.crop(),
        }
    }
}

/// POST /api/v1/review/compare/pointer
///
/// Feed one pointer event to the comparison split. `up` is accepted from
/// anywhere, so a drag that leaves the surface still ends cleanly.
pub async fn pointer(
    State(state): State<AppState>,
    Json(event): Json<PointerEvent>,
) -> Json<DataResponse<ComparisonState>> {
    let mut session = state.session.write().await;
    session.comparison.handle(event);
    Json(DataResponse {
        data: ComparisonState::from(&session.comparison),
    })
}
