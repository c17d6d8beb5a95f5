//! Handlers for the review ledger: import, dataset load, navigation,
//! decisions and prompt editing.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use sceneqa_core::comparison::ComparisonController;
use sceneqa_core::error::CoreError;
use sceneqa_core::prompt_dataset::parse_dataset;
use sceneqa_core::review::{ImportedImage, ReviewItem, ReviewStats, ViewMode};
use sceneqa_core::scene::{detect_characters, CharacterRef, Setting};
use sceneqa_core::types::ItemId;
use sceneqa_events::bus::{
    DATASET_LOADED, IMAGES_IMPORTED, ITEM_APPROVED, ITEM_REJECTED, PROMPT_EDITED, PROMPT_RESET,
};
use sceneqa_events::ReviewEvent;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::media::{base_file_name, store_uploads};
use crate::response::DataResponse;
use crate::state::{AppState, ReviewSession};

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

/// Snapshot of what the review screen shows.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentView {
    pub view: ViewMode,
    pub index: usize,
    pub total: usize,
    pub item: Option<ReviewItem>,
    /// Setting derived from the item's current prompt.
    pub setting: Option<Setting>,
    /// Detected roster with session outfit overrides applied.
    pub characters: Vec<CharacterRef>,
    pub can_compare: bool,
    pub comparison: ComparisonController,
}

impl CurrentView {
    pub fn from_session(session: &ReviewSession) -> Self {
        let ledger = &session.ledger;
        let item = ledger.current().cloned();
        let characters = item
            .as_ref()
            .map(|i| session.overrides.resolve(&detect_characters(&i.prompt)))
            .unwrap_or_default();

        Self {
            view: ledger.view(),
            index: ledger.active_index(),
            total: ledger.len(),
            setting: item.as_ref().map(ReviewItem::setting),
            can_compare: item.as_ref().is_some_and(ReviewItem::can_compare),
            item,
            characters,
            comparison: session.comparison,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetLoadResult {
    pub record_count: usize,
    /// Items whose prompt changed as a result of re-matching.
    pub rematched: usize,
}

#[derive(Debug, Deserialize)]
pub struct EditPromptRequest {
    pub prompt: String,
}

// ---------------------------------------------------------------------------
// Import / dataset
// ---------------------------------------------------------------------------

/// POST /api/v1/review/import
///
/// Accept a multipart upload of image files. Each file becomes a pending
/// review item, matched against the loaded prompt dataset, appended in
/// upload order.
pub async fn import_images(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<Vec<ReviewItem>>>)> {
    // Nothing is written to disk until every part has been read.
    let mut uploads = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let Some(raw_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let file_name = base_file_name(&raw_name).to_string();
        if file_name.is_empty() {
            continue;
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        uploads.push((file_name, data));
    }

    let urls = store_uploads(&state.config.media_dir, &uploads).await?;
    let files: Vec<ImportedImage> = uploads
        .into_iter()
        .zip(urls)
        .map(|((file_name, _), source_url)| ImportedImage {
            file_name,
            source_url,
        })
        .collect();

    if files.is_empty() {
        return Err(AppError::BadRequest(
            "No files received in multipart upload".to_string(),
        ));
    }

    let created: Vec<ReviewItem> = {
        let mut session = state.session.write().await;
        let ids = session.ledger.import_images(files);
        ids.iter()
            .filter_map(|id| session.ledger.get(*id).cloned())
            .collect()
    };

    tracing::info!(count = created.len(), "Imported images for review");
    state.event_bus.publish(
        ReviewEvent::new(IMAGES_IMPORTED)
            .with_payload(serde_json::json!({ "count": created.len() })),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// POST /api/v1/review/dataset
///
/// Replace the prompt dataset with the JSON array in the request body and
/// re-match every item. A malformed document leaves the session untouched.
pub async fn load_dataset(
    State(state): State<AppState>,
    body: String,
) -> AppResult<Json<DataResponse<DatasetLoadResult>>> {
    let records = parse_dataset(&body)?;
    let record_count = records.len();

    let rematched = state.session.write().await.ledger.load_prompt_dataset(records);

    tracing::info!(record_count, rematched, "Prompt dataset loaded");
    state.event_bus.publish(ReviewEvent::new(DATASET_LOADED).with_payload(
        serde_json::json!({ "record_count": record_count, "rematched": rematched }),
    ));

    Ok(Json(DataResponse {
        data: DatasetLoadResult {
            record_count,
            rematched,
        },
    }))
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// GET /api/v1/review/items
pub async fn list_items(State(state): State<AppState>) -> Json<DataResponse<Vec<ReviewItem>>> {
    let items = state.session.read().await.ledger.items().to_vec();
    Json(DataResponse { data: items })
}

/// GET /api/v1/review/current
pub async fn current(State(state): State<AppState>) -> Json<DataResponse<CurrentView>> {
    let session = state.session.read().await;
    Json(DataResponse {
        data: CurrentView::from_session(&session),
    })
}

/// GET /api/v1/review/stats
pub async fn stats(State(state): State<AppState>) -> Json<DataResponse<ReviewStats>> {
    let stats = state.session.read().await.ledger.stats();
    Json(DataResponse { data: stats })
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

/// POST /api/v1/review/next
pub async fn next(State(state): State<AppState>) -> Json<DataResponse<CurrentView>> {
    let mut session = state.session.write().await;
    session.advance();
    Json(DataResponse {
        data: CurrentView::from_session(&session),
    })
}

/// POST /api/v1/review/previous
pub async fn previous(State(state): State<AppState>) -> Json<DataResponse<CurrentView>> {
    let mut session = state.session.write().await;
    session.retreat();
    Json(DataResponse {
        data: CurrentView::from_session(&session),
    })
}

// ---------------------------------------------------------------------------
// Decisions
// ---------------------------------------------------------------------------

/// POST /api/v1/review/items/{id}/approve
///
/// Returns the view after the auto-advance.
pub async fn approve(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
) -> AppResult<Json<DataResponse<CurrentView>>> {
    let view = {
        let mut session = state.session.write().await;
        session.approve(id)?;
        CurrentView::from_session(&session)
    };
    state
        .event_bus
        .publish(ReviewEvent::new(ITEM_APPROVED).for_item(id));
    Ok(Json(DataResponse { data: view }))
}

/// POST /api/v1/review/items/{id}/reject
pub async fn reject(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
) -> AppResult<Json<DataResponse<CurrentView>>> {
    let view = {
        let mut session = state.session.write().await;
        session.reject(id)?;
        CurrentView::from_session(&session)
    };
    state
        .event_bus
        .publish(ReviewEvent::new(ITEM_REJECTED).for_item(id));
    Ok(Json(DataResponse { data: view }))
}

// ---------------------------------------------------------------------------
// Prompt editing
// ---------------------------------------------------------------------------

/// PUT /api/v1/review/items/{id}/prompt
pub async fn edit_prompt(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
    Json(input): Json<EditPromptRequest>,
) -> AppResult<Json<DataResponse<ReviewItem>>> {
    let item = {
        let mut session = state.session.write().await;
        session.ledger.edit_prompt(id, input.prompt)?;
        session.ledger.get(id).cloned()
    };
    state
        .event_bus
        .publish(ReviewEvent::new(PROMPT_EDITED).for_item(id));
    item_response(id, item)
}

/// POST /api/v1/review/items/{id}/prompt/reset
pub async fn reset_prompt(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
) -> AppResult<Json<DataResponse<ReviewItem>>> {
    let item = {
        let mut session = state.session.write().await;
        session.ledger.reset_prompt(id)?;
        session.ledger.get(id).cloned()
    };
    state
        .event_bus
        .publish(ReviewEvent::new(PROMPT_RESET).for_item(id));
    item_response(id, item)
}

pub(crate) fn item_response(
    id: ItemId,
    item: Option<ReviewItem>,
) -> AppResult<Json<DataResponse<ReviewItem>>> {
    let item = item.ok_or(CoreError::NotFound {
        entity: "ReviewItem",
        id,
    })?;
    Ok(Json(DataResponse { data: item }))
}
