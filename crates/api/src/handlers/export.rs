//! Zip export of approved items.

use std::io::{Cursor, Write};

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use sceneqa_core::export::{archive_entry_name, ExportManifest, MANIFEST_FILE_NAME};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::{AppError, AppResult};
use crate::media::local_media_path;
use crate::state::AppState;

/// File name offered to the browser for the archive.
const EXPORT_FILE_NAME: &str = "approved-scenes.zip";

/// GET /api/v1/review/export
///
/// Bundle the bytes of every approved item stored locally plus a
/// `manifest.json` describing all approved items. Items whose source is a
/// remote locator (regenerated images) appear in the manifest only.
pub async fn export_approved(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let manifest = {
        let session = state.session.read().await;
        ExportManifest::from_ledger(&session.ledger)
    };

    if manifest.is_empty() {
        return Err(AppError::BadRequest(
            "No approved items to export".to_string(),
        ));
    }

    let mut files = Vec::new();
    for entry in &manifest.items {
        let Some(path) = local_media_path(&state.config.media_dir, &entry.source_url) else {
            continue;
        };
        match tokio::fs::read(&path).await {
            Ok(bytes) => files.push((archive_entry_name(entry), bytes)),
            Err(e) => {
                tracing::warn!(item_id = entry.id, path = %path.display(), error = %e, "Skipping unreadable media file");
            }
        }
    }

    let archive = build_archive(&manifest, &files)?;
    tracing::info!(
        items = manifest.items.len(),
        bundled = files.len(),
        bytes = archive.len(),
        "Exported approved items",
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
            ),
        ],
        archive,
    ))
}

fn build_archive(manifest: &ExportManifest, files: &[(String, Vec<u8>)]) -> AppResult<Vec<u8>> {
    let zip_err = |e: zip::result::ZipError| AppError::InternalError(format!("Zip error: {e}"));
    let io_err = |e: std::io::Error| AppError::InternalError(format!("Zip write error: {e}"));

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, bytes) in files {
        zip.start_file(name.as_str(), SimpleFileOptions::default()).map_err(zip_err)?;
        zip.write_all(bytes).map_err(io_err)?;
    }

    let manifest_json = serde_json::to_vec_pretty(manifest)
        .map_err(|e| AppError::InternalError(format!("Failed to serialize manifest: {e}")))?;
    zip.start_file(MANIFEST_FILE_NAME, SimpleFileOptions::default())
        .map_err(zip_err)?;
    zip.write_all(&manifest_json).map_err(io_err)?;

    Ok(zip.finish().map_err(zip_err)?.into_inner())
}
