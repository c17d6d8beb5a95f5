//! On-disk storage for imported image bytes.
//!
//! Uploads are written under the media directory with a generated name and
//! served back at [`MEDIA_URL_PREFIX`]. The reviewer-facing `file_name`
//! (used for chapter matching) is kept separately on the review item.

use std::path::{Path, PathBuf};

use axum::body::Bytes;

use crate::error::{AppError, AppResult};

/// URL prefix the media directory is mounted at.
pub const MEDIA_URL_PREFIX: &str = "/media/";

/// Strip any directory components a browser or client put in the
/// uploaded filename.
pub fn base_file_name(raw: &str) -> &str {
    raw.rsplit(['/', '\\']).next().unwrap_or(raw)
}

/// Lower-case extension of `file_name`, if it is purely alphanumeric.
fn safe_extension(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    (!ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .then(|| ext.to_ascii_lowercase())
}

/// Write `bytes` to the media directory and return the public locator.
pub async fn store_upload(media_dir: &Path, file_name: &str, bytes: &[u8]) -> AppResult<String> {
    tokio::fs::create_dir_all(media_dir)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to create media dir: {e}")))?;

    let stored = match safe_extension(file_name) {
        Some(ext) => format!("{}.{ext}", uuid::Uuid::now_v7()),
        None => uuid::Uuid::now_v7().to_string(),
    };

    tokio::fs::write(media_dir.join(&stored), bytes)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to store upload: {e}")))?;

    Ok(format!("{MEDIA_URL_PREFIX}{stored}"))
}

/// Store every `(file_name, bytes)` upload, returning locators in the same
/// order. If any write fails the uploads already stored are removed.
pub async fn store_uploads(media_dir: &Path, uploads: &[(String, Bytes)]) -> AppResult<Vec<String>> {
    let mut stored = Vec::with_capacity(uploads.len());
    for (file_name, bytes) in uploads {
        match store_upload(media_dir, file_name, bytes).await {
            Ok(url) => stored.push(url),
            Err(e) => {
                discard_uploads(media_dir, &stored).await;
                return Err(e);
            }
        }
    }
    Ok(stored)
}

/// Best-effort removal of previously stored uploads.
pub async fn discard_uploads(media_dir: &Path, urls: &[String]) {
    for url in urls {
        let Some(path) = local_media_path(media_dir, url) else {
            continue;
        };
        if let Err(e) = tokio::fs::remove_file(&path).await {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove stored upload");
        }
    }
}

/// Map a locator back to a file under `media_dir`. Returns `None` for
/// remote locators (e.g. regenerated images) and for anything that tries
/// to escape the directory.
pub fn local_media_path(media_dir: &Path, source_url: &str) -> Option<PathBuf> {
    let name = source_url.strip_prefix(MEDIA_URL_PREFIX)?;
    if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
        return None;
    }
    Some(media_dir.join(name))
}
