//! Persisted generation settings.
//!
//! The generation backend endpoint is operator-configurable and survives
//! restarts. It lives in a small JSON file next to the server; writes go
//! to a temporary sibling first and are renamed into place.

use std::path::{Path, PathBuf};

use sceneqa_core::error::CoreError;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSettings {
    pub backend_endpoint: String,
}

/// Validate and normalise a backend endpoint: non-empty, `http(s)://`,
/// trailing slashes removed.
pub fn normalize_endpoint(raw: &str) -> Result<String, CoreError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Backend endpoint must not be empty".to_string(),
        ));
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(CoreError::Validation(format!(
            "Invalid backend endpoint '{trimmed}'. Must start with http:// or https://"
        )));
    }
    if trimmed == "http:" || trimmed == "https:" {
        return Err(CoreError::Validation(
            "Backend endpoint must include a host".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// In-memory copy of the settings plus the file they persist to.
pub struct SettingsStore {
    path: PathBuf,
    current: RwLock<GenerationSettings>,
}

impl SettingsStore {
    /// Load settings from `path`, falling back to `default_endpoint` when
    /// the file is missing or unreadable.
    pub async fn load(path: impl Into<PathBuf>, default_endpoint: &str) -> Self {
        let path = path.into();
        let settings = match read_settings(&path).await {
            Some(settings) => {
                tracing::info!(path = %path.display(), "Loaded generation settings");
                settings
            }
            None => GenerationSettings {
                backend_endpoint: normalize_endpoint(default_endpoint)
                    .unwrap_or_else(|_| default_endpoint.to_string()),
            },
        };

        Self {
            path,
            current: RwLock::new(settings),
        }
    }

    pub async fn get(&self) -> GenerationSettings {
        self.current.read().await.clone()
    }

    pub async fn backend_endpoint(&self) -> String {
        self.current.read().await.backend_endpoint.clone()
    }

    /// Validate, persist, then publish the new endpoint in memory.
    pub async fn set_backend_endpoint(&self, raw: &str) -> Result<GenerationSettings, CoreError> {
        let settings = GenerationSettings {
            backend_endpoint: normalize_endpoint(raw)?,
        };

        let mut current = self.current.write().await;
        write_settings(&self.path, &settings).await?;
        *current = settings.clone();

        tracing::info!(backend_endpoint = %settings.backend_endpoint, "Generation settings updated");
        Ok(settings)
    }
}

async fn read_settings(path: &Path) -> Option<GenerationSettings> {
    let raw = tokio::fs::read_to_string(path).await.ok()?;
    match serde_json::from_str::<GenerationSettings>(&raw) {
        Ok(settings) => match normalize_endpoint(&settings.backend_endpoint) {
            Ok(endpoint) => Some(GenerationSettings {
                backend_endpoint: endpoint,
            }),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring invalid settings file");
                None
            }
        },
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable settings file");
            None
        }
    }
}

async fn write_settings(path: &Path, settings: &GenerationSettings) -> Result<(), CoreError> {
    let json = serde_json::to_vec_pretty(settings)
        .map_err(|e| CoreError::Internal(format!("Failed to serialize settings: {e}")))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| CoreError::Internal(format!("Failed to create settings dir: {e}")))?;
    }

    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, &json)
        .await
        .map_err(|e| CoreError::Internal(format!("Failed to write settings: {e}")))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| CoreError::Internal(format!("Failed to replace settings: {e}")))?;
    Ok(())
}
