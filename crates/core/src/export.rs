//! Approved-item export manifest.
//!
//! The packaging format itself (archive layout) belongs to the caller;
//! this module only decides what goes in and describes it.

use serde::{Deserialize, Serialize};

use crate::review::ReviewLedger;
use crate::scene::Setting;
use crate::types::{ItemId, Timestamp};

/// File name of the manifest inside an export archive.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEntry {
    pub id: ItemId,
    pub file_name: String,
    pub prompt: String,
    pub source_url: String,
    pub setting: Setting,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportManifest {
    pub generated_at: Timestamp,
    pub items: Vec<ExportEntry>,
}

impl ExportManifest {
    /// Describe every approved item, in ledger order.
    pub fn from_ledger(ledger: &ReviewLedger) -> Self {
        let items = ledger
            .approved()
            .into_iter()
            .map(|item| ExportEntry {
                id: item.id,
                file_name: item.file_name.clone(),
                prompt: item.prompt.clone(),
                source_url: item.source_url.clone(),
                setting: item.setting(),
            })
            .collect();

        Self {
            generated_at: chrono::Utc::now(),
            items,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Archive entry name for an exported item. Prefixed with the item id so
/// two uploads sharing a filename do not collide.
pub fn archive_entry_name(entry: &ExportEntry) -> String {
    format!("{}_{}", entry.id, entry.file_name)
}
