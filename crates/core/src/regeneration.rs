//! Regeneration coordinator.
//!
//! Builds a scene regeneration request from a review item plus the
//! session's outfit overrides, hands it to an external
//! [`GenerationService`], and produces the updated item. The ledger is not
//! touched here: callers write the returned item back with
//! [`ReviewLedger::apply_regenerated`](crate::review::ReviewLedger::apply_regenerated)
//! so no lock has to be held across the network call.
//!
//! At most one regeneration may be in flight per item. Callers that write
//! the result back themselves take an [`InFlightGuard`] with
//! [`RegenerationCoordinator::begin`] before reading the item and keep it
//! until the write-back is done; a second request for the same item fails
//! with [`RegenerationError::InFlight`] for that whole window.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::outfit_overrides::OutfitOverrides;
use crate::review::{ReviewItem, ReviewStatus};
use crate::scene::{detect_characters, detect_setting, CharacterRef, Setting};
use crate::types::ItemId;

// ---------------------------------------------------------------------------
// Request / service seam
// ---------------------------------------------------------------------------

/// Body sent to the generation backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegenerationRequest {
    pub prompt_text: String,
    pub characters: Vec<CharacterRef>,
    pub setting: Setting,
    pub backend_endpoint: String,
}

impl RegenerationRequest {
    /// Derive the roster from the item's current prompt and layer the
    /// overrides on top.
    pub fn build(item: &ReviewItem, overrides: &OutfitOverrides, backend_endpoint: &str) -> Self {
        let detected = detect_characters(&item.prompt);
        Self {
            prompt_text: item.prompt.clone(),
            characters: overrides.resolve(&detected),
            setting: detect_setting(&item.prompt),
            backend_endpoint: backend_endpoint.to_string(),
        }
    }
}

/// Error type returned by generation service implementations.
pub type ServiceError = Box<dyn std::error::Error + Send + Sync>;

/// External image generation backend.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Generate a new image for the request and return its locator.
    async fn generate(&self, request: &RegenerationRequest) -> Result<String, ServiceError>;
}

#[async_trait]
impl<T: GenerationService + ?Sized> GenerationService for std::sync::Arc<T> {
    async fn generate(&self, request: &RegenerationRequest) -> Result<String, ServiceError> {
        (**self).generate(request).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegenerationError {
    #[error("A regeneration is already in progress for item {item_id}")]
    InFlight { item_id: ItemId },

    #[error("Item {item_id} was not claimed for regeneration")]
    NotClaimed { item_id: ItemId },

    #[error("Generation service failed: {0}")]
    Service(String),
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

pub struct RegenerationCoordinator<S> {
    service: S,
    in_flight: Mutex<HashSet<ItemId>>,
}

/// Marks one item as being regenerated. Removes it from the in-flight set
/// when dropped, including when the owning future is cancelled.
#[must_use = "the item stops being in flight as soon as the guard is dropped"]
pub struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<ItemId>>,
    item_id: ItemId,
}

impl InFlightGuard<'_> {
    pub fn item_id(&self) -> ItemId {
        self.item_id
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut set = self.set.lock().unwrap_or_else(|e| e.into_inner());
        set.remove(&self.item_id);
    }
}

impl<S: GenerationService> RegenerationCoordinator<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn is_in_flight(&self, item_id: ItemId) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&item_id)
    }

    /// Claim `item_id` for a regeneration.
    pub fn begin(&self, item_id: ItemId) -> Result<InFlightGuard<'_>, RegenerationError> {
        let mut set = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if !set.insert(item_id) {
            return Err(RegenerationError::InFlight { item_id });
        }
        Ok(InFlightGuard {
            set: &self.in_flight,
            item_id,
        })
    }

    /// Regenerate `item`, holding the in-flight claim only for the
    /// backend call.
    ///
    /// On success the returned item has `previous_url` set to the old
    /// `source_url`, the new locator as `source_url`, and status reset to
    /// pending. On failure nothing is produced and the caller's item is
    /// untouched.
    pub async fn regenerate(
        &self,
        item: &ReviewItem,
        overrides: &OutfitOverrides,
        backend_endpoint: &str,
    ) -> Result<ReviewItem, RegenerationError> {
        let guard = self.begin(item.id)?;
        self.run(&guard, item, overrides, backend_endpoint).await
    }

    /// Regenerate `item` under a claim the caller already holds.
    pub async fn run(
        &self,
        guard: &InFlightGuard<'_>,
        item: &ReviewItem,
        overrides: &OutfitOverrides,
        backend_endpoint: &str,
    ) -> Result<ReviewItem, RegenerationError> {
        if guard.item_id != item.id {
            return Err(RegenerationError::NotClaimed { item_id: item.id });
        }
        let request = RegenerationRequest::build(item, overrides, backend_endpoint);

        tracing::info!(
            item_id = item.id,
            setting = %request.setting,
            characters = request.characters.len(),
            "Submitting regeneration request",
        );

        let new_url = self.service.generate(&request).await.map_err(|e| {
            tracing::warn!(item_id = item.id, error = %e, "Regeneration failed");
            RegenerationError::Service(e.to_string())
        })?;

        let mut updated = item.clone();
        updated.previous_url = Some(std::mem::replace(&mut updated.source_url, new_url));
        updated.status = ReviewStatus::Pending;

        tracing::info!(item_id = item.id, source_url = %updated.source_url, "Regeneration completed");
        Ok(updated)
    }
}
