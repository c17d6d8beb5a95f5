use std::sync::Arc;

use sceneqa_core::comparison::ComparisonController;
use sceneqa_core::error::CoreError;
use sceneqa_core::outfit_overrides::OutfitOverrides;
use sceneqa_core::regeneration::{GenerationService, RegenerationCoordinator};
use sceneqa_core::review::ReviewLedger;
use sceneqa_core::types::ItemId;
use tokio::sync::RwLock;

use crate::config::ServerConfig;
use crate::settings::SettingsStore;

/// Coordinator over whichever generation backend the server was built with.
pub type Coordinator = RegenerationCoordinator<Arc<dyn GenerationService>>;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// The review session. Handlers hold the lock only for synchronous
    /// work, never across the generation call.
    pub session: Arc<RwLock<ReviewSession>>,
    /// Persisted generation backend settings.
    pub settings: Arc<SettingsStore>,
    /// Regeneration coordinator (owns the per-item in-flight guard).
    pub regeneration: Arc<Coordinator>,
    /// Event bus for review events.
    pub event_bus: Arc<sceneqa_events::EventBus>,
}

/// Everything a reviewer mutates during a session.
#[derive(Debug, Default)]
pub struct ReviewSession {
    pub ledger: ReviewLedger,
    pub overrides: OutfitOverrides,
    pub comparison: ComparisonController,
}

impl ReviewSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a ledger operation and recentre the comparison split when it
    /// moved the cursor to a different item.
    fn tracking_cursor<T>(&mut self, op: impl FnOnce(&mut ReviewLedger) -> T) -> T {
        let before = self.ledger.active_index();
        let out = op(&mut self.ledger);
        if self.ledger.active_index() != before {
            self.comparison.reset();
        }
        out
    }

    pub fn approve(&mut self, id: ItemId) -> Result<(), CoreError> {
        self.tracking_cursor(|l| l.approve(id))
    }

    pub fn reject(&mut self, id: ItemId) -> Result<(), CoreError> {
        self.tracking_cursor(|l| l.reject(id))
    }

    pub fn advance(&mut self) -> bool {
        self.tracking_cursor(|l| l.advance())
    }

    pub fn retreat(&mut self) -> bool {
        self.tracking_cursor(|l| l.retreat())
    }
}
