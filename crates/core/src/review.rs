//! Review ledger: the ordered collection of images under review.
//!
//! Owns the items, the currently loaded prompt dataset and the active
//! index. Every status transition goes through [`ReviewLedger`]; items are
//! appended on import and never removed.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::matcher::match_prompt_or_placeholder;
use crate::prompt_dataset::PromptRecord;
use crate::scene::{detect_setting, Setting};
use crate::types::ItemId;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Reviewer decision for an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// Which screen the session is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Upload,
    Review,
}

/// One image under review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewItem {
    pub id: ItemId,
    /// Locator of the image currently shown.
    pub source_url: String,
    /// Locator shown before the most recent regeneration.
    pub previous_url: Option<String>,
    pub file_name: String,
    /// Current, possibly reviewer-edited, prompt.
    pub prompt: String,
    /// Prompt as matched at import (or at the last dataset reload).
    pub original_prompt: String,
    pub status: ReviewStatus,
}

impl ReviewItem {
    /// Setting derived from the current prompt.
    pub fn setting(&self) -> Setting {
        detect_setting(&self.prompt)
    }

    /// Whether a before/after comparison is possible.
    pub fn can_compare(&self) -> bool {
        self.previous_url.is_some()
    }
}

/// An image handed to [`ReviewLedger::import_images`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedImage {
    pub file_name: String,
    pub source_url: String,
}

/// Aggregate counts over the whole ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewStats {
    pub total: usize,
    pub approved: usize,
    pub rejected: usize,
    pub pending: usize,
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct ReviewLedger {
    items: Vec<ReviewItem>,
    records: Vec<PromptRecord>,
    active: usize,
    view: ViewMode,
    last_id: Option<ItemId>,
}

impl ReviewLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[ReviewItem] {
        &self.items
    }

    pub fn prompt_records(&self) -> &[PromptRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    /// The item under the cursor, if any.
    pub fn current(&self) -> Option<&ReviewItem> {
        self.items.get(self.active)
    }

    pub fn get(&self, id: ItemId) -> Option<&ReviewItem> {
        self.items.iter().find(|i| i.id == id)
    }

    fn position(&self, id: ItemId) -> Result<usize, CoreError> {
        self.items
            .iter()
            .position(|i| i.id == id)
            .ok_or(CoreError::NotFound {
                entity: "ReviewItem",
                id,
            })
    }

    fn next_id(&mut self, now_millis: i64, index: usize) -> ItemId {
        let candidate = now_millis.saturating_add(index as i64);
        let id = match self.last_id {
            Some(last) if candidate <= last => last + 1,
            _ => candidate,
        };
        self.last_id = Some(id);
        id
    }

    // -- Import / dataset ---------------------------------------------------

    /// Append images in input order, matching each against the loaded
    /// dataset, and switch to the review screen. Returns the new ids.
    pub fn import_images(&mut self, files: Vec<ImportedImage>) -> Vec<ItemId> {
        let now = chrono::Utc::now().timestamp_millis();
        let mut ids = Vec::with_capacity(files.len());

        for (index, file) in files.into_iter().enumerate() {
            let id = self.next_id(now, index);
            let prompt = match_prompt_or_placeholder(&file.file_name, &self.records);
            tracing::debug!(item_id = id, file_name = %file.file_name, "Imported review item");

            self.items.push(ReviewItem {
                id,
                source_url: file.source_url,
                previous_url: None,
                file_name: file.file_name,
                original_prompt: prompt.clone(),
                prompt,
                status: ReviewStatus::Pending,
            });
            ids.push(id);
        }

        self.view = ViewMode::Review;
        ids
    }

    /// Replace the prompt dataset and re-match every item.
    ///
    /// An item whose new match differs from its current prompt gets both
    /// `prompt` and `original_prompt` overwritten, discarding any reviewer
    /// edit. Returns the number of items that changed.
    pub fn load_prompt_dataset(&mut self, records: Vec<PromptRecord>) -> usize {
        self.records = records;
        let mut changed = 0;

        for item in &mut self.items {
            let matched = match_prompt_or_placeholder(&item.file_name, &self.records);
            if matched != item.prompt {
                item.original_prompt = matched.clone();
                item.prompt = matched;
                changed += 1;
            }
        }

        tracing::debug!(
            record_count = self.records.len(),
            changed,
            "Prompt dataset loaded"
        );
        changed
    }

    // -- Status transitions -------------------------------------------------

    pub fn approve(&mut self, id: ItemId) -> Result<(), CoreError> {
        self.decide(id, ReviewStatus::Approved)
    }

    pub fn reject(&mut self, id: ItemId) -> Result<(), CoreError> {
        self.decide(id, ReviewStatus::Rejected)
    }

    /// Set the decision and, when the decided item is the active one and
    /// its status actually changed, move on to the next item.
    fn decide(&mut self, id: ItemId, status: ReviewStatus) -> Result<(), CoreError> {
        let pos = self.position(id)?;
        let changed = self.items[pos].status != status;
        self.items[pos].status = status;

        if changed && pos == self.active {
            self.advance();
        }
        Ok(())
    }

    // -- Prompt editing -----------------------------------------------------

    pub fn edit_prompt(&mut self, id: ItemId, text: impl Into<String>) -> Result<(), CoreError> {
        let pos = self.position(id)?;
        self.items[pos].prompt = text.into();
        Ok(())
    }

    pub fn reset_prompt(&mut self, id: ItemId) -> Result<(), CoreError> {
        let pos = self.position(id)?;
        let item = &mut self.items[pos];
        item.prompt = item.original_prompt.clone();
        Ok(())
    }

    // -- Navigation ---------------------------------------------------------

    /// Move forward one item, stopping at the last. Returns whether the
    /// cursor moved.
    pub fn advance(&mut self) -> bool {
        if self.active + 1 < self.items.len() {
            self.active += 1;
            true
        } else {
            false
        }
    }

    /// Move back one item, stopping at the first.
    pub fn retreat(&mut self) -> bool {
        if self.active > 0 {
            self.active -= 1;
            true
        } else {
            false
        }
    }

    // -- Regeneration -------------------------------------------------------

    /// Write back the media fields and status of a regenerated item.
    ///
    /// Prompt fields are left alone; only `source_url`, `previous_url` and
    /// `status` come from `updated`. The result must have been built from
    /// the image currently shown: when `updated.previous_url` is not the
    /// item's current `source_url` another regeneration landed first and
    /// this one is refused with [`CoreError::Conflict`].
    pub fn apply_regenerated(&mut self, updated: &ReviewItem) -> Result<(), CoreError> {
        let pos = self.position(updated.id)?;
        let item = &mut self.items[pos];
        if updated.previous_url.as_deref() != Some(item.source_url.as_str()) {
            return Err(CoreError::Conflict(format!(
                "Item {} changed while it was being regenerated",
                updated.id
            )));
        }
        item.source_url = updated.source_url.clone();
        item.previous_url = updated.previous_url.clone();
        item.status = updated.status;
        Ok(())
    }

    // -- Queries ------------------------------------------------------------

    pub fn stats(&self) -> ReviewStats {
        let count = |s: ReviewStatus| self.items.iter().filter(|i| i.status == s).count();
        ReviewStats {
            total: self.items.len(),
            approved: count(ReviewStatus::Approved),
            rejected: count(ReviewStatus::Rejected),
            pending: count(ReviewStatus::Pending),
        }
    }

    /// Approved items in ledger order.
    pub fn approved(&self) -> Vec<&ReviewItem> {
        self.items
            .iter()
            .filter(|i| i.status == ReviewStatus::Approved)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::matcher::PLACEHOLDER_PROMPT;

    fn image(name: &str) -> ImportedImage {
        ImportedImage {
            file_name: name.to_string(),
            source_url: format!("/media/{name}"),
        }
    }

    fn ledger_with(names: &[&str]) -> (ReviewLedger, Vec<ItemId>) {
        let mut ledger = ReviewLedger::new();
        let ids = ledger.import_images(names.iter().map(|n| image(n)).collect());
        (ledger, ids)
    }

    #[test]
    fn import_creates_pending_items_in_order() {
        let (ledger, ids) = ledger_with(&["a.png", "b.png", "c.png"]);
        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.view(), ViewMode::Review);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        let names: Vec<_> = ledger.items().iter().map(|i| i.file_name.as_str()).collect();
        assert_eq!(names, ["a.png", "b.png", "c.png"]);
        assert!(ledger.items().iter().all(|i| i.status == ReviewStatus::Pending));
        assert!(ledger.items().iter().all(|i| i.prompt == PLACEHOLDER_PROMPT));
    }

    #[test]
    fn ids_stay_unique_across_batches() {
        let mut ledger = ReviewLedger::new();
        let mut ids = ledger.import_images(vec![image("a.png"), image("b.png")]);
        ids.extend(ledger.import_images(vec![image("c.png")]));
        ids.extend(ledger.import_images(vec![image("d.png")]));
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn end_to_end_matching_and_stats() {
        let (mut ledger, ids) =
            ledger_with(&["scene_chap_1_2.png", "scene_chap_1_3.png", "unrelated.png"]);
        ledger.load_prompt_dataset(vec![
            PromptRecord::new("A hides || Chap 1_2"),
            PromptRecord::new("B arrives || Chap_1_3"),
        ]);

        assert_eq!(ledger.items()[0].prompt, "A hides");
        assert_eq!(ledger.items()[1].prompt, "B arrives");
        assert_eq!(ledger.items()[2].prompt, PLACEHOLDER_PROMPT);

        ledger.approve(ids[0]).unwrap();
        ledger.reject(ids[1]).unwrap();
        assert_eq!(
            ledger.stats(),
            ReviewStats { total: 3, approved: 1, rejected: 1, pending: 1 }
        );
    }

    #[test]
    fn import_matches_against_loaded_dataset() {
        let mut ledger = ReviewLedger::new();
        ledger.load_prompt_dataset(vec![PromptRecord::new("Raka waits || chap_2_1")]);
        ledger.import_images(vec![image("chap_2_1_compressed.png")]);
        assert_eq!(ledger.items()[0].prompt, "Raka waits");
        assert_eq!(ledger.items()[0].original_prompt, "Raka waits");
    }

    #[test]
    fn approve_auto_advances_once() {
        let (mut ledger, ids) = ledger_with(&["a.png", "b.png", "c.png"]);
        ledger.approve(ids[0]).unwrap();
        assert_eq!(ledger.active_index(), 1);

        let snapshot = ledger.items().to_vec();
        ledger.approve(ids[0]).unwrap();
        assert_eq!(ledger.active_index(), 1);
        assert_eq!(ledger.items(), snapshot.as_slice());
        assert_eq!(ledger.items()[0].status, ReviewStatus::Approved);
    }

    #[test]
    fn repeating_decision_on_active_item_keeps_cursor() {
        let (mut ledger, ids) = ledger_with(&["a.png", "b.png", "c.png"]);
        ledger.reject(ids[0]).unwrap();
        assert!(ledger.retreat());

        ledger.reject(ids[0]).unwrap();
        assert_eq!(ledger.active_index(), 0);

        // A different decision is a status change and advances.
        ledger.approve(ids[0]).unwrap();
        assert_eq!(ledger.active_index(), 1);
    }

    #[test]
    fn decision_on_last_item_stays_put() {
        let (mut ledger, ids) = ledger_with(&["a.png", "b.png"]);
        ledger.advance();
        ledger.reject(ids[1]).unwrap();
        assert_eq!(ledger.active_index(), 1);
        assert_eq!(ledger.items()[1].status, ReviewStatus::Rejected);
    }

    #[test]
    fn deciding_a_non_active_item_does_not_move_cursor() {
        let (mut ledger, ids) = ledger_with(&["a.png", "b.png", "c.png"]);
        ledger.reject(ids[2]).unwrap();
        assert_eq!(ledger.active_index(), 0);
    }

    #[test]
    fn approved_item_can_be_rejected() {
        let (mut ledger, ids) = ledger_with(&["a.png"]);
        ledger.approve(ids[0]).unwrap();
        ledger.reject(ids[0]).unwrap();
        assert_eq!(ledger.items()[0].status, ReviewStatus::Rejected);
    }

    #[test]
    fn navigation_is_clamped() {
        let (mut ledger, _) = ledger_with(&["a.png", "b.png"]);
        assert!(!ledger.retreat());
        assert_eq!(ledger.active_index(), 0);
        assert!(ledger.advance());
        assert!(!ledger.advance());
        assert_eq!(ledger.active_index(), 1);
        assert!(ledger.retreat());
        assert_eq!(ledger.active_index(), 0);
    }

    #[test]
    fn navigation_on_empty_ledger_is_noop() {
        let mut ledger = ReviewLedger::new();
        assert!(!ledger.advance());
        assert!(!ledger.retreat());
        assert!(ledger.current().is_none());
        assert_eq!(ledger.view(), ViewMode::Upload);
    }

    #[test]
    fn reset_restores_original_after_edits() {
        let mut ledger = ReviewLedger::new();
        ledger.load_prompt_dataset(vec![PromptRecord::new("MC in bedroom || chap_1_1")]);
        let ids = ledger.import_images(vec![image("chap_1_1.png")]);

        ledger.edit_prompt(ids[0], "MC in living room").unwrap();
        ledger.edit_prompt(ids[0], "MC in VIP room").unwrap();
        assert_eq!(ledger.items()[0].original_prompt, "MC in bedroom");
        assert_eq!(ledger.items()[0].setting(), Setting::HospitalVip);

        ledger.reset_prompt(ids[0]).unwrap();
        assert_eq!(ledger.items()[0].prompt, "MC in bedroom");
        assert_eq!(ledger.items()[0].status, ReviewStatus::Pending);
    }

    #[test]
    fn edit_keeps_status() {
        let (mut ledger, ids) = ledger_with(&["a.png", "b.png"]);
        ledger.approve(ids[0]).unwrap();
        ledger.edit_prompt(ids[0], "changed").unwrap();
        assert_eq!(ledger.items()[0].status, ReviewStatus::Approved);
    }

    #[test]
    fn dataset_reload_overwrites_reviewer_edits() {
        let mut ledger = ReviewLedger::new();
        let ids = ledger.import_images(vec![image("chap_1_1.png"), image("chap_1_2.png")]);
        ledger.load_prompt_dataset(vec![
            PromptRecord::new("first || chap_1_1"),
            PromptRecord::new("second || chap_1_2"),
        ]);
        ledger.edit_prompt(ids[0], "edited").unwrap();
        ledger.edit_prompt(ids[1], "edited too").unwrap();

        let changed = ledger.load_prompt_dataset(vec![
            PromptRecord::new("first v2 || chap_1_1"),
            PromptRecord::new("edited too || chap_1_2"),
        ]);

        assert_eq!(changed, 1);
        assert_eq!(ledger.items()[0].prompt, "first v2");
        assert_eq!(ledger.items()[0].original_prompt, "first v2");
        // Same text as the new match: nothing is overwritten.
        assert_eq!(ledger.items()[1].original_prompt, "second");
    }

    #[test]
    fn unknown_id_is_not_found() {
        let mut ledger = ReviewLedger::new();
        assert_matches!(ledger.approve(42), Err(CoreError::NotFound { id: 42, .. }));
        assert_matches!(ledger.edit_prompt(42, "x"), Err(CoreError::NotFound { .. }));
        assert_matches!(ledger.reset_prompt(42), Err(CoreError::NotFound { .. }));
    }

    #[test]
    fn stats_match_live_filter() {
        let (mut ledger, ids) = ledger_with(&["a.png", "b.png", "c.png", "d.png"]);
        ledger.approve(ids[0]).unwrap();
        ledger.approve(ids[1]).unwrap();
        ledger.reject(ids[1]).unwrap();

        let stats = ledger.stats();
        assert_eq!(stats.total, ledger.len());
        assert_eq!(stats.approved, ledger.approved().len());
        assert_eq!(stats.approved + stats.rejected + stats.pending, stats.total);
        assert_eq!(stats.rejected, 1);
    }

    #[test]
    fn apply_regenerated_touches_only_media_and_status() {
        let (mut ledger, ids) = ledger_with(&["a.png"]);
        ledger.edit_prompt(ids[0], "edited meanwhile").unwrap();
        ledger.approve(ids[0]).unwrap();

        let mut updated = ledger.items()[0].clone();
        updated.prompt = "stale".to_string();
        updated.previous_url = Some(updated.source_url.clone());
        updated.source_url = "https://gen/new.png".to_string();
        updated.status = ReviewStatus::Pending;
        ledger.apply_regenerated(&updated).unwrap();

        let item = &ledger.items()[0];
        assert_eq!(item.prompt, "edited meanwhile");
        assert_eq!(item.source_url, "https://gen/new.png");
        assert_eq!(item.previous_url.as_deref(), Some("/media/a.png"));
        assert_eq!(item.status, ReviewStatus::Pending);
        assert!(item.can_compare());
    }

    #[test]
    fn stale_regeneration_result_is_refused() {
        let (mut ledger, ids) = ledger_with(&["a.png"]);
        let snapshot = ledger.items()[0].clone();

        let regenerated = |from: &ReviewItem, url: &str| {
            let mut updated = from.clone();
            updated.previous_url = Some(updated.source_url.clone());
            updated.source_url = url.to_string();
            updated
        };

        // Two results built from the same snapshot: only the first lands.
        let first = regenerated(&snapshot, "https://gen/1.png");
        let second = regenerated(&snapshot, "https://gen/2.png");
        ledger.apply_regenerated(&first).unwrap();
        assert_matches!(ledger.apply_regenerated(&second), Err(CoreError::Conflict(_)));

        let item = ledger.get(ids[0]).unwrap();
        assert_eq!(item.source_url, "https://gen/1.png");
        assert_eq!(item.previous_url.as_deref(), Some("/media/a.png"));

        // A result built on top of the first one chains correctly.
        let third = regenerated(item, "https://gen/3.png");
        ledger.apply_regenerated(&third).unwrap();
        let item = ledger.get(ids[0]).unwrap();
        assert_eq!(item.previous_url.as_deref(), Some("https://gen/1.png"));
    }

    #[test]
    fn item_serializes_camel_case() {
        let (ledger, _) = ledger_with(&["a.png"]);
        let json = serde_json::to_value(&ledger.items()[0]).unwrap();
        assert_eq!(json["fileName"], "a.png");
        assert_eq!(json["sourceUrl"], "/media/a.png");
        assert!(json["previousUrl"].is_null());
        assert_eq!(json["status"], "pending");
    }
}
