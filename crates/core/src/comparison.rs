//! Before/after comparison split.
//!
//! The "before" image is overlaid on the "after" image and cropped to
//! `split` percent of the surface width. Dragging is captured globally:
//! once a drag starts, pointer positions outside the surface are clamped
//! to its edges and a pointer-up anywhere ends the drag.

use serde::{Deserialize, Serialize};

/// Split position when compare mode opens.
pub const DEFAULT_SPLIT: f64 = 50.0;

/// Horizontal extent of the comparison surface in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceBounds {
    pub left: f64,
    pub width: f64,
}

/// Pointer input forwarded from the client.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PointerEvent {
    Down { x: f64, bounds: SurfaceBounds },
    Move { x: f64, bounds: SurfaceBounds },
    Up,
}

/// Crop fractions (0.0..=1.0) for the two layers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropFractions {
    pub before: f64,
    pub after: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonController {
    split_fraction: f64,
    dragging: bool,
}

impl Default for ComparisonController {
    fn default() -> Self {
        Self {
            split_fraction: DEFAULT_SPLIT,
            dragging: false,
        }
    }
}

impl ComparisonController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Percentage (0..=100) of the surface width showing the "before" image.
    pub fn split_fraction(&self) -> f64 {
        self.split_fraction
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Start dragging and jump the split to the pointer.
    pub fn pointer_down(&mut self, x: f64, bounds: SurfaceBounds) {
        self.dragging = true;
        self.update_split(x, bounds);
    }

    /// Track the pointer while dragging; ignored otherwise.
    pub fn pointer_move(&mut self, x: f64, bounds: SurfaceBounds) {
        if self.dragging {
            self.update_split(x, bounds);
        }
    }

    pub fn pointer_up(&mut self) {
        self.dragging = false;
    }

    pub fn handle(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down { x, bounds } => self.pointer_down(x, bounds),
            PointerEvent::Move { x, bounds } => self.pointer_move(x, bounds),
            PointerEvent::Up => self.pointer_up(),
        }
    }

    /// Back to the centre, not dragging. Used when the active item changes.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn crop(&self) -> CropFractions {
        let before = self.split_fraction / 100.0;
        CropFractions {
            before,
            after: 1.0 - before,
        }
    }

    fn update_split(&mut self, x: f64, bounds: SurfaceBounds) {
        // A collapsed surface has no meaningful position.
        if !bounds.width.is_finite()
            || bounds.width <= 0.0
            || !bounds.left.is_finite()
            || !x.is_finite()
        {
            return;
        }
        let clamped = x.clamp(bounds.left, bounds.left + bounds.width);
        self.split_fraction = ((clamped - bounds.left) / bounds.width * 100.0).clamp(0.0, 100.0);
    }
}
