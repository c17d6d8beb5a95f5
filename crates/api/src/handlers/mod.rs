//! Request handlers for the review session.
//!
//! Each submodule provides async handler functions for one area of the
//! workflow. Handlers delegate to `sceneqa_core` and map errors via
//! [`AppError`](crate::error::AppError).

pub mod comparison;
pub mod export;
pub mod outfits;
pub mod regeneration;
pub mod review;
pub mod settings;
