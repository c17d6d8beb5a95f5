//! Scene QA domain logic.
//!
//! Pure, synchronous building blocks for the image review workflow:
//! chapter identifier extraction, prompt matching, scene analysis, the
//! review ledger state machine, before/after comparison math and the
//! approved-item export manifest. The only async piece is the
//! [`regeneration`] coordinator, which talks to an external generation
//! service through the [`regeneration::GenerationService`] trait.

pub mod chapter;
pub mod comparison;
pub mod error;
pub mod export;
pub mod matcher;
pub mod outfit_overrides;
pub mod prompt_dataset;
pub mod regeneration;
pub mod review;
pub mod scene;
pub mod types;
