//! HTTP client for the external scene generation backend.
//!
//! Wraps the backend's `POST /regenerate` endpoint with [`reqwest`] and
//! plugs it into the review core through
//! [`sceneqa_core::regeneration::GenerationService`].

pub mod api;

pub use api::{GenerationApi, GenerationApiError, GeneratedImage};
