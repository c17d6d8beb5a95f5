use crate::types::ItemId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: ItemId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// A prompt dataset (or other structured input) could not be parsed.
    #[error("Parse failed: {0}")]
    Parse(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
