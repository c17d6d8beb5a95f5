//! Prompt dataset records produced by the screenplay extraction service.
//!
//! The dataset is a JSON array of `{ "outputAi": "<prompt> || <chapter tag>" }`
//! objects. Parsing is all-or-nothing: a malformed document never yields a
//! partial record list.

use serde::{Deserialize, Serialize};

use crate::chapter::{extract_chapter, ChapterId};
use crate::error::CoreError;

/// Separator between the prompt text and the chapter tag in `outputAi`.
pub const LABEL_DELIMITER: &str = "||";

/// One entry of the extracted prompt dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRecord {
    #[serde(rename = "outputAi")]
    pub raw_label: String,
}

/// The two halves of a [`PromptRecord`] label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelParts<'a> {
    /// Prompt text, trimmed.
    pub prompt_text: &'a str,
    /// Everything after the first delimiter.
    pub chapter_tag: &'a str,
}

impl PromptRecord {
    pub fn new(raw_label: impl Into<String>) -> Self {
        Self {
            raw_label: raw_label.into(),
        }
    }

    /// Split the label on the first `||`. Returns `None` when the delimiter
    /// is absent.
    pub fn parts(&self) -> Option<LabelParts<'_>> {
        let (prompt, tag) = self.raw_label.split_once(LABEL_DELIMITER)?;
        Some(LabelParts {
            prompt_text: prompt.trim(),
            chapter_tag: tag,
        })
    }

    /// Chapter identifier from the post-delimiter segment, if any.
    pub fn chapter(&self) -> Option<ChapterId> {
        self.parts().and_then(|p| extract_chapter(p.chapter_tag))
    }
}

/// Parse a prompt dataset document.
///
/// Any JSON syntax error or shape mismatch is reported as
/// [`CoreError::Parse`].
pub fn parse_dataset(json: &str) -> Result<Vec<PromptRecord>, CoreError> {
    serde_json::from_str(json).map_err(|e| CoreError::Parse(format!("Invalid prompt dataset: {e}")))
}
