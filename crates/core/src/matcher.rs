//! Image-to-prompt matching.

use crate::chapter::chapter_from_file_name;
use crate::prompt_dataset::PromptRecord;

/// Prompt text assigned to items that have no matching record.
pub const PLACEHOLDER_PROMPT: &str = "Awaiting prompt data...";

/// Find the prompt text for `file_name` in `records`.
///
/// Records are scanned in order; records without a `||` delimiter or
/// without a chapter tag after it are skipped. The first record whose
/// chapter equals the filename's chapter wins.
pub fn match_prompt<'a>(file_name: &str, records: &'a [PromptRecord]) -> Option<&'a str> {
    let wanted = chapter_from_file_name(file_name)?;

    records.iter().find_map(|record| {
        let parts = record.parts()?;
        (record.chapter()? == wanted).then_some(parts.prompt_text)
    })
}

/// Like [`match_prompt`] but falls back to [`PLACEHOLDER_PROMPT`].
pub fn match_prompt_or_placeholder(file_name: &str, records: &[PromptRecord]) -> String {
    match_prompt(file_name, records)
        .unwrap_or(PLACEHOLDER_PROMPT)
        .to_string()
}
