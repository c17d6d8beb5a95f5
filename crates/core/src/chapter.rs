//! Chapter/scene identifier extraction.
//!
//! Image filenames and prompt labels both carry a positional tag such as
//! `chap_1_2`, `Chap 1_2` or `CHAPTER_3 4`. This module locates the first
//! such tag and returns its `(major, minor)` pair.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Chapter keyword, optional separators, first integer, at least one
/// separator, second integer.
pub const CHAPTER_PATTERN: &str = r"(?i)chap(?:ter)?[_\s]*(\d+)[_\s]+(\d+)";

/// Image extensions stripped from filenames before searching.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif", "bmp"];

/// Marker appended by the compression step of the asset pipeline.
pub const COMPRESSED_MARKER: &str = "_compressed";

static CHAPTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(CHAPTER_PATTERN).expect("valid regex"));

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Positional identifier shared by an image and the prompt that produced it.
///
/// Equality is exact on both components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChapterId {
    pub major: u32,
    pub minor: u32,
}

impl ChapterId {
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for ChapterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chap_{}_{}", self.major, self.minor)
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Find the first chapter tag in `text`, scanning left to right.
///
/// Returns `None` when no tag is present or when either number does not
/// fit in a `u32`.
pub fn extract_chapter(text: &str) -> Option<ChapterId> {
    let caps = CHAPTER_RE.captures(text)?;
    let major = caps.get(1)?.as_str().parse().ok()?;
    let minor = caps.get(2)?.as_str().parse().ok()?;
    Some(ChapterId::new(major, minor))
}

/// Strip a trailing image extension and then a trailing `_compressed`
/// marker, both case-insensitively.
pub fn normalize_file_name(file_name: &str) -> &str {
    let mut stem = file_name;

    if let Some((base, ext)) = stem.rsplit_once('.') {
        let ext = ext.to_ascii_lowercase();
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            stem = base;
        }
    }

    let marker_len = COMPRESSED_MARKER.len();
    if stem.len() >= marker_len
        && stem.is_char_boundary(stem.len() - marker_len)
        && stem[stem.len() - marker_len..].eq_ignore_ascii_case(COMPRESSED_MARKER)
    {
        stem = &stem[..stem.len() - marker_len];
    }

    stem
}

/// Extract the chapter tag from an image filename after normalisation.
pub fn chapter_from_file_name(file_name: &str) -> Option<ChapterId> {
    extract_chapter(normalize_file_name(file_name))
}
