//! Course page → folder activity ids.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use super::{ExtractError, extract_ids};

const FOLDER_ANCHORS: &str = "#region-main .course-content .activity.folder a";

#[allow(clippy::expect_used)]
static FOLDER_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)/mod/folder/view\.php(?:\?.*&|\?)id=(\d+)")
        .expect("folder href regex is valid") // Static pattern, safe to panic
});

/// Numeric id of a folder activity, scoped to the course page it was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FolderId(pub u64);

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Extracts the folder activities listed in a course's main content.
///
/// # Errors
///
/// Returns [`ExtractError`] only if the page cannot be queried at all.
pub fn extract_folders(html: &str) -> Result<Vec<FolderId>, ExtractError> {
    Ok(extract_ids(html, FOLDER_ANCHORS, &FOLDER_HREF)?
        .into_iter()
        .map(FolderId)
        .collect())
}
