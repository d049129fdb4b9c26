//! Dashboard → in-progress course ids.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use super::{ExtractError, extract_ids};

const COURSE_ANCHORS: &str =
    "#myoverview_courses_view_in_progress .courses-view-course-item > a";

#[allow(clippy::expect_used)]
static COURSE_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)/course/view\.php(?:\?.*&|\?)id=(\d+)")
        .expect("course href regex is valid") // Static pattern, safe to panic
});

/// Numeric id of a course, as used in `/course/view.php?id=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CourseId(pub u64);

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Extracts the ids of the in-progress courses listed on the dashboard.
///
/// # Errors
///
/// Returns [`ExtractError`] only if the page cannot be queried at all.
pub fn extract_courses(html: &str) -> Result<Vec<CourseId>, ExtractError> {
    Ok(extract_ids(html, COURSE_ANCHORS, &COURSE_HREF)?
        .into_iter()
        .map(CourseId)
        .collect())
}
