//! Folder page → file descriptors.
//!
//! Besides the file anchors, the folder page is also where the course and
//! folder *names* come from: the page heading and the last breadcrumb item.
//! Those names, not the numeric ids, become the mirror's directory names.

use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;
use tracing::{debug, warn};

use super::sanitize::sanitize_path_component;
use super::{ExtractError, dedup_first_seen, parse_selector, select_hrefs};

const COURSE_HEADING: &str = "#page-header .page-header-headings";
const BREADCRUMB_ITEMS: &str = "#page-header .breadcrumb-item";
const FILE_ANCHORS: &str = "#region-main .foldertree a";

#[allow(clippy::expect_used)]
static FILE_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)/pluginfile\.php/[^/]+/mod_folder/content.*/([^/?]+)$")
        .expect("file href regex is valid") // Static pattern, safe to panic
});

/// Leading module code such as `L.079.05810` or `01.XY`, followed by the title.
#[allow(clippy::expect_used)]
static COURSE_CODE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:[0-9A-Za-z_]?(?:\.[0-9A-Za-z_]+)*|[0-9A-Za-z_]+(?:\.[0-9A-Za-z_]+)+)[\t ](.+)$",
    )
    .expect("course code regex is valid") // Static pattern, safe to panic
});

/// A file discovered on a folder page.
///
/// `course`, `folder` and `file` are sanitized single path components;
/// `course` and `folder` may be empty when the page lacked the heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    /// Course display name.
    pub course: String,
    /// Folder display name.
    pub folder: String,
    /// File basename.
    pub file: String,
    /// Href the file is served from, query string removed.
    pub source_url: String,
}

/// Extracts the files of a folder page.
///
/// With `purify_course_names`, a leading module-code token is dropped from
/// the course name (see [`purify_course_name`]).
///
/// # Errors
///
/// Returns [`ExtractError`] only if the page cannot be queried at all.
pub fn extract_files(
    html: &str,
    purify_course_names: bool,
) -> Result<Vec<FileDescriptor>, ExtractError> {
    let document = Html::parse_document(html);

    let course = page_text(&document, COURSE_HEADING, Pick::First)?;
    let course = if course.is_empty() {
        warn!(
            selector = COURSE_HEADING,
            "course name is empty on folder page"
        );
        course
    } else if purify_course_names {
        sanitize_path_component(&purify_course_name(&course))
    } else {
        sanitize_path_component(&course)
    };

    let folder = page_text(&document, BREADCRUMB_ITEMS, Pick::Last)?;
    if folder.is_empty() {
        warn!(
            selector = BREADCRUMB_ITEMS,
            "folder name is empty on folder page"
        );
    }
    let folder = sanitize_path_component(&folder);

    let hrefs = select_hrefs(&document, FILE_ANCHORS)?;
    let candidates = hrefs.iter().filter_map(|href| {
        let source_url = href.split('?').next().unwrap_or(href);
        let raw_name = FILE_HREF.captures(source_url)?.get(1)?.as_str();
        let decoded = urlencoding::decode(raw_name).map_or_else(
            |_| raw_name.to_string(),
            std::borrow::Cow::into_owned,
        );
        let file = sanitize_path_component(&decoded);
        if file.is_empty() {
            debug!(href = %href, "file anchor has no usable basename");
            return None;
        }
        Some(FileDescriptor {
            course: course.clone(),
            folder: folder.clone(),
            file,
            source_url: source_url.to_string(),
        })
    });

    Ok(dedup_first_seen(candidates, |descriptor| {
        descriptor.file.clone()
    }))
}

/// Drops a leading module-code token from a course name.
///
/// `"L.079.05810 Systems"` and `"01.XY Intro to Systems"` both lose their
/// code; a name without such a prefix is returned unchanged.
#[must_use]
pub fn purify_course_name(name: &str) -> String {
    COURSE_CODE_PREFIX
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map_or_else(|| name.to_string(), |title| title.as_str().to_string())
}

enum Pick {
    First,
    Last,
}

/// Whitespace-normalized text of the first or last element matching `css`.
fn page_text(document: &Html, css: &'static str, pick: Pick) -> Result<String, ExtractError> {
    let selector = parse_selector(css)?;
    let mut matches = document.select(&selector);
    let element = match pick {
        Pick::First => matches.next(),
        Pick::Last => matches.last(),
    };
    Ok(element
        .map(|el| {
            el.text()
                .flat_map(str::split_whitespace)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default())
}
