//! Page extractors for the three listing levels.
//!
//! Each extractor is a pure function from a page's HTML to the identities
//! found on it, deduplicated in first-seen order:
//!
//! - [`extract_courses`] - dashboard → [`CourseId`]s
//! - [`extract_folders`] - course page → [`FolderId`]s
//! - [`extract_files`] - folder page → [`FileDescriptor`]s
//!
//! Anchors that match a selector but not the expected href pattern are
//! dropped silently. A page with no matching anchors yields an empty list.

mod courses;
mod error;
mod files;
mod folders;
pub mod sanitize;

use std::collections::HashSet;
use std::hash::Hash;

use regex::Regex;
use scraper::{Html, Selector};

pub use courses::{CourseId, extract_courses};
pub use error::ExtractError;
pub use files::{FileDescriptor, extract_files, purify_course_name};
pub use folders::{FolderId, extract_folders};
pub use sanitize::sanitize_path_component;

fn parse_selector(css: &'static str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::invalid_selector(css, format!("{e:?}")))
}

/// `href` attributes of every element matching `css`, in document order.
fn select_hrefs(document: &Html, css: &'static str) -> Result<Vec<String>, ExtractError> {
    let selector = parse_selector(css)?;
    Ok(document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(ToString::to_string)
        .collect())
}

/// Numeric ids captured by `pattern`'s first group, deduplicated.
///
/// Zero and values overflowing `u64` count as non-matching.
fn extract_ids(html: &str, css: &'static str, pattern: &Regex) -> Result<Vec<u64>, ExtractError> {
    let document = Html::parse_document(html);
    let hrefs = select_hrefs(&document, css)?;
    let ids = hrefs
        .iter()
        .filter_map(|href| pattern.captures(href))
        .filter_map(|caps| caps.get(1)?.as_str().parse::<u64>().ok())
        .filter(|id| *id > 0);
    Ok(dedup_first_seen(ids, |id| *id))
}

fn dedup_first_seen<T, K, F>(items: impl IntoIterator<Item = T>, key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(key(item)))
        .collect()
}
