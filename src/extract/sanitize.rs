//! Filesystem-safe path components.
//!
//! Course names, folder names and file basenames come straight from page
//! markup; each is reduced to a single path component before it touches
//! the mirror.

use std::sync::LazyLock;

use regex::Regex;

/// Longest component most filesystems accept, in bytes.
const MAX_COMPONENT_BYTES: usize = 255;

#[allow(clippy::expect_used)]
static WINDOWS_RESERVED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:con|prn|aux|nul|com[0-9]|lpt[0-9])(?:\..*)?$")
        .expect("reserved-name regex is valid") // Static pattern, safe to panic
});

/// Reduces `input` to a single safe path component.
///
/// Removes path separators, characters reserved on common filesystems
/// (`? < > : * | "`) and control characters. Names consisting only of dots
/// and Windows device names become empty. Trailing dots and spaces are
/// dropped and the result is truncated to 255 bytes.
///
/// An empty result means "no usable name"; callers decide what that means.
#[must_use]
pub fn sanitize_path_component(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | '?' | '<' | '>' | ':' | '*' | '|' | '"'))
        .filter(|c| !c.is_control())
        .collect();

    if cleaned.chars().all(|c| c == '.') || WINDOWS_RESERVED.is_match(&cleaned) {
        return String::new();
    }

    let trimmed = cleaned.trim_end_matches(['.', ' ']);
    truncate_to_bytes(trimmed, MAX_COMPONENT_BYTES).to_string()
}

fn truncate_to_bytes(value: &str, max_bytes: usize) -> &str {
    if value.len() <= max_bytes {
        return value;
    }
    let mut end = max_bytes;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}
