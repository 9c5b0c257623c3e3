//! Plain-text rendering of HTML bodies
//!
//! Strips every tag except anchors, so links stay visible (and clickable in
//! clients that autolink) in the `text/plain` alternative.

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Comments, doctypes and processing instructions, or an element tag whose
/// name is captured. Quoted attribute values may contain `>`. A tag left open
/// at the end of input is consumed up to the end.
static TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)<!--.*?(?:-->|\z)|</?(?P<name>[A-Za-z][A-Za-z0-9:-]*)(?:[^>"']|"[^"]*"|'[^']*')*(?:>|\z)|<[!?][^>]*(?:>|\z)"#,
    )
    .expect("tag pattern is a valid regex")
});

/// Strip all markup from `html` except `<a>` tags, which are kept verbatim
///
/// # Example
///
/// ```rust,ignore
/// use maildispatch::email::plaintext_of;
///
/// assert_eq!(
///     plaintext_of("<b>Hi</b> <a href='x'>link</a>"),
///     "Hi <a href='x'>link</a>"
/// );
/// ```
pub fn plaintext_of(html: &str) -> String {
    TAG_PATTERN
        .replace_all(html, |caps: &Captures<'_>| match caps.name("name") {
            Some(name) if name.as_str().eq_ignore_ascii_case("a") => caps[0].to_string(),
            _ => String::new(),
        })
        .into_owned()
}
