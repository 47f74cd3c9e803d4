// src/page/section.rs
//! Section lookup over plain-text page content.

/// Returns the text of the section headed `== {title} ==`.
///
/// The text runs from the heading to the next `==` (or the end of the
/// content), with leading `=` and surrounding whitespace trimmed. A section with
/// subsections therefore only yields the text before its first subheading.
pub fn find_section(content: &str, title: &str) -> Option<String> {
    let heading = format!("== {} ==", title);
    let start = content.find(&heading)? + heading.len();
    let rest = &content[start..];
    let end = rest.find("==").unwrap_or(rest.len());

    Some(rest[..end].trim_start_matches('=').trim().to_string())
}
