// src/page/disambiguation.rs
//! Extraction of the choices listed on a rendered disambiguation page.
//!
//! Works on the HTML produced by `rvparse`: every `<li>` is a candidate
//! entry, except table-of-contents items (class containing `tocsection`).
//! An item's own content runs until its `</li>` or the next `<li>`, so a
//! nested list contributes its items separately.

use crate::constants::TOC_CLASS_MARKER;
use crate::types::DisambiguationOption;
use once_cell::sync::Lazy;
use regex::Regex;

static LIST_ITEM_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<li\b([^>]*)>").expect("list item pattern is valid"));
static LIST_ITEM_CLOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</li\s*>").expect("list item close pattern is valid"));
static ANCHOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<a\b([^>]*)>(.*?)</a\s*>").expect("anchor pattern is valid"));
static CLASS_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bclass\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("class pattern is valid")
});
static TITLE_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\btitle\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("title pattern is valid")
});
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern is valid"));
static ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").expect("entity pattern is valid")
});

/// Titles and detail records of a disambiguation page, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisambiguationChoices {
    /// Anchor text of every entry that links somewhere.
    pub options: Vec<String>,
    /// Entries whose first link carries a `title` attribute.
    pub details: Vec<DisambiguationOption>,
}

struct ListItem<'a> {
    attributes: &'a str,
    inner: &'a str,
}

/// Parses every non-TOC list item of a rendered page.
pub fn parse_disambiguation(html: &str) -> DisambiguationChoices {
    let mut choices = DisambiguationChoices::default();

    for item in list_items(html) {
        if attribute(&CLASS_ATTR, item.attributes)
            .is_some_and(|class| class.contains(TOC_CLASS_MARKER))
        {
            continue;
        }

        let Some(anchor) = ANCHOR.captures(item.inner) else {
            continue;
        };
        let anchor_attributes = anchor.get(1).map_or("", |m| m.as_str());
        let anchor_body = anchor.get(2).map_or("", |m| m.as_str());
        choices.options.push(plain_text(anchor_body));

        if let Some(title) = attribute(&TITLE_ATTR, anchor_attributes) {
            choices.details.push(DisambiguationOption {
                title: decode_entities(title),
                description: plain_text(item.inner),
            });
        }
    }

    choices
}

/// The `{title, description}` records of a disambiguation page.
pub fn extract_disambiguation_options(html: &str) -> Vec<DisambiguationOption> {
    parse_disambiguation(html).details
}

/// The link texts of a disambiguation page.
pub fn disambiguation_titles(html: &str) -> Vec<String> {
    parse_disambiguation(html).options
}

fn list_items(html: &str) -> Vec<ListItem<'_>> {
    let openings: Vec<_> = LIST_ITEM_OPEN.captures_iter(html).collect();
    let mut items = Vec::with_capacity(openings.len());

    for (index, opening) in openings.iter().enumerate() {
        let Some(whole) = opening.get(0) else {
            continue;
        };
        let start = whole.end();
        let next_open = openings
            .get(index + 1)
            .and_then(|next| next.get(0))
            .map_or(html.len(), |m| m.start());
        let close = LIST_ITEM_CLOSE
            .find(&html[start..])
            .map_or(html.len(), |m| start + m.start());

        items.push(ListItem {
            attributes: opening.get(1).map_or("", |m| m.as_str()),
            inner: &html[start..next_open.min(close)],
        });
    }

    items
}

fn attribute<'a>(pattern: &Regex, attributes: &'a str) -> Option<&'a str> {
    let captures = pattern.captures(attributes)?;
    captures
        .get(1)
        .or_else(|| captures.get(2))
        .map(|m| m.as_str())
}

fn plain_text(fragment: &str) -> String {
    decode_entities(&TAG.replace_all(fragment, ""))
        .trim()
        .to_string()
}

fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let entity = &caps[1];
            let decoded = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}
