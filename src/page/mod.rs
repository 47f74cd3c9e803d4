// src/page/mod.rs
//! Page resolution and the lazily loaded page entity.

pub mod disambiguation;
mod entity;
mod resolver;
pub mod section;

pub use disambiguation::{
    disambiguation_titles, extract_disambiguation_options, parse_disambiguation,
    DisambiguationChoices,
};
pub use entity::WikiPage;
pub use resolver::PageResolver;
pub use section::find_section;
