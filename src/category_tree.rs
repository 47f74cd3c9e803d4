// src/category_tree.rs
//! Recursive expansion of category membership into a tree.
//!
//! Every category is fetched at most once per walk: its parent categories
//! come from the category page itself, its pages and sub-categories from a
//! `categorymembers` listing. Expansion below `max_depth` records children
//! as `None` leaves, and so does a child that is already one of its own
//! ancestors.

use crate::constants::{CATEGORY_PREFIX, CATEGORY_TREE_MEMBER_LIMIT};
use crate::error::WikiError;
use crate::error_recovery::{retry_with_backoff, RetryPolicy};
use crate::types::{CategoryMembers, PageIdentifier};
use crate::wiki::{PageOptions, Wiki};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;

/// One expanded category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryTreeNode {
    /// Distance from the root this node was expanded under (roots are 0).
    pub depth: i32,
    /// Sub-categories in listing order; `None` marks an unexpanded leaf.
    pub sub_categories: IndexMap<String, Option<CategoryTreeNode>>,
    /// Pages in the category.
    pub links: Vec<String>,
    /// Categories this category belongs to.
    pub parent_categories: Vec<String>,
}

impl CategoryTreeNode {
    /// Number of nodes in this subtree, counting `None` leaves.
    pub fn size(&self) -> usize {
        1 + self
            .sub_categories
            .values()
            .map(|child| child.as_ref().map_or(1, CategoryTreeNode::size))
            .sum::<usize>()
    }
}

#[derive(Debug, Clone)]
struct CategoryListing {
    parents: Vec<String>,
    members: CategoryMembers,
}

/// Builds category trees, sharing fetched listings across roots.
pub struct CategoryTreeWalker<'w> {
    wiki: &'w Wiki,
    retry: RetryPolicy,
    fetched: HashMap<String, CategoryListing>,
}

impl<'w> CategoryTreeWalker<'w> {
    pub fn new(wiki: &'w Wiki) -> Self {
        Self {
            wiki,
            retry: RetryPolicy::default(),
            fetched: HashMap::new(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Expands each of `categories` (names without the `Category:` prefix).
    ///
    /// `max_depth <= 0` expands everything reachable. A category that does
    /// not exist ends the walk with `PageNotFound` naming it; transient
    /// failures are retried per the walker's [`RetryPolicy`].
    pub fn build_tree(
        &mut self,
        categories: &[&str],
        max_depth: i32,
    ) -> Result<IndexMap<String, CategoryTreeNode>, WikiError> {
        let mut roots = IndexMap::with_capacity(categories.len());
        for name in categories {
            let mut path = Vec::new();
            let node = self.expand(name, max_depth, 0, &mut path)?;
            roots.insert((*name).to_string(), node);
        }
        log::debug!(
            "Category walk over {} root(s) fetched {} categories",
            roots.len(),
            self.fetched.len()
        );
        Ok(roots)
    }

    fn expand(
        &mut self,
        name: &str,
        max_depth: i32,
        level: i32,
        path: &mut Vec<String>,
    ) -> Result<CategoryTreeNode, WikiError> {
        let listing = self.listing(name)?;
        let mut node = CategoryTreeNode {
            depth: level,
            sub_categories: IndexMap::new(),
            links: listing.members.pages.clone(),
            parent_categories: listing.parents.clone(),
        };

        let at_limit = max_depth > 0 && level >= max_depth;
        path.push(name.to_string());
        for child in &listing.members.subcategories {
            if at_limit || path.iter().any(|ancestor| ancestor == child) {
                node.sub_categories.insert(child.clone(), None);
                continue;
            }
            let expanded = self.expand(child, max_depth, level + 1, path)?;
            node.sub_categories.insert(child.clone(), Some(expanded));
        }
        path.pop();

        Ok(node)
    }

    fn listing(&mut self, name: &str) -> Result<CategoryListing, WikiError> {
        if let Some(listing) = self.fetched.get(name) {
            return Ok(listing.clone());
        }

        let wiki = self.wiki;
        let listing = retry_with_backoff(self.retry, || fetch_listing(wiki, name)).map_err(|e| {
            if e.is_not_found() {
                WikiError::PageNotFound {
                    identifier: PageIdentifier::Title(name.to_string()),
                }
            } else {
                e
            }
        })?;

        self.fetched.insert(name.to_string(), listing.clone());
        Ok(listing)
    }
}

fn fetch_listing(wiki: &Wiki, name: &str) -> Result<CategoryListing, WikiError> {
    let page = wiki.page_with(
        PageIdentifier::Title(format!("{}{}", CATEGORY_PREFIX, name)),
        PageOptions {
            auto_suggest: false,
            follow_redirect: true,
            preload: false,
        },
    )?;
    let parents = page.categories()?.to_vec();
    let members = wiki.category_members(name, CATEGORY_TREE_MEMBER_LIMIT, true)?;
    Ok(CategoryListing { parents, members })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(depth: i32) -> CategoryTreeNode {
        CategoryTreeNode {
            depth,
            ..Default::default()
        }
    }

    #[test]
    fn size_counts_unexpanded_leaves() {
        let mut child = leaf(1);
        child.sub_categories.insert("Grandchild".to_string(), None);
        let mut root = leaf(0);
        root.sub_categories.insert("Child".to_string(), Some(child));
        root.sub_categories.insert("Other".to_string(), None);
        assert_eq!(root.size(), 4);
    }
}
