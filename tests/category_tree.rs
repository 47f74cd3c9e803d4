// tests/category_tree.rs
//! Category tree expansion over a scripted category graph.

mod common;

use common::{api_error, missing_page, modern_site_info, page_info, page_property, scripted_wiki, RecordedRequest};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wikiquery::error_recovery::RetryPolicy;
use wikiquery::{CategoryTreeWalker, PageIdentifier, WikiError};

/// (name, parent categories, pages, sub-categories)
type Graph = &'static [(&'static str, &'static [&'static str], &'static [&'static str], &'static [&'static str])];

const PHYSICS: Graph = &[
    ("Physics", &["Natural sciences"], &["Physics", "Outline of physics"], &["Mechanics", "Optics"]),
    ("Mechanics", &["Physics"], &["Newton's laws"], &["Fluid mechanics"]),
    ("Fluid mechanics", &["Mechanics"], &["Bernoulli's principle"], &[]),
    ("Optics", &["Physics"], &["Lens"], &[]),
];

const CYCLIC: Graph = &[
    ("Chickens", &[], &["Hen"], &["Eggs"]),
    ("Eggs", &[], &["Omelette"], &["Chickens"]),
];

fn pageid(graph: Graph, name: &str) -> u64 {
    graph
        .iter()
        .position(|(n, ..)| *n == name)
        .map(|i| 1000 + i as u64)
        .unwrap_or(0)
}

fn respond(graph: Graph, request: &RecordedRequest) -> Result<Value, WikiError> {
    if request.is_site_info_probe() {
        return Ok(modern_site_info());
    }

    if request.param("list") == Some("categorymembers") {
        let name = request.param("cmtitle").and_then(|t| t.strip_prefix("Category:")).unwrap_or_default();
        let (_, _, pages, subcats) = graph.iter().find(|(n, ..)| *n == name).expect("known category");
        let mut members: Vec<Value> = pages.iter().map(|p| json!({ "title": p, "type": "page" })).collect();
        members.extend(
            subcats
                .iter()
                .map(|c| json!({ "title": format!("Category:{}", c), "type": "subcat" })),
        );
        return Ok(json!({ "query": { "categorymembers": members } }));
    }

    let title = request.param("titles").unwrap_or_default();
    let name = title.strip_prefix("Category:").unwrap_or(title);
    let Some((_, parents, ..)) = graph.iter().find(|(n, ..)| *n == name) else {
        return Ok(missing_page(title));
    };
    match request.param("prop") {
        Some("info|pageprops") => Ok(page_info(pageid(graph, name), title)),
        Some("categories") => {
            let parents: Vec<Value> = parents
                .iter()
                .map(|p| json!({ "title": format!("Category:{}", p) }))
                .collect();
            Ok(page_property(pageid(graph, name), "categories", json!(parents)))
        }
        other => panic!("unexpected prop {:?}", other),
    }
}

#[test]
fn unbounded_depth_expands_everything() {
    let (wiki, _log) = scripted_wiki(|r| respond(PHYSICS, r));

    let tree = wiki.category_tree(&["Physics"], 0).unwrap();

    let physics = &tree["Physics"];
    assert_eq!(physics.depth, 0);
    assert_eq!(physics.parent_categories, ["Natural sciences"]);
    assert_eq!(physics.links, ["Physics", "Outline of physics"]);
    assert_eq!(physics.sub_categories.keys().collect::<Vec<_>>(), ["Mechanics", "Optics"]);

    let mechanics = physics.sub_categories["Mechanics"].as_ref().unwrap();
    assert_eq!(mechanics.depth, 1);
    let fluids = mechanics.sub_categories["Fluid mechanics"].as_ref().unwrap();
    assert_eq!(fluids.depth, 2);
    assert_eq!(fluids.links, ["Bernoulli's principle"]);
    assert!(fluids.sub_categories.is_empty());
    assert_eq!(physics.size(), 4);
}

#[test]
fn depth_one_leaves_grandchildren_unexpanded() {
    let (wiki, log) = scripted_wiki(|r| respond(PHYSICS, r));

    let tree = wiki.category_tree(&["Physics"], 1).unwrap();

    let mechanics = tree["Physics"].sub_categories["Mechanics"].as_ref().unwrap();
    assert_eq!(mechanics.links, ["Newton's laws"]);
    assert_eq!(mechanics.sub_categories.get("Fluid mechanics"), Some(&None));
    assert!(log
        .with_param("cmtitle", "Category:Fluid mechanics")
        .is_empty());
}

#[test]
fn each_category_is_fetched_once_per_walk() {
    let (wiki, log) = scripted_wiki(|r| respond(PHYSICS, r));

    let tree = wiki.category_tree(&["Physics", "Mechanics"], 0).unwrap();

    assert_eq!(tree.keys().collect::<Vec<_>>(), ["Physics", "Mechanics"]);
    assert_eq!(tree["Mechanics"].depth, 0);
    assert_eq!(log.with_param("cmtitle", "Category:Mechanics").len(), 1);
    assert_eq!(log.with_param("cmtitle", "Category:Mechanics")[0].param("cmlimit"), Some("500"));
}

#[test]
fn cycles_terminate_with_a_leaf() {
    let (wiki, _log) = scripted_wiki(|r| respond(CYCLIC, r));

    let tree = wiki.category_tree(&["Chickens"], 0).unwrap();

    let eggs = tree["Chickens"].sub_categories["Eggs"].as_ref().unwrap();
    assert_eq!(eggs.links, ["Omelette"]);
    assert_eq!(eggs.sub_categories.get("Chickens"), Some(&None));
}

#[test]
fn unknown_category_ends_the_walk() {
    let (wiki, _log) = scripted_wiki(|r| respond(PHYSICS, r));

    let err = wiki.category_tree(&["Alchemy"], 0).unwrap_err();

    assert!(matches!(
        err,
        WikiError::PageNotFound { identifier: PageIdentifier::Title(ref name) } if name == "Alchemy"
    ));
}

#[test]
fn transient_failures_are_retried() {
    let failures = Arc::new(Mutex::new(2));
    let remaining = Arc::clone(&failures);
    let (wiki, log) = scripted_wiki(move |request| {
        if request.param("list") == Some("categorymembers") {
            let mut remaining = remaining.lock();
            if *remaining > 0 {
                *remaining -= 1;
                return Ok(api_error("Pool queue is full"));
            }
        }
        respond(PHYSICS, request)
    });

    let tree = CategoryTreeWalker::new(&wiki)
        .with_retry(RetryPolicy::fixed(5, Duration::ZERO))
        .build_tree(&["Optics"], 0)
        .unwrap();

    assert_eq!(tree["Optics"].links, ["Lens"]);
    assert_eq!(*failures.lock(), 0);
    assert_eq!(log.with_param("cmtitle", "Category:Optics").len(), 3);
}

#[test]
fn retries_are_bounded() {
    let (wiki, log) = scripted_wiki(|request| {
        if request.param("list") == Some("categorymembers") {
            return Ok(api_error("HTTP request timed out."));
        }
        respond(PHYSICS, request)
    });

    let err = CategoryTreeWalker::new(&wiki)
        .with_retry(RetryPolicy::fixed(3, Duration::ZERO))
        .build_tree(&["Optics"], 0)
        .unwrap_err();

    assert!(matches!(err, WikiError::TransportTimeout { .. }));
    assert_eq!(log.with_param("cmtitle", "Category:Optics").len(), 3);
}

#[test]
fn other_upstream_errors_are_not_retried() {
    let (wiki, log) = scripted_wiki(|request| {
        if request.param("list") == Some("categorymembers") {
            return Ok(api_error("Invalid category"));
        }
        respond(PHYSICS, request)
    });

    let err = CategoryTreeWalker::new(&wiki)
        .with_retry(RetryPolicy::fixed(3, Duration::ZERO))
        .build_tree(&["Optics"], 0)
        .unwrap_err();

    assert!(matches!(err, WikiError::Upstream { .. }));
    assert_eq!(log.with_param("cmtitle", "Category:Optics").len(), 1);
}
