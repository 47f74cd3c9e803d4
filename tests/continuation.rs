// tests/continuation.rs
//! Continuation paging driven through a scripted gateway.

mod common;

use common::{page_property, RecordedRequest, ScriptedTransport};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wikiquery::{ContinuedQuery, QueryParams, RequestGateway, WikiConfig, WikiError};

const PAGEID: u64 = 42;

fn gateway(
    responder: impl Fn(&RecordedRequest) -> Result<Value, WikiError> + Send + Sync + 'static,
) -> (RequestGateway, common::RequestLog) {
    let (transport, log) = ScriptedTransport::new(responder);
    (RequestGateway::new(Box::new(transport), &WikiConfig::default()), log)
}

fn link(title: &str) -> Value {
    json!({ "ns": 0, "title": title })
}

/// Three rounds of 2, 2 and 1 links.
fn three_round_links(request: &RecordedRequest) -> Result<Value, WikiError> {
    let mut response = match request.param("plcontinue") {
        None => page_property(PAGEID, "links", json!([link("Alpha"), link("Beta")])),
        Some("42|0|Gamma") => page_property(PAGEID, "links", json!([link("Gamma"), link("Delta")])),
        Some("42|0|Epsilon") => page_property(PAGEID, "links", json!([link("Epsilon")])),
        Some(other) => panic!("unexpected token {}", other),
    };
    let next = match request.param("plcontinue") {
        None => Some("42|0|Gamma"),
        Some("42|0|Gamma") => Some("42|0|Epsilon"),
        _ => None,
    };
    if let Some(token) = next {
        response["continue"] = json!({ "plcontinue": token, "continue": "||" });
    }
    Ok(response)
}

fn links_params() -> QueryParams {
    QueryParams::new()
        .with("prop", "links")
        .with("titles", "Rust")
        .with("pllimit", "max")
}

#[test]
fn three_rounds_yield_all_fragments_in_order() {
    let (gateway, log) = gateway(three_round_links);

    let titles: Vec<String> = ContinuedQuery::page_property(&gateway, links_params(), PAGEID)
        .map(|fragment| fragment.unwrap()["title"].as_str().unwrap().to_string())
        .collect();

    assert_eq!(titles, vec!["Alpha", "Beta", "Gamma", "Delta", "Epsilon"]);
    assert_eq!(log.len(), 3);
}

#[test]
fn continuation_tokens_are_echoed_verbatim() {
    let (gateway, log) = gateway(three_round_links);
    let count = ContinuedQuery::page_property(&gateway, links_params(), PAGEID).count();
    assert_eq!(count, 5);

    let requests = log.all();
    assert_eq!(requests[0].param("plcontinue"), None);
    assert_eq!(requests[1].param("plcontinue"), Some("42|0|Gamma"));
    assert_eq!(requests[1].param("continue"), Some("||"));
    assert_eq!(requests[2].param("plcontinue"), Some("42|0|Epsilon"));
    for request in &requests {
        assert_eq!(request.param("format"), Some("json"));
        assert_eq!(request.param("action"), Some("query"));
        assert_eq!(request.param("titles"), Some("Rust"));
    }
}

#[test]
fn rounds_are_fetched_only_when_needed() {
    let (gateway, log) = gateway(three_round_links);
    let mut cursor = ContinuedQuery::page_property(&gateway, links_params(), PAGEID);

    assert!(cursor.next().is_some());
    assert!(cursor.next().is_some());
    assert_eq!(cursor.rounds(), 1);
    assert_eq!(log.len(), 1);

    assert!(cursor.next().is_some());
    assert_eq!(log.len(), 2);
    drop(cursor);
    assert_eq!(log.len(), 2);
}

#[test]
fn generator_mode_yields_every_page() {
    let (gateway, log) = gateway(|request| {
        let pages = if request.param("gimcontinue").is_none() {
            json!({
                "-1": { "title": "File:A.png", "imageinfo": [{ "url": "https://upload/A.png" }] },
                "-2": { "title": "File:B.png", "imageinfo": [{ "url": "https://upload/B.png" }] }
            })
        } else {
            json!({ "-3": { "title": "File:C.png", "imageinfo": [{ "url": "https://upload/C.png" }] } })
        };
        let mut response = json!({ "query": { "pages": pages } });
        if request.param("gimcontinue").is_none() {
            response["continue"] = json!({ "gimcontinue": "42|C.png", "continue": "gimcontinue||" });
        }
        Ok(response)
    });

    let params = QueryParams::new()
        .with("generator", "images")
        .with("titles", "Rust")
        .with("prop", "imageinfo");
    let titles: Vec<String> = ContinuedQuery::generator(&gateway, params)
        .map(|page| page.unwrap()["title"].as_str().unwrap().to_string())
        .collect();

    assert_eq!(titles.len(), 3);
    assert!(titles.contains(&"File:C.png".to_string()));
    assert_eq!(log.len(), 2);
}

#[test]
fn response_without_query_ends_the_sequence() {
    let (gateway, log) = gateway(|_| Ok(json!({ "batchcomplete": "" })));
    let mut cursor = ContinuedQuery::page_property(&gateway, links_params(), PAGEID);
    assert!(cursor.next().is_none());
    assert!(cursor.next().is_none());
    assert_eq!(log.len(), 1);
}

#[test]
fn failure_is_yielded_once() {
    let (gateway, log) = gateway(|_| Ok(common::api_error("Pool queue is full")));
    let mut cursor = ContinuedQuery::page_property(&gateway, links_params(), PAGEID);

    match cursor.next() {
        Some(Err(WikiError::TransportTimeout { query })) => assert_eq!(query, "Rust"),
        other => panic!("expected a timeout, got {:?}", other),
    }
    assert!(cursor.next().is_none());
    assert_eq!(log.len(), 1);
}

#[test]
fn each_cursor_starts_from_scratch() {
    let (gateway, log) = gateway(three_round_links);
    let first = ContinuedQuery::page_property(&gateway, links_params(), PAGEID).count();
    let second = ContinuedQuery::page_property(&gateway, links_params(), PAGEID).count();
    assert_eq!(first, second);
    assert_eq!(log.len(), 6);
    assert_eq!(log.all()[3].param("plcontinue"), None);
}
