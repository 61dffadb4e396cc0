//! Integration tests for ranking and querying
//!
//! Pages are served by a wiremock server, crawled into an in-memory index,
//! ranked, and then queried through the public API.

use ripple_search::config::{Config, SignalWeights};
use ripple_search::crawler::crawl;
use ripple_search::output::format_results;
use ripple_search::query::match_distance;
use ripple_search::{compute_page_rank, IndexStore, QueryEngine, SqliteIndex};
use std::collections::HashSet;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            format!("<html><body>{}</body></html>", body),
            "text/html",
        ))
        .mount(server)
        .await;
}

/// Crawls A -> B ("shop now") plus an unrelated page C, then ranks
async fn crawled_shop_index() -> (MockServer, SqliteIndex) {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/a",
        r#"<p>Welcome to the store</p><a href="/b">shop now</a>"#,
    )
    .await;
    mount_page(&server, "/b", "<h1>Shop catalog</h1><p>Fine goods</p>").await;
    mount_page(
        &server,
        "/c",
        "<p>Nothing to see here except a shop mention</p>",
    )
    .await;

    let seeds = vec![format!("{}/a", server.uri()), format!("{}/c", server.uri())];
    let mut index = SqliteIndex::new_in_memory().unwrap();
    crawl(&mut index, &Config::default(), "hash", &seeds, 2)
        .await
        .unwrap();
    compute_page_rank(&mut index, 20).unwrap();

    (server, index)
}

#[tokio::test]
async fn test_link_target_ranks_first() {
    let (server, index) = crawled_shop_index().await;

    let results = QueryEngine::new(&index).search("shop").unwrap();
    let urls: Vec<&str> = results.iter().map(|r| r.url.as_str()).collect();

    assert_eq!(urls.len(), 3);
    assert_eq!(urls[0], format!("{}/b", server.uri()));

    let b = &results[0];
    assert_eq!(b.signals.inbound_links, 1.0);
    assert!(results[1..].iter().all(|r| r.signals.inbound_links == 0.0));
}

#[tokio::test]
async fn test_two_term_query_is_conjunctive() {
    let (server, index) = crawled_shop_index().await;

    // Only A contains both words; B's postings do not include its anchor text
    let results = QueryEngine::new(&index).search("shop now").unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].url, format!("{}/a", server.uri()));
}

#[tokio::test]
async fn test_unknown_query_is_empty() {
    let (_server, index) = crawled_shop_index().await;

    assert!(QueryEngine::new(&index)
        .search("nonexistentterm")
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_page_rank_only_ordering() {
    let (server, index) = crawled_shop_index().await;

    let results = QueryEngine::new(&index)
        .with_weights(SignalWeights::page_rank_only())
        .search("shop")
        .unwrap();

    assert_eq!(results[0].url, format!("{}/b", server.uri()));
    for result in &results {
        assert_eq!(
            result.score,
            index.read_page_rank(result.url_id).unwrap(),
            "score of {} should be its PageRank",
            result.url
        );
    }
}

#[tokio::test]
async fn test_formatted_output() {
    let (server, index) = crawled_shop_index().await;
    let results = QueryEngine::new(&index).search("shop").unwrap();

    let lines = format_results(&results, Some(1), false);
    assert_eq!(lines.len(), 1);

    let (score, url) = lines[0].split_once('\t').unwrap();
    assert!(score.parse::<f64>().unwrap() > 0.0);
    assert_eq!(url, format!("{}/b", server.uri()));
}

#[test]
fn test_distance_input_between_two_terms() {
    let mut index = SqliteIndex::new_in_memory().unwrap();
    let url_id = index.get_or_create_url("https://a.example/").unwrap();

    // alpha at position 3, beta at position 7
    let terms: Vec<String> = ["w", "w", "w", "alpha", "w", "w", "w", "beta"]
        .iter()
        .map(|t| t.to_string())
        .collect();
    index.add_postings(url_id, &terms, &HashSet::new()).unwrap();

    let alpha = index.word_id("alpha").unwrap().unwrap();
    let beta = index.word_id("beta").unwrap().unwrap();
    let matches = index.find_matches(&[alpha, beta]).unwrap();

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].positions, vec![3, 7]);
    assert_eq!(match_distance(&matches[0].positions), 4);
}

#[test]
fn test_indexing_twice_keeps_one_set_of_postings() {
    let mut index = SqliteIndex::new_in_memory().unwrap();
    let url_id = index.get_or_create_url("https://a.example/").unwrap();
    let terms = vec!["hello".to_string(), "world".to_string(), "2024".to_string()];

    index.add_postings(url_id, &terms, &HashSet::new()).unwrap();
    index.add_postings(url_id, &terms, &HashSet::new()).unwrap();

    assert_eq!(index.count_postings_for(url_id).unwrap(), 3);
    assert_eq!(
        QueryEngine::new(&index).search("Hello, World! 2024").unwrap().len(),
        1
    );
}
