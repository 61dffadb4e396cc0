//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use ripple_search::config::{Config, UserAgentConfig};
use ripple_search::crawler::crawl;
use ripple_search::storage::RunStatus;
use ripple_search::{compute_page_rank, IndexStore, SqliteIndex};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with a recognizable user agent
fn create_test_config() -> Config {
    let mut config = Config::default();
    config.user_agent = UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: Some("https://example.com/contact".to_string()),
    };
    config.crawler.request_timeout_secs = 5;
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><head><title>Test</title></head><body>{}</body></html>", body),
        "text/html",
    )
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .mount(server)
        .await;
}

/// A links to B with anchor text "shop now"; B has no links
async fn shop_server() -> MockServer {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/a",
        r#"<p>Welcome to the store</p><a href="/b">shop now</a>"#,
    )
    .await;
    mount_page(&server, "/b", "<h1>Shop catalog</h1><p>Fine goods</p>").await;
    server
}

#[tokio::test]
async fn test_full_crawl_indexes_both_pages() {
    let server = shop_server().await;
    let seed = format!("{}/a", server.uri());
    let b_url = format!("{}/b", server.uri());

    let mut index = SqliteIndex::new_in_memory().unwrap();
    let summary = crawl(&mut index, &create_test_config(), "hash", &[seed.clone()], 2)
        .await
        .unwrap();

    assert_eq!(summary.rounds, 2);
    assert_eq!(summary.pages_indexed, 2);
    assert_eq!(summary.fetch_failures, 0);

    assert!(index.is_url_indexed(&seed).unwrap());
    assert!(index.is_url_indexed(&b_url).unwrap());

    // Exactly one edge A -> B carrying the anchor words
    let a = index.url_id(&seed).unwrap().unwrap();
    let b = index.url_id(&b_url).unwrap().unwrap();
    let edges = index.outgoing_links(a).unwrap();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].to_id, b);
    assert_eq!(index.link_words(edges[0].id).unwrap(), vec!["shop", "now"]);
    assert_eq!(index.counts().unwrap().links, 1);
}

#[tokio::test]
async fn test_rank_after_crawl_favors_link_target() {
    let server = shop_server().await;
    let seed = format!("{}/a", server.uri());

    let mut index = SqliteIndex::new_in_memory().unwrap();
    crawl(&mut index, &create_test_config(), "hash", &[seed.clone()], 2)
        .await
        .unwrap();

    let summary = compute_page_rank(&mut index, 20).unwrap();
    assert_eq!(summary.urls, 2);
    assert!((summary.total_score - 1.0).abs() < 1e-3);

    let a = index.url_id(&seed).unwrap().unwrap();
    let b = index.url_id(&format!("{}/b", server.uri())).unwrap().unwrap();
    assert!(index.read_page_rank(b).unwrap() > index.read_page_rank(a).unwrap());
}

#[tokio::test]
async fn test_crawl_with_depth_limit() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/level1">down</a> root"#).await;
    mount_page(&server, "/level1", r#"<a href="/level2">down</a> one"#).await;
    mount_page(&server, "/level2", "two").await;

    let seed = format!("{}/", server.uri());
    let mut index = SqliteIndex::new_in_memory().unwrap();
    let summary = crawl(&mut index, &create_test_config(), "hash", &[seed], 2)
        .await
        .unwrap();

    assert_eq!(summary.pages_indexed, 2);

    // level2 is known as a link target but never fetched
    let level2 = format!("{}/level2", server.uri());
    assert!(index.url_id(&level2).unwrap().is_some());
    assert!(!index.is_url_indexed(&level2).unwrap());
}

#[tokio::test]
async fn test_fetch_failures_are_skipped() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<a href="/missing">gone</a> <a href="/error">broken</a> <a href="/ok">fine</a>"#,
    )
    .await;
    mount_page(&server, "/ok", "still here").await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/error"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut index = SqliteIndex::new_in_memory().unwrap();
    let summary = crawl(
        &mut index,
        &create_test_config(),
        "hash",
        &[format!("{}/", server.uri())],
        2,
    )
    .await
    .unwrap();

    assert_eq!(summary.fetch_failures, 2);
    assert_eq!(summary.pages_indexed, 2);

    let run = index.get_crawl_run(summary.run_id).unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.fetch_failures, 2);
}

#[tokio::test]
async fn test_content_type_handling() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/doc.pdf">manual</a> home"#).await;
    Mock::given(method("GET"))
        .and(path("/doc.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("%PDF-1.4", "application/pdf"))
        .mount(&server)
        .await;

    let mut index = SqliteIndex::new_in_memory().unwrap();
    let summary = crawl(
        &mut index,
        &create_test_config(),
        "hash",
        &[format!("{}/", server.uri())],
        2,
    )
    .await
    .unwrap();

    assert_eq!(summary.fetch_failures, 1);
    assert!(!index
        .is_url_indexed(&format!("{}/doc.pdf", server.uri()))
        .unwrap());
}

#[tokio::test]
async fn test_recrawl_is_idempotent() {
    let server = shop_server().await;
    let seeds = [format!("{}/a", server.uri())];
    let config = create_test_config();

    let mut index = SqliteIndex::new_in_memory().unwrap();
    crawl(&mut index, &config, "hash", &seeds, 2).await.unwrap();
    let before = index.counts().unwrap();

    let second = crawl(&mut index, &config, "hash", &seeds, 2).await.unwrap();
    let after = index.counts().unwrap();

    assert_eq!(second.pages_indexed, 0);
    assert_eq!(second.pages_skipped, 1);
    assert_eq!(before, after);
    assert_eq!(index.recent_crawl_runs(10).unwrap().len(), 2);
}

#[tokio::test]
async fn test_user_agent_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header(
            "user-agent",
            "TestBot/1.0.0 (+https://example.com/contact)",
        ))
        .respond_with(html("hello"))
        .expect(1)
        .mount(&server)
        .await;

    let mut index = SqliteIndex::new_in_memory().unwrap();
    let summary = crawl(
        &mut index,
        &create_test_config(),
        "hash",
        &[format!("{}/", server.uri())],
        1,
    )
    .await
    .unwrap();

    assert_eq!(summary.pages_indexed, 1);
}

#[tokio::test]
async fn test_ignored_words_from_config() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "<p>The cat and the hat</p>").await;

    let mut config = create_test_config();
    config.crawler.ignored_words = vec!["the".to_string(), "AND".to_string()];

    let seed = format!("{}/", server.uri());
    let mut index = SqliteIndex::new_in_memory().unwrap();
    crawl(&mut index, &config, "hash", &[seed.clone()], 1)
        .await
        .unwrap();

    // "test" from the page title plus cat and hat
    let url_id = index.url_id(&seed).unwrap().unwrap();
    assert_eq!(index.count_postings_for(url_id).unwrap(), 3);
    assert_eq!(index.word_id("the").unwrap(), None);
    assert_eq!(index.word_id("and").unwrap(), None);
}

#[tokio::test]
async fn test_invalid_seed_is_rejected() {
    let mut index = SqliteIndex::new_in_memory().unwrap();
    let result = crawl(
        &mut index,
        &create_test_config(),
        "hash",
        &["ftp://example.com/".to_string()],
        1,
    )
    .await;

    assert!(result.is_err());
    assert!(index.recent_crawl_runs(10).unwrap().is_empty());
}

#[tokio::test]
async fn test_crawl_persists_to_disk() {
    let server = shop_server().await;
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("index.sqlite3");

    {
        let mut index = SqliteIndex::build(&db_path, false).unwrap();
        crawl(
            &mut index,
            &create_test_config(),
            "hash",
            &[format!("{}/a", server.uri())],
            2,
        )
        .await
        .unwrap();
    }

    let reopened = SqliteIndex::open(&db_path).unwrap();
    let counts = reopened.counts().unwrap();
    assert_eq!(counts.indexed_urls, 2);
    assert_eq!(counts.links, 1);
}
