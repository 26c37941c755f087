//! End-to-end tests for the list endpoints: query shaping, pagination
//! headers and the `Link` header.

mod common;

use axum::http::StatusCode;
use serde_json::Value;

use common::{SOURCES, TestApp, field, header_str, links};

fn rels(response: &axum_test::TestResponse) -> Vec<String> {
    links(response).into_iter().map(|(rel, _)| rel).collect()
}

#[tokio::test]
async fn test_sort_by_name() {
    let app = TestApp::new().await;
    app.seed_sources(&["Tech", "News", "Sports"]).await;

    let response = app.get(&format!("{}?sort=name", SOURCES)).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(field(&body, "name"), vec!["News", "Sports", "Tech"]);
    assert_eq!(header_str(&response, "x-pagination-total-count"), "3");
}

#[tokio::test]
async fn test_filter_then_page() {
    let app = TestApp::new().await;
    app.seed_sources(&["News", "Sports", "Tech"]).await;

    let response = app
        .get(&format!("{}?filter__name=e&page_size=1&page=2", SOURCES))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(field(&body, "name"), vec!["Tech"]);
    assert_eq!(header_str(&response, "x-pagination-total-count"), "2");
    assert_eq!(header_str(&response, "x-pagination-page-count"), "2");

    let target = |page| format!("{}?filter__name=e&page_size=1&page={}", SOURCES, page);
    assert_eq!(
        links(&response),
        vec![
            ("first".to_string(), target(1)),
            ("prev".to_string(), target(1)),
            ("self".to_string(), target(2)),
            ("last".to_string(), target(2)),
        ]
    );
}

#[tokio::test]
async fn test_links_target_mounted_route() {
    let app = TestApp::new().await;
    let sources = app.seed_sources(&["News"]).await;
    let posts = format!("{}{}/post/", SOURCES, sources[0].id);
    app.seed_posts(&sources[0], &[("a", 1), ("b", 2)]).await;

    let response = app.get(&format!("{}?page_size=1", posts)).await;

    let links = links(&response);
    assert_eq!(links.len(), 4);
    for (_, target) in &links {
        assert!(target.starts_with(&format!("{}?", posts)), "{}", target);
    }

    let next = &links[2].1;
    assert_eq!(next, &format!("{}?page_size=1&page=2", posts));
    let followed = app.get(next).await;
    followed.assert_status_ok();
    let body: Value = followed.json();
    assert_eq!(body.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_unlisted_filter_is_ignored() {
    let app = TestApp::new().await;
    app.seed_sources(&["Tech", "News", "Sports"]).await;

    let plain: Value = app.get(SOURCES).await.json();
    let response = app.get(&format!("{}?exact__unlisted_field=x", SOURCES)).await;

    response.assert_status_ok();
    let filtered: Value = response.json();
    assert_eq!(filtered, plain);
    assert_eq!(filtered.as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn test_over_paging() {
    let app = TestApp::new().await;
    app.seed_sources(&["Tech", "News", "Sports"]).await;

    let response = app.get(&format!("{}?page=9999&page_size=10", SOURCES)).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body, serde_json::json!([]));
    assert_eq!(header_str(&response, "x-pagination-total-count"), "3");
    assert_eq!(header_str(&response, "x-pagination-page-count"), "1");
    assert_eq!(header_str(&response, "x-pagination-current-page"), "9999");
    assert_eq!(header_str(&response, "x-pagination-per-page"), "10");
}

#[tokio::test]
async fn test_search_normalizes_dialect() {
    let app = TestApp::new().await;
    app.seed_sources(&["کتاب خانه", "News"]).await;

    let (name, value) = app.auth();
    let response = app
        .server
        .get(SOURCES)
        .add_query_param("search", "كتاب")
        .add_header(name, value)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(field(&body, "name"), vec!["کتاب خانه"]);
}

#[tokio::test]
async fn test_posts_sort_descending_then_ascending() {
    let app = TestApp::new().await;
    let source = app.seed_sources(&["News"]).await.remove(0);
    app.seed_posts(&source, &[("b", 1), ("c", 2), ("a", 2), ("d", 3)])
        .await;

    let response = app
        .get(&format!("{}{}/post/?sort=-created,%2Btitle", SOURCES, source.id))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(field(&body, "title"), vec!["d", "a", "c", "b"]);
    assert_eq!(
        header_str(&response, "x-pagination-sortable-fields"),
        "id,created,found,title,author"
    );
}

#[tokio::test]
async fn test_first_page_has_no_prev() {
    let app = TestApp::new().await;
    app.seed_sources(&["A", "B", "C"]).await;

    let response = app.get(&format!("{}?page_size=2", SOURCES)).await;

    assert_eq!(rels(&response), vec!["first", "self", "next", "last"]);
    let links = links(&response);
    assert_eq!(links[2].1, format!("{}?page_size=2&page=2", SOURCES));
}

#[tokio::test]
async fn test_pages_concatenate() {
    let app = TestApp::new().await;
    app.seed_sources(&["E", "B", "D", "A", "C"]).await;

    let mut names = Vec::new();
    for page in 1..=3 {
        let body: Value = app
            .get(&format!("{}?sort=-name&page_size=2&page={}", SOURCES, page))
            .await
            .json();
        names.extend(field(&body, "name"));
    }

    assert_eq!(names, vec!["E", "D", "C", "B", "A"]);
}

#[tokio::test]
async fn test_page_size_is_capped() {
    let app = TestApp::new().await;

    let response = app.get(&format!("{}?page_size=5000", SOURCES)).await;

    response.assert_status_ok();
    assert_eq!(header_str(&response, "x-pagination-per-page"), "100");
    assert_eq!(header_str(&response, "x-pagination-page-count"), "1");
}

#[tokio::test]
async fn test_malformed_values_never_fail() {
    let app = TestApp::new().await;
    app.seed_sources(&["Tech"]).await;

    let response = app
        .get(&format!(
            "{}?page=abc&page_size=-1&gte__interval=soon&lt__last_polled=never&sort=,,-,nope",
            SOURCES
        ))
        .await;

    response.assert_status_ok();
    assert_eq!(header_str(&response, "x-pagination-current-page"), "1");
    assert_eq!(header_str(&response, "x-pagination-per-page"), "20");
}

#[tokio::test]
async fn test_capability_headers() {
    let app = TestApp::new().await;

    let response = app.get(SOURCES).await;

    assert_eq!(
        header_str(&response, "x-pagination-filterable-fields"),
        "name,site_url,feed_url,live,interval,status_code,user.email"
    );
    assert_eq!(
        header_str(&response, "x-pagination-searchable-fields"),
        "name,description,site_url"
    );
}

#[tokio::test]
async fn test_filter_through_owner_reference() {
    let app = TestApp::new().await;
    app.seed_sources(&["Tech"]).await;

    let hit: Value = app
        .get(&format!("{}?exact__user.email=owner@example.com", SOURCES))
        .await
        .json();
    let miss: Value = app
        .get(&format!("{}?exact__user.email=someone@example.com", SOURCES))
        .await
        .json();

    assert_eq!(field(&hit, "name"), vec!["Tech"]);
    assert_eq!(miss, serde_json::json!([]));
}

#[tokio::test]
async fn test_list_is_scoped_to_caller() {
    let app = TestApp::new().await;
    app.seed_sources(&["Mine"]).await;
    let (_, token) = app.stranger().await;

    let (name, value) = common::bearer(&token);
    let response = app.server.get(SOURCES).add_header(name, value).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body, serde_json::json!([]));
}

#[tokio::test]
async fn test_posts_of_foreign_source_not_found() {
    let app = TestApp::new().await;
    let source = app.seed_sources(&["Mine"]).await.remove(0);
    let (_, token) = app.stranger().await;

    let (name, value) = common::bearer(&token);
    let response = app
        .server
        .get(&format!("{}{}/post/", SOURCES, source.id))
        .add_header(name, value)
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_without_trailing_slash() {
    let app = TestApp::new().await;
    app.seed_sources(&["Tech"]).await;

    let response = app.get("/api/v1/feed/source?sort=name").await;

    response.assert_status_ok();
    let links = links(&response);
    assert_eq!(links[0].1, "/api/v1/feed/source?sort=name&page=1");
}
