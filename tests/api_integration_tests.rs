//! Integration Tests for API Endpoints
//!
//! Runs the badge router against a fake GitHub API served from an ephemeral
//! local port.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use base64::Engine;
use serde_json::{json, Value};
use tower::ServiceExt;
use wordbadge::{
    api::create_router,
    cache::CacheStore,
    github::GithubClient,
    wordcount::{CountSettings, WordCounter},
    AppState,
};

const TOKEN: &str = "test-token";

// == Fake GitHub ==

#[derive(Clone)]
struct FakeGithub {
    base: String,
    requests: Arc<AtomicUsize>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(format!("Token {TOKEN}").as_str())
}

async fn root_tree(
    State(fake): State<FakeGithub>,
    headers: HeaderMap,
    Path((_user, repo, _branch)): Path<(String, String, String)>,
) -> Response {
    fake.requests.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let readme = json!({"path": "README.md", "type": "blob", "url": format!("{}/blobs/readme", fake.base)});
    match repo.as_str() {
        "novel" => Json(json!({"tree": [
            readme,
            {"path": "ch", "type": "tree", "url": format!("{}/trees/ch", fake.base)}
        ]}))
        .into_response(),
        // Relative URL resolving to the same chapter tree
        "sequel" => Json(json!({"tree": [
            {"path": "ch", "type": "tree", "url": "/trees/ch"}
        ]}))
        .into_response(),
        "flat" => Json(json!({"tree": [readme]})).into_response(),
        _ => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn chapter_tree(State(fake): State<FakeGithub>, headers: HeaderMap) -> Response {
    fake.requests.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    Json(json!({"tree": [
        {"path": "01.mkd", "type": "blob", "url": format!("{}/blobs/one", fake.base)},
        {"path": "02.mkd", "type": "blob", "url": format!("{}/blobs/two", fake.base)},
        {"path": "notes.txt", "type": "blob", "url": format!("{}/blobs/notes", fake.base)}
    ]}))
    .into_response()
}

async fn blob(
    State(fake): State<FakeGithub>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    fake.requests.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let text = match id.as_str() {
        "one" => "hello, world",
        "two" => "don't break the build",
        "notes" => "these words are never counted",
        _ => return StatusCode::NOT_FOUND.into_response(),
    };
    let encoded = base64::engine::general_purpose::STANDARD.encode(text);
    // Wrap like GitHub does
    let (head, tail) = encoded.split_at(encoded.len() / 2);

    Json(json!({"encoding": "base64", "content": format!("{head}\n{tail}\n")})).into_response()
}

async fn spawn_fake_github() -> FakeGithub {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let fake = FakeGithub {
        base: format!("http://{}", listener.local_addr().unwrap()),
        requests: Arc::new(AtomicUsize::new(0)),
    };

    let app = Router::new()
        .route("/repos/:user/:repo/git/trees/:branch", get(root_tree))
        .route("/trees/ch", get(chapter_tree))
        .route("/blobs/:id", get(blob))
        .with_state(fake.clone());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    fake
}

// == Helper Functions ==

fn create_test_app(fake: &FakeGithub, token: &str) -> Router {
    let cache = CacheStore::<Value>::new(100, None).into_shared();
    let github =
        GithubClient::new(&fake.base, token, Duration::from_secs(5), cache.clone()).unwrap();
    let counter =
        WordCounter::new(Arc::new(github), CountSettings::default(), cache.clone()).unwrap();
    create_router(AppState::new(cache, counter))
}

async fn get_response(app: &Router, uri: &str) -> Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// == Badge Endpoint Tests ==

#[tokio::test]
async fn test_badge_counts_selected_files() {
    let fake = spawn_fake_github().await;
    let app = create_test_app(&fake, TOKEN);

    let response = get_response(&app, "/octocat/novel.svg").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/svg+xml");
    let svg = body_to_string(response.into_body()).await;
    // 2 + 4 words; notes.txt is skipped
    assert!(svg.contains(">6 words<"), "unexpected badge: {svg}");
    assert!(svg.contains("of 50000"));
}

#[tokio::test]
async fn test_repeat_badge_served_from_cache() {
    let fake = spawn_fake_github().await;
    let app = create_test_app(&fake, TOKEN);

    let first = body_to_string(get_response(&app, "/octocat/novel.svg").await.into_body()).await;
    // Root tree, chapter tree, two blobs
    assert_eq!(fake.requests.load(Ordering::SeqCst), 4);

    let second = body_to_string(get_response(&app, "/octocat/novel.svg").await.into_body()).await;
    assert_eq!(first, second);
    assert_eq!(fake.requests.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_outer_miss_reuses_inner_hits() {
    let fake = spawn_fake_github().await;
    let app = create_test_app(&fake, TOKEN);

    get_response(&app, "/octocat/novel.svg").await;
    assert_eq!(fake.requests.load(Ordering::SeqCst), 4);

    // New word-count key, but the chapter tree and blobs are already cached
    let response = get_response(&app, "/octocat/sequel.svg").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(fake.requests.load(Ordering::SeqCst), 5);

    let svg = body_to_string(response.into_body()).await;
    assert!(svg.contains(">6 words<"));
}

#[tokio::test]
async fn test_missing_chapter_dir_is_not_found() {
    let fake = spawn_fake_github().await;
    let app = create_test_app(&fake, TOKEN);

    let response = get_response(&app, "/octocat/flat.svg").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("'ch'"));
}

#[tokio::test]
async fn test_upstream_failure_is_retried() {
    let fake = spawn_fake_github().await;
    let app = create_test_app(&fake, TOKEN);

    let response = get_response(&app, "/octocat/broken.svg").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(fake.requests.load(Ordering::SeqCst), 1);

    let response = get_response(&app, "/octocat/broken.svg").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(fake.requests.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_bad_token_surfaces_as_bad_gateway() {
    let fake = spawn_fake_github().await;
    let app = create_test_app(&fake, "wrong-token");

    let response = get_response(&app, "/octocat/novel.svg").await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("401"));
}

// == Stats Endpoint Tests ==

#[tokio::test]
async fn test_stats_reflect_cache_activity() {
    let fake = spawn_fake_github().await;
    let app = create_test_app(&fake, TOKEN);

    get_response(&app, "/octocat/novel.svg").await;
    get_response(&app, "/octocat/novel.svg").await;

    let response = get_response(&app, "/stats").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    // Word count + root tree + chapter tree + two blobs
    assert_eq!(json["total_entries"], 5);
    // Second badge request is the only hit
    assert_eq!(json["hits"], 1);
    assert_eq!(json["misses"], 5);
    assert_eq!(json["evictions"], 0);
}

#[tokio::test]
async fn test_small_cache_evicts_and_refetches() {
    let fake = spawn_fake_github().await;
    let cache = CacheStore::<Value>::new(2, None).into_shared();
    let github =
        GithubClient::new(&fake.base, TOKEN, Duration::from_secs(5), cache.clone()).unwrap();
    let counter =
        WordCounter::new(Arc::new(github), CountSettings::default(), cache.clone()).unwrap();
    let app = create_router(AppState::new(cache.clone(), counter));

    let response = get_response(&app, "/octocat/novel.svg").await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(fake.requests.load(Ordering::SeqCst), 4);
    {
        let store = cache.read().await;
        assert_eq!(store.len(), 2);
        assert_eq!(store.stats().evictions, 3);
    }

    // Shares the chapter tree and blobs with novel, but those were evicted,
    // so everything is fetched again (a roomy cache would need one request)
    let response = get_response(&app, "/octocat/sequel.svg").await;
    assert_eq!(response.status(), StatusCode::OK);
    let svg = body_to_string(response.into_body()).await;
    assert!(svg.contains(">6 words<"));
    assert_eq!(fake.requests.load(Ordering::SeqCst), 8);

    let store = cache.read().await;
    assert_eq!(store.len(), 2);
    assert_eq!(store.stats().evictions, 8);
}

// == Health Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let fake = spawn_fake_github().await;
    let app = create_test_app(&fake, TOKEN);

    let response = get_response(&app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
}
