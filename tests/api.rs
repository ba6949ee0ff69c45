use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use serde_json::{Value, json};

use roster::resource::{self, Collection, Pagination, ResourceNames, ResourceService};
use roster::{Request, Response, Router};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn app(collection: Collection) -> Router<ResourceService> {
    let service = ResourceService::new(
        ResourceNames::new("users", "User"),
        Pagination::default(),
        collection,
    );
    resource::routes("/api/v1", service)
}

fn seeded() -> Router<ResourceService> {
    app(Collection::seeded(["John Doe", "Jane Doe"]))
}

async fn send(app: &Router<ResourceService>, method: &str, uri: &str, body: Option<Value>) -> Response {
    let mut builder = http::Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            builder = builder.header("content-type", "application/json");
            Bytes::from(v.to_string())
        }
        None => Bytes::new(),
    };
    app.handle(Request::from_http(builder.body(body).unwrap())).await
}

fn json(res: &Response) -> Value {
    serde_json::from_slice(res.body()).unwrap()
}

// ── Scenario ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn users_walkthrough() {
    let app = seeded();

    let res = send(&app, "POST", "/api/v1/users", Some(json!({"name": "Ann"}))).await;
    assert_eq!(res.status_code(), StatusCode::CREATED);
    assert_eq!(json(&res), json!({"id": 3, "name": "Ann"}));
    assert_eq!(res.header("location"), Some("/api/v1/users/3"));

    let res = send(&app, "GET", "/api/v1/users", None).await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(
        json(&res),
        json!([
            {"id": 1, "name": "John Doe"},
            {"id": 2, "name": "Jane Doe"},
            {"id": 3, "name": "Ann"},
        ])
    );

    let res = send(&app, "PUT", "/api/v1/users/2", Some(json!({"name": "Janet"}))).await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(json(&res), json!({"id": 2, "name": "Janet"}));

    let res = send(&app, "DELETE", "/api/v1/users/1", None).await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(json(&res), json!({"id": 1, "name": "John Doe"}));

    let res = send(&app, "GET", "/api/v1/users/1", None).await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(json(&res), json!({"error": "User not found", "status": 404}));
}

// ── Create ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_without_name_is_rejected_and_changes_nothing() {
    let app = seeded();

    for body in [Some(json!({})), Some(json!({"name": ""})), Some(json!({"name": "  "})), None] {
        let res = send(&app, "POST", "/api/v1/users", body).await;
        assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
        assert!(json(&res)["error"].as_str().unwrap().starts_with("name"));
    }

    let res = send(&app, "GET", "/api/v1/users", None).await;
    assert_eq!(res.header("x-total-count"), Some("2"));
}

#[tokio::test]
async fn create_requires_json_content_type() {
    let app = seeded();
    let req = http::Request::builder()
        .method("POST")
        .uri("/api/v1/users")
        .header("content-type", "text/plain")
        .body(Bytes::from_static(br#"{"name":"Ann"}"#))
        .unwrap();

    let res = app.handle(Request::from_http(req)).await;
    assert_eq!(res.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let app = seeded();
    let req = http::Request::builder()
        .method("POST")
        .uri("/api/v1/users")
        .header("content-type", "application/json")
        .body(Bytes::from_static(b"{\"name\":"))
        .unwrap();

    let res = app.handle(Request::from_http(req)).await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);

    let res = send(&app, "POST", "/api/v1/users", Some(json!({"name": 42}))).await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn non_object_json_is_bad_request() {
    let app = seeded();
    for body in [json!(["Ann"]), json!("Ann"), json!(null), json!(3)] {
        let res = send(&app, "POST", "/api/v1/users", Some(body.clone())).await;
        assert_eq!(res.status_code(), StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(json(&res)["error"], "JSON body must be an object");
    }

    let res = send(&app, "PATCH", "/api/v1/users/1", Some(json!(["Ann"]))).await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);

    let res = send(&app, "GET", "/api/v1/users", None).await;
    assert_eq!(res.header("x-total-count"), Some("2"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_get_distinct_consecutive_ids() {
    let app = Arc::new(seeded());
    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..50 {
        let app = Arc::clone(&app);
        tasks.spawn(async move {
            let body = json!({"name": format!("user{i}")});
            let res = send(&app, "POST", "/api/v1/users", Some(body)).await;
            assert_eq!(res.status_code(), StatusCode::CREATED);
            json(&res)["id"].as_u64().unwrap()
        });
    }

    let mut ids = Vec::new();
    while let Some(id) = tasks.join_next().await {
        ids.push(id.unwrap());
    }
    ids.sort_unstable();
    assert_eq!(ids, (3..=52).collect::<Vec<u64>>());

    let res = send(&app, "GET", "/api/v1/users?limit=1", None).await;
    assert_eq!(res.header("x-total-count"), Some("52"));
}

#[tokio::test]
async fn ids_are_not_reused_after_deleting_the_newest() {
    let app = seeded();
    send(&app, "DELETE", "/api/v1/users/2", None).await;

    let res = send(&app, "POST", "/api/v1/users", Some(json!({"name": "Ann"}))).await;
    assert_eq!(json(&res)["id"], 3);
}

#[tokio::test]
async fn client_supplied_id_is_ignored() {
    let app = seeded();
    let res = send(&app, "POST", "/api/v1/users", Some(json!({"id": 99, "name": "Ann"}))).await;
    assert_eq!(json(&res), json!({"id": 3, "name": "Ann"}));

    let res = send(&app, "PUT", "/api/v1/users/3", Some(json!({"id": 1, "name": "Anne"}))).await;
    assert_eq!(json(&res), json!({"id": 3, "name": "Anne"}));
}

// ── Read / update / delete ────────────────────────────────────────────────────

#[tokio::test]
async fn get_returns_the_record() {
    let app = seeded();
    let res = send(&app, "GET", "/api/v1/users/2", None).await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(json(&res), json!({"id": 2, "name": "Jane Doe"}));
}

#[tokio::test]
async fn non_numeric_id_is_not_found() {
    let app = seeded();
    let res = send(&app, "GET", "/api/v1/users/abc", None).await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(json(&res)["error"], "User not found");
}

#[tokio::test]
async fn missing_record_is_not_found_for_every_member_method() {
    let app = seeded();
    let body = Some(json!({"name": "x"}));
    for method in ["GET", "PUT", "PATCH", "DELETE"] {
        let res = send(&app, method, "/api/v1/users/42", body.clone()).await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND, "{method}");
    }
}

#[tokio::test]
async fn put_requires_a_name() {
    let app = seeded();
    let res = send(&app, "PUT", "/api/v1/users/1", Some(json!({}))).await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn patch_changes_only_provided_fields() {
    let app = seeded();

    let res = send(&app, "PATCH", "/api/v1/users/1", Some(json!({}))).await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(json(&res), json!({"id": 1, "name": "John Doe"}));

    let res = send(&app, "PATCH", "/api/v1/users/1", Some(json!({"name": "Johnny"}))).await;
    assert_eq!(json(&res), json!({"id": 1, "name": "Johnny"}));

    let res = send(&app, "PATCH", "/api/v1/users/1", Some(json!({"name": ""}))).await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn put_and_delete_are_idempotent() {
    let app = seeded();
    for _ in 0..2 {
        let res = send(&app, "PUT", "/api/v1/users/1", Some(json!({"name": "Jo"}))).await;
        assert_eq!(json(&res), json!({"id": 1, "name": "Jo"}));
    }

    assert_eq!(send(&app, "DELETE", "/api/v1/users/1", None).await.status_code(), StatusCode::OK);
    assert_eq!(send(&app, "DELETE", "/api/v1/users/1", None).await.status_code(), StatusCode::NOT_FOUND);

    let res = send(&app, "GET", "/api/v1/users", None).await;
    assert_eq!(json(&res), json!([{"id": 2, "name": "Jane Doe"}]));
}

// ── List ──────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_paginates_filters_and_sorts() {
    let app = app(Collection::seeded(["eve", "bob", "dan", "amy", "bob"]));

    let res = send(&app, "GET", "/api/v1/users?page=2&limit=2", None).await;
    assert_eq!(json(&res), json!([{"id": 3, "name": "dan"}, {"id": 4, "name": "amy"}]));
    assert_eq!(res.header("x-total-count"), Some("5"));

    let res = send(&app, "GET", "/api/v1/users?sort=name&limit=3", None).await;
    assert_eq!(
        json(&res),
        json!([{"id": 4, "name": "amy"}, {"id": 2, "name": "bob"}, {"id": 5, "name": "bob"}])
    );

    let res = send(&app, "GET", "/api/v1/users?name=bob&sort=-id", None).await;
    assert_eq!(json(&res), json!([{"id": 5, "name": "bob"}, {"id": 2, "name": "bob"}]));
    assert_eq!(res.header("x-total-count"), Some("2"));

    let res = send(&app, "GET", "/api/v1/users?id=3", None).await;
    assert_eq!(json(&res), json!([{"id": 3, "name": "dan"}]));
}

#[tokio::test]
async fn list_past_the_end_is_empty() {
    let app = seeded();
    let res = send(&app, "GET", "/api/v1/users?page=9", None).await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(json(&res), json!([]));
}

#[tokio::test]
async fn list_pages_concatenate_to_the_whole() {
    let names: Vec<String> = (0..23).map(|i| format!("user{:02}", (i * 7) % 23)).collect();
    let app = app(Collection::seeded(names));

    let all = json(&send(&app, "GET", "/api/v1/users?sort=name&limit=100", None).await);
    let all = all.as_array().unwrap().clone();
    assert_eq!(all.len(), 23);

    for limit in [1, 4, 10, 23, 30] {
        let mut joined = Vec::new();
        let mut page = 1;
        loop {
            let uri = format!("/api/v1/users?sort=name&limit={limit}&page={page}");
            let chunk = json(&send(&app, "GET", &uri, None).await);
            let chunk = chunk.as_array().unwrap();
            if chunk.is_empty() {
                break;
            }
            joined.extend(chunk.iter().cloned());
            page += 1;
        }
        assert_eq!(joined, all, "limit {limit}");
    }
}

#[tokio::test]
async fn filter_on_unknown_field_matches_nothing() {
    let app = seeded();
    let res = send(&app, "GET", "/api/v1/users?email=a", None).await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(json(&res), json!([]));
    assert_eq!(res.header("x-total-count"), Some("0"));
}

#[tokio::test]
async fn sort_on_unknown_field_keeps_insertion_order() {
    let app = app(Collection::seeded(["eve", "bob"]));
    let res = send(&app, "GET", "/api/v1/users?sort=-age", None).await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(json(&res), json!([{"id": 1, "name": "eve"}, {"id": 2, "name": "bob"}]));
}

#[tokio::test]
async fn oversized_limit_is_capped() {
    let names: Vec<String> = (0..120).map(|i| format!("user{i}")).collect();
    let app = app(Collection::seeded(names));
    let res = send(&app, "GET", "/api/v1/users?limit=1000", None).await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(json(&res).as_array().unwrap().len(), 100);
    assert_eq!(res.header("x-total-count"), Some("120"));
}

#[tokio::test]
async fn bad_list_parameters_are_bad_requests() {
    let app = seeded();
    for query in ["page=0", "limit=0", "page=x", "limit=-1"] {
        let res = send(&app, "GET", &format!("/api/v1/users?{query}"), None).await;
        assert_eq!(res.status_code(), StatusCode::BAD_REQUEST, "{query}");
        assert!(json(&res)["error"].is_string());
    }
}

// ── Routing ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn unversioned_path_is_not_routed() {
    let app = seeded();
    let res = send(&app, "GET", "/users", None).await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(json(&res)["error"], "Route not found");
}

#[tokio::test]
async fn unsupported_method_on_collection_is_405() {
    let app = seeded();
    let res = send(&app, "DELETE", "/api/v1/users", None).await;
    assert_eq!(res.status_code(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.header("allow"), Some("GET, HEAD, POST"));

    let res = send(&app, "PROPFIND", "/api/v1/users", None).await;
    assert_eq!(res.status_code(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.header("allow"), Some("GET, HEAD, POST"));
}

#[tokio::test]
async fn head_mirrors_get_without_a_body() {
    let app = seeded();
    let res = send(&app, "HEAD", "/api/v1/users", None).await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(res.header("x-total-count"), Some("2"));
    assert!(res.body().is_empty());

    let res = send(&app, "HEAD", "/api/v1/users/9", None).await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    assert!(res.body().is_empty());
}

#[tokio::test]
async fn health_probes_answer() {
    let app = app(Collection::new());
    let res = send(&app, "GET", "/healthz", None).await;
    assert_eq!(json(&res), json!({"status": "ok"}));
    let res = send(&app, "GET", "/readyz", None).await;
    assert_eq!(json(&res), json!({"status": "ready"}));
}

#[tokio::test]
async fn custom_prefix_and_resource_name() {
    let service = ResourceService::new(
        ResourceNames::new("books", "Book"),
        Pagination::default(),
        Collection::new(),
    );
    let app = resource::routes("/api/v2/", service);

    let res = send(&app, "POST", "/api/v2/books", Some(json!({"name": "Dune"}))).await;
    assert_eq!(res.status_code(), StatusCode::CREATED);
    assert_eq!(res.header("location"), Some("/api/v2/books/1"));

    let res = send(&app, "GET", "/api/v2/books/9", None).await;
    assert_eq!(json(&res)["error"], "Book not found");
}
