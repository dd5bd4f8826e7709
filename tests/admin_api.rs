//! Admin API behavior through the admin router.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use redirect_gateway::admin::AdminState;
use redirect_gateway::config::GatewayConfig;
use redirect_gateway::http::HttpServer;
use redirect_gateway::redirects::RedirectStore;

mod common;

const BOUNDARY: &str = "redirect-test-boundary";

async fn admin_router() -> (Router, std::sync::Arc<redirect_gateway::SqliteRedirectStore>) {
    let store = common::store().await;
    let state = AdminState::new(common::dyn_store(&store), common::API_KEY);
    let router = HttpServer::build_admin_router(&GatewayConfig::default(), state);
    (router, store)
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> axum::http::Response<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", common::API_KEY));
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    router.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
}

async fn upload(router: &Router, file_name: &str, csv: &str, fields: &[(&str, &str)]) -> axum::http::Response<Body> {
    let body = common::multipart_body(BOUNDARY, file_name, csv, fields);
    let request = Request::builder()
        .method(Method::POST)
        .uri("/admin/import")
        .header(header::AUTHORIZATION, format!("Bearer {}", common::API_KEY))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    router.clone().oneshot(request).await.unwrap()
}

#[tokio::test]
async fn test_requires_bearer_token() {
    let (router, _) = admin_router().await;

    let response = router
        .clone()
        .oneshot(Request::builder().uri("/admin/redirects").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/admin/redirects")
                .header(header::AUTHORIZATION, "Bearer wrong")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_add_reports_structured_outcomes() {
    let (router, _) = admin_router().await;

    let response = send(&router, Method::POST, "/admin/redirects", Some(json!({"old_path": "old", "new_path": "/new"}))).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = common::body_json(response).await;
    assert!(created["id"].is_i64());

    let response = send(&router, Method::POST, "/admin/redirects", Some(json!({"old_path": "/old/", "new_path": "/x"}))).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(common::body_json(response).await["error"], "duplicate");

    let response = send(&router, Method::POST, "/admin/redirects", Some(json!({"old_path": "/same", "new_path": "same/"}))).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(common::body_json(response).await["error"], "same");

    let response = send(&router, Method::POST, "/admin/redirects", Some(json!({"old_path": "/only-old"}))).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(common::body_json(response).await["error"], "empty");
}

#[tokio::test]
async fn test_update_toggle_delete_cycle() {
    let (router, store) = admin_router().await;
    let id = store.create("/old", "/new").await.unwrap();
    let uri = format!("/admin/redirects/{id}");

    let response = send(&router, Method::PUT, &uri, Some(json!({"old_path": "/renamed", "new_path": "/new"}))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(common::body_json(response).await["rule"]["old_path"], "/renamed");

    let response = send(&router, Method::POST, &format!("{uri}/toggle"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(common::body_json(response).await["active"], false);

    let response = send(&router, Method::GET, &uri, None).await;
    let rule = common::body_json(response).await;
    assert_eq!(rule["active"], false);
    assert_eq!(rule["status"], 301);

    let response = send(&router, Method::DELETE, &uri, None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&router, Method::DELETE, &uri, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(common::body_json(response).await["error"], "not_found");

    let response = send(&router, Method::PUT, &uri, Some(json!({"old_path": "/a", "new_path": "/b"}))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_and_status() {
    let (router, store) = admin_router().await;
    store.create("/one", "/1").await.unwrap();
    let id = store.create("/two", "/2").await.unwrap();
    store.toggle_active(id).await.unwrap();

    let response = send(&router, Method::GET, "/admin/redirects", None).await;
    let rules = common::body_json(response).await;
    assert_eq!(rules.as_array().unwrap().len(), 2);
    assert_eq!(rules[0]["old_path"], "/two");

    let response = send(&router, Method::GET, "/admin/status", None).await;
    let status = common::body_json(response).await;
    assert_eq!(status["redirects"], json!({"total": 2, "active": 1}));
}

#[tokio::test]
async fn test_import_upload() {
    let (router, store) = admin_router().await;
    store.create("/a", "/existing").await.unwrap();

    let csv = "path_old,path_new,status\n/a,/x,301\n/b,/y,301\n/c,/z,302\n";
    let response = upload(&router, "redirects.csv", csv, &[("skip_duplicates", "1")]).await;
    assert_eq!(response.status(), StatusCode::OK);

    let report = common::body_json(response).await;
    assert_eq!(report["imported"], 1);
    assert_eq!(report["skipped"], 2);
    assert_eq!(report["rejections"][0]["reason"], "duplicate");
    assert!(report.get("abort").is_none());
}

#[tokio::test]
async fn test_import_missing_columns_reports_abort() {
    let (router, _) = admin_router().await;

    let response = upload(&router, "redirects.csv", "path_old,status\n/a,301\n", &[]).await;
    assert_eq!(response.status(), StatusCode::OK);

    let report = common::body_json(response).await;
    assert_eq!(report["imported"], 0);
    assert_eq!(report["skipped"], 0);
    assert_eq!(report["abort"]["reason"], "missing_columns");
}

#[tokio::test]
async fn test_import_rejects_non_csv_upload() {
    let (router, _) = admin_router().await;

    let response = upload(&router, "redirects.xlsx", "path_old,path_new,status\n", &[]).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(common::body_json(response).await["error"], "filetype");
}

#[tokio::test]
async fn test_import_large_upload_with_trailing_options() {
    let (router, store) = admin_router().await;
    store.create("/stale", "/gone").await.unwrap();

    let mut csv = String::from("path_old,path_new,status\n");
    for i in 0..2000 {
        csv.push_str(&format!("/old-{i},/new-{i},301\n"));
    }
    csv.push_str("\n/last,/end,301\n");

    let response = upload(&router, "redirects.csv", &csv, &[("clear_existing", "1")]).await;
    assert_eq!(response.status(), StatusCode::OK);

    let report = common::body_json(response).await;
    assert_eq!(report["imported"], 2001);
    assert_eq!(report["skipped"], 1);
    assert_eq!(report["rejections"][0]["reason"], "blank_line");
    assert_eq!(report["rejections"][0]["line"], 2002);
    assert!(store.lookup_active("/stale").await.unwrap().is_none());
}
