//! Form-page server tests: open flow, update flow, error echo.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

use sheetstore::store::MemStore;
use sheetstore::web::server::{pages, router, WebState};

fn app() -> axum::Router {
    router(WebState {
        store: Arc::new(MemStore::new()),
        pages: Arc::new(pages().unwrap()),
    })
}

fn form_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &axum::Router, req: Request<Body>) -> (StatusCode, String, Option<String>) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap(), location)
}

async fn get(app: &axum::Router, uri: &str) -> (StatusCode, String) {
    let (status, body, _) = send(
        app,
        Request::builder().uri(uri).body(Body::empty()).unwrap(),
    )
    .await;
    (status, body)
}

#[tokio::test]
async fn open_page_renders_the_name_form() {
    let app = app();
    let (status, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Open Spreadsheet Name"));
    assert!(body.contains("name=\"ssName\""));
}

#[tokio::test]
async fn valid_name_redirects_to_the_update_page() {
    let app = app();
    let (status, _, location) = send(&app, form_request("/", "ssName=sheet1")).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/ss/sheet1"));
}

#[tokio::test]
async fn invalid_name_re_renders_with_error_and_typed_value() {
    let app = app();
    let (status, body, _) = send(&app, form_request("/", "ssName=bad%2Fname")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Bad spreadsheet name"));
    assert!(body.contains("value=\"bad/name\""));

    let (_, body, _) = send(&app, form_request("/", "ssName=")).await;
    assert!(body.contains("must be specified"));
}

#[tokio::test]
async fn update_page_renders_the_minimum_grid() {
    let app = app();
    let (status, body) = get(&app, "/ss/grid1").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<h1>grid1</h1>"));
    // Column headers A..J for the 10x10 minimum grid.
    assert!(body.contains("<th>A</th>"));
    assert!(body.contains("<th>J</th>"));
    assert!(!body.contains("<th>K</th>"));
}

#[tokio::test]
async fn update_action_applies_and_persists_across_requests() {
    let app = app();
    let (status, body, _) = send(
        &app,
        form_request("/ss/s1", "ssAct=updateCell&cellId=a1&formula=4"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<td>4</td>"));

    // The same store backs the next request.
    let (_, body) = get(&app, "/ss/s1").await;
    assert!(body.contains("<td>4</td>"));
}

#[tokio::test]
async fn validation_failure_echoes_values_and_selected_action() {
    let app = app();
    let (status, body, _) = send(
        &app,
        form_request("/ss/s1", "ssAct=deleteCell&cellId=+a1+&formula=9"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("must not be specified for Delete Cell action"));
    // Untrimmed values and the chosen radio come back.
    assert!(body.contains("value=\" a1 \""));
    assert!(body.contains("value=\"9\""));
    let delete_radio = body
        .split("value=\"deleteCell\"")
        .nth(1)
        .expect("delete radio rendered");
    assert!(delete_radio[..40].contains("checked"));
}

#[tokio::test]
async fn formula_syntax_error_is_attached_to_the_formula_field() {
    let app = app();
    let (status, body, _) = send(
        &app,
        form_request("/ss/s1", "ssAct=updateCell&cellId=a1&formula=gibberish"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("syntax error"));
    // The failed formula was not applied.
    assert!(!body.contains("<td>gibberish</td>"));
}

#[tokio::test]
async fn clear_action_empties_the_grid() {
    let app = app();
    send(&app, form_request("/ss/s1", "ssAct=updateCell&cellId=a1&formula=4")).await;
    let (_, body, _) = send(&app, form_request("/ss/s1", "ssAct=clear")).await;
    assert!(!body.contains("<td>4</td>"));
}

#[tokio::test]
async fn unknown_routes_render_the_error_page() {
    let app = app();
    let (status, body) = get(&app, "/nope/nothing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("not supported for"));
}

#[tokio::test]
async fn bad_sheet_name_in_path_renders_the_error_page() {
    let app = app();
    let (status, body) = get(&app, "/ss/bad!name").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("bad spreadsheet name"));
}
