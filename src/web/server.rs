//! Form-page server: open a sheet by name, then drive it from the update
//! page. Pages are handlebars-rendered; templates ship embedded.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{Method, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Form, Router};
use handlebars::Handlebars;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::engine::LocalSheet;
use crate::error::StoreResult;
use crate::store::SsStore;
use crate::validate;
use crate::web::controller::{self, UpdateForm};

/// Web server configuration
#[derive(Clone)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8081,
        }
    }
}

#[derive(Clone)]
pub struct WebState {
    pub store: Arc<dyn SsStore>,
    pub pages: Arc<Handlebars<'static>>,
}

/// Register the embedded page templates.
pub fn pages() -> Result<Handlebars<'static>, handlebars::TemplateError> {
    let mut hb = Handlebars::new();
    hb.register_template_string(
        "spreadsheet-open",
        include_str!("../../templates/spreadsheet-open.hbs"),
    )?;
    hb.register_template_string(
        "spreadsheet-update",
        include_str!("../../templates/spreadsheet-update.hbs"),
    )?;
    hb.register_template_string("errors", include_str!("../../templates/errors.hbs"))?;
    Ok(hb)
}

pub fn router(state: WebState) -> Router {
    Router::new()
        .route("/", get(open_page).post(open_submit))
        .route("/ss/:ss_name", get(update_page).post(update_submit))
        .fallback(fallback)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Run the form-page server until SIGINT/SIGTERM.
pub async fn run_web_server(config: WebConfig, store: Arc<dyn SsStore>) -> anyhow::Result<()> {
    let state = WebState {
        store,
        pages: Arc::new(pages()?),
    };
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("spreadsheet form server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(crate::api::server::shutdown_signal())
        .await?;

    info!("form server shutdown complete");
    Ok(())
}

//==============================================================================
// Handlers
//==============================================================================

/// GET /
async fn open_page(State(state): State<WebState>) -> Response {
    render(&state, StatusCode::OK, "spreadsheet-open", &json!({}))
}

#[derive(Debug, Deserialize)]
struct OpenForm {
    #[serde(default, rename = "ssName")]
    ss_name: String,
}

/// POST /: validate the name, then move on to the update page for it.
async fn open_submit(State(state): State<WebState>, Form(form): Form<OpenForm>) -> Response {
    match validate::validate_sheet_name(&form.ss_name) {
        Ok(name) => Redirect::to(&format!("/ss/{name}")).into_response(),
        Err(message) => render(
            &state,
            StatusCode::OK,
            "spreadsheet-open",
            &json!({ "errors": [message], "ssName": form.ss_name }),
        ),
    }
}

/// GET /ss/{ssName}
async fn update_page(State(state): State<WebState>, Path(raw_name): Path<String>) -> Response {
    match open_engine(&state, &raw_name).await {
        Ok(engine) => {
            let page = controller::render_only(&engine);
            render(&state, StatusCode::OK, "spreadsheet-update", &page)
        }
        Err(err) => error_page(&state, open_failure_status(&err), &err.message()),
    }
}

/// POST /ss/{ssName}
async fn update_submit(
    State(state): State<WebState>,
    Path(raw_name): Path<String>,
    Form(form): Form<UpdateForm>,
) -> Response {
    let engine = match open_engine(&state, &raw_name).await {
        Ok(engine) => engine,
        Err(err) => return error_page(&state, open_failure_status(&err), &err.message()),
    };
    match controller::process(&engine, &form).await {
        Ok(page) => render(&state, StatusCode::OK, "spreadsheet-update", &page),
        Err(err) => {
            tracing::error!("update failed for sheet {raw_name}: {err}");
            error_page(&state, StatusCode::INTERNAL_SERVER_ERROR, &err.message())
        }
    }
}

/// Catch-all for any method/path with no route.
async fn fallback(State(state): State<WebState>, method: Method, uri: Uri) -> Response {
    error_page(
        &state,
        StatusCode::NOT_FOUND,
        &format!("{method} not supported for {uri}"),
    )
}

//==============================================================================
// Helpers
//==============================================================================

async fn open_engine(state: &WebState, raw_name: &str) -> StoreResult<LocalSheet> {
    let name = crate::types::SheetName::parse(raw_name)?;
    LocalSheet::make(name, Arc::clone(&state.store)).await
}

/// A bad name in the path is the caller's fault; anything else that stops a
/// sheet from opening is ours.
fn open_failure_status(err: &crate::error::StoreError) -> StatusCode {
    if matches!(err, crate::error::StoreError::BadRequest(_)) {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn render(
    state: &WebState,
    status: StatusCode,
    template: &str,
    data: &impl Serialize,
) -> Response {
    match state.pages.render(template, data) {
        Ok(body) => (status, Html(body)).into_response(),
        Err(err) => {
            tracing::error!("template render failure: {err}");
            (StatusCode::INTERNAL_SERVER_ERROR, "page rendering failed").into_response()
        }
    }
}

fn error_page(state: &WebState, status: StatusCode, message: &str) -> Response {
    render(state, status, "errors", &json!({ "errors": [message] }))
}
