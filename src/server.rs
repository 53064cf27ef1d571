use crate::{
    config::Config,
    errors::{into_response, AppError},
    layout::{LayoutResolver, LayoutRoot},
    render::Renderer,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub resolver: Arc<LayoutResolver>,
    pub renderer: Arc<Renderer>,
}

impl AppState {
    pub fn from_config(cfg: Config) -> anyhow::Result<Self> {
        let resolver = LayoutResolver::from_config(&cfg)?;
        let pages = LayoutRoot::new(resolver.root().dir(), resolver.root().extension())?;
        let default_layout = dunce::canonicalize(&cfg.views.default_layout)?;
        let renderer = Renderer::new(pages, default_layout, resolver.mode());
        Ok(Self { cfg: Arc::new(cfg), resolver: Arc::new(resolver), renderer: Arc::new(renderer) })
    }
}

/// The only request fields that reach rendering. Anything else in the query
/// string or body is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct RenderOptions {
    #[serde(default)]
    pub layout: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

pub async fn serve(cfg: Config) -> anyhow::Result<()> {
    let addr: std::net::SocketAddr = format!("{}:{}", cfg.server.bind_addr, cfg.server.port).parse()?;
    let shared = AppState::from_config(cfg)?;
    let app = build_router(shared);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(shared: AppState) -> Router {
    let limit_bytes = shared.cfg.server.max_request_kb * 1024;
    Router::new()
        .route("/healthz", get(health))
        .route(
            "/render/*page",
            get(render_query)
                .post(render_body)
                .layer(RequestBodyLimitLayer::new(limit_bytes)),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok", "mode": state.resolver.mode().as_str()})))
}

async fn render_query(
    State(state): State<AppState>,
    Path(page): Path<String>,
    Query(opts): Query<RenderOptions>,
) -> Response {
    render_page(&state, &page, opts, "query").await
}

async fn render_body(
    State(state): State<AppState>,
    Path(page): Path<String>,
    Json(opts): Json<RenderOptions>,
) -> Response {
    render_page(&state, &page, opts, "body").await
}

async fn render_page(state: &AppState, page: &str, opts: RenderOptions, source: &str) -> Response {
    let started = Instant::now();
    let request_id = uuid::Uuid::new_v4().to_string();

    let outcome = state.resolver.resolve(opts.layout.as_deref()).await;
    let layout_code = outcome.code();
    let layout = match outcome.into_path() {
        Ok(p) => p,
        Err(e) => {
            audit_end(&request_id, page, source, "deny", layout_code, started.elapsed().as_millis() as u64);
            return into_response(e).into_response();
        }
    };

    match state.renderer.render(page, &layout, opts.title.as_deref()).await {
        Ok(html) => {
            audit_end(&request_id, page, source, "allow", layout_code, started.elapsed().as_millis() as u64);
            (StatusCode::OK, Html(html)).into_response()
        }
        Err(e) => {
            let decision = if matches!(e, AppError::PathEscape) { "deny" } else { "error" };
            audit_end(&request_id, page, source, decision, e.code(), started.elapsed().as_millis() as u64);
            into_response(e).into_response()
        }
    }
}

fn audit_end(request_id: &str, page: &str, source: &str, decision: &str, code: &str, duration_ms: u64) {
    // page names can be attacker supplied; only their length is recorded
    tracing::info!(
        request_id = request_id,
        route = "render",
        page_len = page.len(),
        source = source,
        decision = decision,
        code = code,
        duration_ms = duration_ms,
        "audit"
    );
}
