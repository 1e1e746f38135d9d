//! HTTP surface of the mock backend
//!
//! A handful of control routes live on the axum router directly; every other
//! request lands in the fallback, which hands it to the [`MockApi`] route
//! table. Requests the table does not fulfil are forwarded to the configured
//! upstream, or answered with 404.

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use parking_lot::Mutex;
use pizzamock_common::{ErrorBody, FixtureKind};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::config::MockConfig;
use crate::dispatch::{Dispatch, MockRequest};
use crate::mock::MockApi;

/// Mock server handle. Clones share the same mock state.
#[derive(Clone)]
pub struct MockServer {
    state: Arc<MockServerState>,
}

struct MockServerState {
    /// Held only for the synchronous handler body, never across an await
    api: Mutex<MockApi>,
    upstream: Option<Upstream>,
    cors: bool,
}

struct Upstream {
    base: String,
    client: reqwest::Client,
}

pub async fn serve(addr: SocketAddr, cfg: MockConfig) -> anyhow::Result<()> {
    let server = MockServer::new(&cfg)?;
    server.serve(addr).await
}

impl MockServer {
    /// Create a new mock server with fresh state
    pub fn new(cfg: &MockConfig) -> anyhow::Result<Self> {
        let api = MockApi::with_token(cfg.fixture, cfg.auth_token.clone())?;

        let upstream = match cfg.upstream_base() {
            Some(base) => Some(Upstream {
                base: base.to_string(),
                client: reqwest::Client::builder()
                    .timeout(Duration::from_secs(30))
                    .build()?,
            }),
            None => None,
        };

        for (method, pattern, name) in api.routes().describe() {
            debug!("route {:<6} {:<28} {}", method, pattern, name);
        }

        Ok(Self {
            state: Arc::new(MockServerState {
                api: Mutex::new(api),
                upstream,
                cors: cfg.cors,
            }),
        })
    }

    /// Drop all changes made through the API
    pub fn reset(&self) {
        self.state.api.lock().reset();
    }

    /// Create router
    pub fn router(&self) -> Router {
        let router = Router::new()
            .route("/health", get(health_handler))
            .route("/__mock/reset", post(reset_handler))
            .route("/__mock/session", get(session_handler))
            .route("/__mock/routes", get(routes_handler))
            .fallback(mock_handler)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone());

        if self.state.cors {
            router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
        } else {
            router
        }
    }

    /// Start the server
    pub async fn serve(self, addr: SocketAddr) -> anyhow::Result<()> {
        let listener = TcpListener::bind(addr).await?;
        self.serve_listener(listener).await
    }

    /// Serve on an already bound listener
    pub async fn serve_listener(self, listener: TcpListener) -> anyhow::Result<()> {
        let addr = listener.local_addr()?;
        {
            let api = self.state.api.lock();
            info!(
                "Mock API listening on http://{} ({} fixture, {} routes, upstream: {})",
                addr,
                api.fixture_kind(),
                api.routes().len(),
                self.state
                    .upstream
                    .as_ref()
                    .map(|u| u.base.as_str())
                    .unwrap_or("none"),
            );
        }

        axum::serve(listener, self.router()).await?;

        Ok(())
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "pizzamock-web"
    }))
}

/// Optional body for `POST /__mock/reset`
#[derive(Debug, Default, Deserialize)]
struct ResetRequest {
    #[serde(default)]
    fixture: Option<FixtureKind>,
}

async fn reset_handler(
    State(state): State<Arc<MockServerState>>,
    body: Bytes,
) -> Response {
    // An empty body keeps the current fixture; anything else must decode
    let req = if body.iter().all(u8::is_ascii_whitespace) {
        ResetRequest::default()
    } else {
        match serde_json::from_slice::<ResetRequest>(&body) {
            Ok(req) => req,
            Err(e) => {
                warn!("rejected reset body: {}", e);
                let error = ErrorBody {
                    error: format!("invalid reset body: {}", e),
                };
                return (StatusCode::BAD_REQUEST, Json(error)).into_response();
            }
        }
    };
    let fixture = {
        let mut api = state.api.lock();
        match req.fixture {
            Some(kind) => api.reset_to(kind),
            None => api.reset(),
        }
        api.fixture_kind()
    };
    Json(serde_json::json!({
        "status": "reset",
        "fixture": fixture
    }))
    .into_response()
}

async fn session_handler(State(state): State<Arc<MockServerState>>) -> impl IntoResponse {
    let api = state.api.lock();
    Json(serde_json::json!({ "user": api.current_user() }))
}

async fn routes_handler(State(state): State<Arc<MockServerState>>) -> impl IntoResponse {
    let routes: Vec<_> = state
        .api
        .lock()
        .routes()
        .describe()
        .into_iter()
        .map(|(method, pattern, name)| {
            serde_json::json!({
                "method": method.as_str(),
                "pattern": pattern,
                "name": name
            })
        })
        .collect();
    Json(routes)
}

async fn mock_handler(
    State(state): State<Arc<MockServerState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = MockRequest::from_parts(method, uri.path(), uri.query(), &body);
    let outcome = state.api.lock().handle(&request);

    match outcome {
        Dispatch::Fulfilled { response, .. } => {
            (response.status, Json(response.body)).into_response()
        }
        Dispatch::Passthrough => match &state.upstream {
            Some(upstream) => forward(upstream, request.method, &uri, &headers, body).await,
            None => not_found_handler().await.into_response(),
        },
    }
}

/// Proxy an unmocked request to the upstream backend
async fn forward(
    upstream: &Upstream,
    method: Method,
    uri: &Uri,
    headers: &HeaderMap,
    body: Bytes,
) -> Response {
    let path_and_query = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");
    let url = format!("{}{}", upstream.base, path_and_query);
    debug!("forwarding {} {}", method, url);

    let mut builder = upstream.client.request(method, &url).body(body);
    for name in [header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT] {
        if let Some(value) = headers.get(&name) {
            builder = builder.header(name, value.clone());
        }
    }

    let resp = match builder.send().await {
        Ok(resp) => resp,
        Err(e) => {
            warn!("upstream request to {} failed: {}", url, e);
            return (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({"error": format!("upstream: {}", e)})),
            )
                .into_response();
        }
    };

    let status = resp.status();
    let content_type = resp.headers().get(header::CONTENT_TYPE).cloned();
    let bytes = match resp.bytes().await {
        Ok(b) => b,
        Err(e) => {
            warn!("upstream body from {} failed: {}", url, e);
            return (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({"error": format!("upstream: {}", e)})),
            )
                .into_response();
        }
    };

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    if let Some(ct) = content_type {
        response.headers_mut().insert(header::CONTENT_TYPE, ct);
    }
    response
}

async fn not_found_handler() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not found")
}
