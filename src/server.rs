use crate::{
    config::Config,
    errors::{into_response, AppError},
    mcp::{
        registry::{CallRequest, CallResponse, ToolRegistry},
        types::{Capabilities, ToolInfo},
    },
    transport,
};
use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub registry: Arc<ToolRegistry>,
    pub base_dir: Arc<PathBuf>,
}

pub type StreamBody = Body;

pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let addr = format!("{}:{}", state.cfg.server.bind_addr, state.cfg.server.port);
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(shared: AppState) -> Router {
    let base = shared.cfg.server.base_path.clone();
    Router::new()
        .route("/healthz", get(health))
        .route(&format!("{base}/capabilities"), get(capabilities))
        .route(&format!("{base}/call"), post(call))
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}

async fn health(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    match authorize(&state, &headers) {
        Ok(()) => (StatusCode::OK, Json(json!({"status":"ok"}))).into_response(),
        Err(e) => into_response(e).into_response(),
    }
}

async fn capabilities(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Err(e) = authorize(&state, &headers) {
        return into_response(e).into_response();
    }
    let tools: Vec<ToolInfo> = state
        .registry
        .list_names()
        .into_iter()
        .filter_map(|n| {
            let caps = state.registry.get(&n)?.capabilities();
            Some(ToolInfo {
                name: n,
                input_schema: caps["input"].clone(),
                output_schema: caps["output"].clone(),
            })
        })
        .collect();
    let caps = Capabilities {
        mcp_version: "1.0",
        base_dir: state.base_dir.to_string_lossy().into_owned(),
        tools,
        streaming: true,
    };
    (StatusCode::OK, Json(caps)).into_response()
}

struct Audit {
    request_id: String,
    origin: String,
    token_present: bool,
    tool: String,
    started: Instant,
}

impl Audit {
    fn end(&self, decision: &str, code: &str, streaming: bool) {
        tracing::info!(
            request_id = %self.request_id,
            origin = %self.origin,
            token_present = self.token_present,
            tool = %self.tool,
            decision = decision,
            code = code,
            duration_ms = self.started.elapsed().as_millis() as u64,
            streaming = streaming,
            "audit"
        );
    }
}

async fn call(State(state): State<AppState>, headers: HeaderMap, body: Body) -> Response {
    let mut audit = Audit {
        request_id: uuid::Uuid::new_v4().to_string(),
        origin: transport::origin(&headers).unwrap_or("").to_string(),
        token_present: transport::bearer_token(&headers).is_some(),
        tool: "-".to_string(),
        started: Instant::now(),
    };

    let max_request_kb = state.cfg.limits.max_request_kb;
    let admitted = authorize(&state, &headers)
        .and_then(|()| transport::content_length_ok(&headers, max_request_kb));
    if let Err(e) = admitted {
        audit.end("deny", e.code(), false);
        return into_response(e).into_response();
    }

    let req = match read_call(body, max_request_kb * 1024).await {
        Ok(req) => req,
        Err(e) => {
            audit.end("deny", e.code(), false);
            return into_response(e).into_response();
        }
    };
    audit.tool = req.tool.clone();

    let Some(tool) = state.registry.get(&req.tool) else {
        let e = AppError::NotFound(format!("tool {}", req.tool));
        audit.end("deny", e.code(), req.stream);
        return into_response(e).into_response();
    };

    if req.stream {
        return match tool.call_stream(req.params).await {
            Ok(body) => (
                StatusCode::OK,
                [(axum::http::header::CONTENT_TYPE, "application/x-ndjson")],
                audited_stream(body, audit),
            )
                .into_response(),
            Err(e) => {
                audit.end("error", e.code(), true);
                into_response(e).into_response()
            }
        };
    }

    match tool.call(req.params).await {
        Ok(result) => {
            audit.end("allow", "OK", false);
            let body = CallResponse { id: req.id, result: Some(result), error: None };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            audit.end("error", e.code(), false);
            let body = CallResponse { id: req.id, result: None, error: Some((&e).into()) };
            (e.status(), Json(body)).into_response()
        }
    }
}

/// Buffers at most `limit` bytes of the body, then decodes the call.
async fn read_call(body: Body, limit: usize) -> Result<CallRequest, AppError> {
    let bytes = axum::body::to_bytes(body, limit)
        .await
        .map_err(|_| AppError::RequestTooLarge)?;
    serde_json::from_slice(&bytes).map_err(|e| AppError::InvalidRequest(e.to_string()))
}

/// Owns the audit record of a streamed call and emits it once the body is
/// dropped, either fully sent or abandoned by the client.
struct StreamAudit {
    audit: Audit,
    saw_end: bool,
    saw_error: bool,
}

impl StreamAudit {
    fn new(audit: Audit) -> Self {
        Self { audit, saw_end: false, saw_error: false }
    }

    fn observe(&mut self, frame: &[u8]) {
        if contains(frame, br#""event":"end""#) {
            self.saw_end = true;
        }
        if contains(frame, br#""event":"error""#) {
            self.saw_error = true;
        }
    }

    fn outcome(&self) -> (&'static str, &'static str) {
        if self.saw_error {
            ("error", "StreamError")
        } else if self.saw_end {
            ("allow", "OK")
        } else {
            ("error", "Incomplete")
        }
    }
}

impl Drop for StreamAudit {
    fn drop(&mut self) {
        let (decision, code) = self.outcome();
        self.audit.end(decision, code, true);
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

fn audited_stream(body: Body, audit: Audit) -> Body {
    use futures::StreamExt;
    let mut guard = StreamAudit::new(audit);
    Body::from_stream(body.into_data_stream().map(move |frame| {
        if let Ok(bytes) = &frame {
            guard.observe(bytes);
        }
        frame
    }))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    transport::require_bearer(headers, &state.cfg.auth.bearer_token)?;
    transport::check_origin(headers, &state.cfg.auth.allowed_origins)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard() -> StreamAudit {
        StreamAudit::new(Audit {
            request_id: "r".to_string(),
            origin: String::new(),
            token_present: true,
            tool: "fs_read".to_string(),
            started: Instant::now(),
        })
    }

    #[test]
    fn completed_stream_is_allowed() {
        let mut g = guard();
        g.observe(br#"{"canonical_path":"/ws/a","event":"start","tool":"fs_read"}"#);
        assert_eq!(g.outcome(), ("error", "Incomplete"));
        g.observe(br#"{"event":"end","result":{"bytes":3}}"#);
        assert_eq!(g.outcome(), ("allow", "OK"));
    }

    #[test]
    fn stream_error_event_is_recorded() {
        let mut g = guard();
        g.observe(br#"{"error":{"code":"FileTooLarge","message":"x"},"event":"error"}"#);
        assert_eq!(g.outcome(), ("error", "StreamError"));
    }

    #[test]
    fn escaped_path_text_does_not_count_as_end() {
        let mut g = guard();
        g.observe(br#"{"canonical_path":"/ws/\"event\":\"end\"","event":"start"}"#);
        assert_eq!(g.outcome(), ("error", "Incomplete"));
    }
}
