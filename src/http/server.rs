use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::{Request, State},
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::error::AppError;
use crate::event::{RenderQueue, RenderTask};
use crate::http::dump::dump_request;
use crate::state::response::ResponseWriter;
use crate::state::shared::Shared;

/// CORS handling. When `display_preflight` is off, preflight requests are
/// answered by the middleware and never reach the request log.
#[derive(Debug, Clone, Copy)]
pub struct Cors {
    pub display_preflight: bool,
}

/// Every method on every path is answered with the live response.
pub fn router(shared: Arc<Shared>, cors: Option<Cors>) -> Router {
    let app = Router::new().fallback(handle).with_state(shared);
    match cors {
        Some(cors) => app.layer(middleware::from_fn_with_state(cors, cors_layer)),
        None => app,
    }
}

/// Collects what `Response::write` emits. Headers the HTTP stack would
/// reject are skipped with a warning.
#[derive(Debug, Default)]
struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl ResponseWriter for Reply {
    fn header(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        match (HeaderName::from_bytes(key.as_bytes()), HeaderValue::from_str(value)) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => tracing::warn!(key, value, "skipping invalid response header"),
        }
        Ok(())
    }

    fn status(&mut self, status: u16) -> Result<(), AppError> {
        self.status = StatusCode::from_u16(status).map_err(|_| AppError::InvalidStatus(status.to_string()))?;
        Ok(())
    }

    fn body(&mut self, payload: &[u8]) -> Result<(), AppError> {
        self.body = payload.to_vec();
        Ok(())
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        (self.status, self.headers, self.body).into_response()
    }
}

async fn handle(State(shared): State<Arc<Shared>>, req: Request) -> Response {
    let (parts, body) = req.into_parts();
    let body = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(error = %err, "failed to read request body");
            Bytes::new()
        }
    };

    let host = parts
        .headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| parts.uri.host())
        .unwrap_or_default()
        .to_string();
    let dump = dump_request(&parts.method, &parts.uri, parts.version, &parts.headers, &body);
    shared.record_request(&host, dump);

    let resp = shared.response();
    if !resp.delay.is_zero() {
        tokio::time::sleep(resp.delay).await;
    }

    // File bodies are read from disk.
    let written = tokio::task::spawn_blocking(move || {
        let mut reply = Reply::default();
        resp.write(&mut reply).map(|()| reply)
    })
    .await;

    match written {
        Ok(Ok(reply)) => reply.into_response(),
        Ok(Err(err)) => {
            tracing::error!(error = %err, "failed to write response");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
        Err(err) => {
            tracing::error!(error = %err, "response task failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn echo(from: &HeaderMap, name: HeaderName, to: &mut HeaderMap, as_name: HeaderName) {
    if let Some(value) = from.get(&name) {
        to.insert(as_name, value.clone());
    }
}

async fn cors_layer(State(cors): State<Cors>, req: Request, next: Next) -> Response {
    let request_headers = req.headers().clone();
    let has_origin = request_headers.contains_key(header::ORIGIN);
    let preflight = req.method() == Method::OPTIONS
        && has_origin
        && request_headers.contains_key(header::ACCESS_CONTROL_REQUEST_METHOD);

    let mut resp = if preflight && !cors.display_preflight {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(req).await
    };

    if !has_origin {
        return resp;
    }
    let headers = resp.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.append(header::VARY, HeaderValue::from_static("Origin"));
    if preflight {
        echo(
            &request_headers,
            header::ACCESS_CONTROL_REQUEST_METHOD,
            headers,
            header::ACCESS_CONTROL_ALLOW_METHODS,
        );
        echo(
            &request_headers,
            header::ACCESS_CONTROL_REQUEST_HEADERS,
            headers,
            header::ACCESS_CONTROL_ALLOW_HEADERS,
        );
    }
    resp
}

/// Binds on every interface.
pub async fn bind(port: u16) -> std::io::Result<TcpListener> {
    TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], port))).await
}

/// Serves until `shutdown` fires. A server error is handed to the render
/// loop, which stops the program with it.
pub async fn serve(listener: TcpListener, app: Router, shutdown: CancellationToken, queue: RenderQueue) {
    let addr = listener.local_addr().map(|a| a.to_string()).unwrap_or_default();
    tracing::info!(%addr, "listener started");

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await;
    if let Err(err) = result {
        tracing::error!(error = %err, "listener failed");
        queue.submit(RenderTask::Abort(err.to_string()));
    }
    tracing::info!(%addr, "listener stopped");
}
