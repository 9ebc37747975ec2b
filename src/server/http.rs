//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo for async handling. Each connection gets a
//! task; each request body is buffered up to `max_body_bytes` and routed on
//! the blocking pool, since handlers hold a SQLite connection.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::config::Args;
use crate::routes::{self, response, ApiRequest};
use crate::services::Services;
use crate::types::IdeagramError;

/// Shared application state
pub struct AppState {
    pub args: Args,
    pub services: Services,
    /// Process start, reported as uptime by the health check
    pub started_at: Instant,
}

impl AppState {
    pub fn new(args: Args, services: Services) -> Self {
        Self {
            args,
            services,
            started_at: Instant::now(),
        }
    }
}

/// Start the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<(), IdeagramError> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!("Ideagram listening on {}", state.args.listen);
    if state.args.dev_mode {
        warn!("Development mode enabled - insecure default JWT secret in use");
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new()
                        .serve_connection(io, service)
                        .await
                    {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Buffer the request and route it
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let started = Instant::now();
    let (parts, body) = req.into_parts();
    let path = parts.uri.path().to_string();
    let limit = state.args.max_body_bytes;

    let body = match Limited::new(body, limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            warn!("[{}] {} {} body over {} bytes", addr, parts.method, path, limit);
            return Ok(response::payload_too_large(limit));
        }
        Err(e) => {
            debug!("[{}] failed to read body: {}", addr, e);
            return Ok(response::error_response(IdeagramError::BadRequest(
                "Failed to read request body".into(),
            )));
        }
    };

    let api_request = ApiRequest {
        method: parts.method,
        path,
        headers: parts.headers,
        body,
    };

    let method = api_request.method.clone();
    let path = api_request.path.clone();
    let response = match tokio::task::spawn_blocking(move || {
        routes::dispatch(&state, &api_request)
    })
    .await
    {
        Ok(response) => response,
        Err(e) => {
            error!("Handler task failed: {}", e);
            response::error_response(IdeagramError::Internal("Handler failed".into()))
        }
    };

    let status = response.status();
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        warn!("[{}] {} {} -> {} ({:?})", addr, method, path, status, started.elapsed());
    } else {
        info!("[{}] {} {} -> {} ({:?})", addr, method, path, status, started.elapsed());
    }
    Ok(response)
}
