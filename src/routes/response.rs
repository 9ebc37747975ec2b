//! HTTP response building helpers
//!
//! Every handler answers through these so JSON bodies, CORS headers and
//! error shapes stay the same across routes.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{header, Response, StatusCode};
use serde::Serialize;
use tracing::error;

use crate::types::IdeagramError;

/// Result type for route handlers
pub type HandlerResult = Result<Response<Full<Bytes>>, IdeagramError>;

fn build(status: StatusCode, content_type: Option<&str>, body: Bytes) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    if let Some(content_type) = content_type {
        if let Ok(value) = header::HeaderValue::from_str(content_type) {
            headers.insert(header::CONTENT_TYPE, value);
        }
    }
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        header::HeaderValue::from_static("*"),
    );
    response
}

/// Build a JSON response with the given status code
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    match serde_json::to_vec(body) {
        Ok(json) => build(status, Some("application/json"), Bytes::from(json)),
        Err(e) => {
            error!(error = %e, "Failed to serialize response body");
            build(
                StatusCode::INTERNAL_SERVER_ERROR,
                Some("application/json"),
                Bytes::from_static(br#"{"detail":"Internal serialization error"}"#),
            )
        }
    }
}

/// Build a JSON response with 200 OK status
pub fn ok<T: Serialize>(body: &T) -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, body)
}

/// Build a JSON response with 201 Created status
pub fn created<T: Serialize>(body: &T) -> Response<Full<Bytes>> {
    json_response(StatusCode::CREATED, body)
}

/// Build an empty response with 204 No Content status
pub fn no_content() -> Response<Full<Bytes>> {
    build(StatusCode::NO_CONTENT, None, Bytes::new())
}

/// Plain text response, used by the browser facing verification link
pub fn text_response(status: StatusCode, body: &'static str) -> Response<Full<Bytes>> {
    build(status, Some("text/plain; charset=utf-8"), Bytes::from_static(body.as_bytes()))
}

/// Build a 404 Not Found response for an unknown route
pub fn not_found(path: &str) -> Response<Full<Bytes>> {
    json_response(
        StatusCode::NOT_FOUND,
        &serde_json::json!({ "detail": "Not found.", "path": path }),
    )
}

/// Build a 413 response for an oversized request body
pub fn payload_too_large(limit: usize) -> Response<Full<Bytes>> {
    json_response(
        StatusCode::PAYLOAD_TOO_LARGE,
        &serde_json::json!({ "detail": format!("Request body exceeds {} bytes", limit) }),
    )
}

/// CORS preflight response
pub fn preflight() -> Response<Full<Bytes>> {
    let mut response = build(StatusCode::OK, None, Bytes::new());
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        header::HeaderValue::from_static("Authorization, Content-Type"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        header::HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
    );
    response
}

/// Convert an IdeagramError to an appropriate HTTP response
pub fn error_response(error: IdeagramError) -> Response<Full<Bytes>> {
    let status = error.status_code();
    if status.is_server_error() {
        error!(error = %error, "Request failed");
    }
    json_response(status, &error.to_body())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response<Full<Bytes>>) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_error_keeps_fields() {
        let response = error_response(IdeagramError::field("title", "This field is required."));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "title": ["This field is required."] })
        );
    }

    #[tokio::test]
    async fn test_forbidden_detail() {
        let response = error_response(IdeagramError::Forbidden("Idea's likes are hidden".into()));
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            body_json(response).await["detail"],
            "Idea's likes are hidden"
        );
    }

    #[test]
    fn test_cors_header_on_every_response() {
        for response in [ok(&serde_json::json!({})), no_content(), preflight()] {
            assert_eq!(
                response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
                "*"
            );
        }
        assert!(no_content().headers().get(header::CONTENT_TYPE).is_none());
    }
}
