use axum::{
    body::Body,
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE,
        },
        HeaderValue, StatusCode,
    },
    response::{IntoResponse, Json, Response},
};

use crate::error::ApiError;
use crate::services::ServiceResult;

const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type, Authorization";

/// Turn a collaborator result into an HTTP response.
///
/// Success uses `success_status`; failures map through [`ApiError`] to
/// `{"error": message}`.
pub fn encode(result: ServiceResult, success_status: StatusCode) -> Response {
    match result {
        Ok(payload) => with_cors((success_status, Json(payload)).into_response()),
        Err(err) => error_response(err.into()),
    }
}

pub fn error_response(err: ApiError) -> Response {
    with_cors(err.into_response())
}

/// Reply to an `OPTIONS` request: 200, empty body
pub fn preflight() -> Response {
    let mut response = StatusCode::OK.into_response();
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    with_cors(response)
}

/// Raw bytes with an explicit content type, e.g. an uploaded image
pub fn binary(bytes: Vec<u8>, content_type: &'static str) -> Response {
    let mut response = Response::new(Body::from(bytes));
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    with_cors(response)
}

/// Attach the fixed CORS header set every response carries
pub fn with_cors(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOWED_METHODS));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOWED_HEADERS));
    response
}
