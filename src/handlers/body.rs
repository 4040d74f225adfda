// handlers/body.rs - request body parsing ahead of the collaborator call

use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
    http::{header::CONTENT_TYPE, StatusCode},
};
use serde_json::Value;

use crate::error::ApiError;
use crate::services::Fields;
use crate::state::AppState;
use crate::upload::{self, FormPayload};

/// A parsed request body
#[derive(Debug)]
pub enum RequestBody {
    Multipart(FormPayload),
    Json(Fields),
    Empty,
}

impl RequestBody {
    /// Read the body according to its content type.
    ///
    /// `upload_field` names the one file part the route stores; `None`
    /// means uploads are ignored.
    pub async fn read(
        request: Request,
        state: &AppState,
        upload_field: Option<&str>,
    ) -> Result<Self, ApiError> {
        let content_type = request
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase())
            .unwrap_or_default();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(request, &())
                .await
                .map_err(|e| ApiError::MalformedMultipart(e.body_text()))?;
            let payload = upload::decode(multipart, &state.uploads, upload_field).await?;
            return Ok(RequestBody::Multipart(payload));
        }

        let bytes = Bytes::from_request(request, &()).await.map_err(|e| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ApiError::payload_too_large("Request body too large")
            } else {
                ApiError::bad_request(e.body_text())
            }
        })?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(RequestBody::Empty);
        }
        if !content_type.starts_with("application/json") {
            tracing::debug!("Ignoring body with content type {:?}", content_type);
            return Ok(RequestBody::Empty);
        }

        parse_json(&bytes).map(RequestBody::Json)
    }

    /// Flatten into the argument object handed to a collaborator
    pub fn into_fields(self) -> Fields {
        match self {
            RequestBody::Multipart(payload) => payload.into_fields(),
            RequestBody::Json(fields) => fields,
            RequestBody::Empty => Fields::new(),
        }
    }
}

fn parse_json(bytes: &[u8]) -> Result<Fields, ApiError> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(ApiError::invalid_json("Request body must be a JSON object")),
        Err(e) => Err(ApiError::invalid_json(format!("Invalid JSON: {}", e))),
    }
}

/// Names from `required` that are absent or null, in the given order
pub fn missing_fields(fields: &Fields, required: &[&str]) -> Vec<String> {
    required
        .iter()
        .filter(|name| fields.get(**name).map_or(true, Value::is_null))
        .map(|name| name.to_string())
        .collect()
}
