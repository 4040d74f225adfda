//! Business-logic collaborators invoked by the dispatcher.
//!
//! The dispatcher only knows the [`GalleryService`] contract: every call
//! returns a JSON payload or a [`ServiceError`] tagged with its kind.

pub mod memory;

pub use memory::MemoryGalleryService;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::types::Collection;

/// Result of every collaborator call
pub type ServiceResult = Result<Value, ServiceError>;

/// JSON object arguments handed to collaborators
pub type Fields = Map<String, Value>;

/// Category of a collaborator failure, mapped to an HTTP status by a fixed table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Unauthorized,
    Forbidden,
    NotFound,
    Invalid,
    Internal,
}

impl FailureKind {
    /// Classify a free-text failure by its wording.
    ///
    /// Markers are checked in order; the first hit wins.
    pub fn classify(message: &str) -> Self {
        const MARKERS: &[(&str, FailureKind)] = &[
            ("Authentication", FailureKind::Unauthorized),
            ("authorized", FailureKind::Unauthorized),
            ("Admin", FailureKind::Forbidden),
            ("not found", FailureKind::NotFound),
        ];

        MARKERS
            .iter()
            .find(|(marker, _)| message.contains(marker))
            .map(|(_, kind)| *kind)
            .unwrap_or(FailureKind::Invalid)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ServiceError {
    pub kind: FailureKind,
    pub message: String,
}

impl ServiceError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    /// Failure from a collaborator that can only report text
    pub fn opaque(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(FailureKind::classify(&message), message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Forbidden, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(FailureKind::NotFound, message)
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Invalid, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Internal, message)
    }
}

/// Read a scalar field as text; numbers and booleans are stringified
pub fn text(fields: &Fields, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// New account details for `/register`
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

/// Operations the HTTP edge delegates to the business layer.
///
/// Implementations must be safe to call concurrently; the dispatcher adds no
/// locking of its own. `caller` is the verified subject of the admin making
/// the change.
#[async_trait]
pub trait GalleryService: Send + Sync {
    async fn register_user(&self, registration: Registration) -> ServiceResult;

    async fn login_user(&self, email: &str, password: &str) -> ServiceResult;

    async fn login_admin(&self, email: &str, password: &str) -> ServiceResult;

    async fn list_records(&self, collection: Collection) -> ServiceResult;

    async fn get_record(&self, collection: Collection, id: &str) -> ServiceResult;

    async fn create_record(
        &self,
        collection: Collection,
        fields: Fields,
        caller: &str,
    ) -> ServiceResult;

    async fn update_record(
        &self,
        collection: Collection,
        id: &str,
        fields: Fields,
        caller: &str,
    ) -> ServiceResult;

    async fn delete_record(&self, collection: Collection, id: &str, caller: &str) -> ServiceResult;

    async fn create_contact_message(&self, fields: Fields) -> ServiceResult;

    async fn list_contact_messages(&self) -> ServiceResult;

    async fn update_message_status(&self, message_id: &str, status: &str) -> ServiceResult;
}
