// handlers/route.rs - closed route table resolved from (method, path)

use axum::http::{Method, StatusCode};

use crate::middleware::Privilege;
use crate::types::Collection;
use crate::upload::IMAGE_FIELD;

/// Every endpoint the gallery API answers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    ListRecords(Collection),
    ShowRecord(Collection, String),
    CreateRecord(Collection),
    UpdateRecord(Collection, String),
    DeleteRecord(Collection, String),
    ListMessages,
    UpdateMessageStatus,
    Register,
    Login,
    AdminLogin,
    Contact,
    StkPush,
    MpesaCallback,
    /// Stored upload under `/uploads/{file}`
    Asset(String),
}

/// Match a request line against the route table.
///
/// Segment counts must match exactly and empty segments never match, so
/// `/artworks/5/extra` and `/artworks//` resolve to nothing.
pub fn resolve(method: &Method, path: &str) -> Option<Route> {
    let segments: Vec<&str> = path.strip_prefix('/')?.split('/').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return None;
    }

    let route = match (method, segments.as_slice()) {
        (&Method::GET, ["uploads", file]) => Route::Asset(file.to_string()),

        (&Method::GET, ["messages"]) => Route::ListMessages,
        (&Method::POST, ["messages", "status"]) => Route::UpdateMessageStatus,

        (&Method::POST, ["register"]) => Route::Register,
        (&Method::POST, ["login"]) => Route::Login,
        (&Method::POST, ["admin", "login"]) => Route::AdminLogin,
        (&Method::POST, ["contact"]) => Route::Contact,

        (&Method::POST, ["mpesa", "stk-push"]) => Route::StkPush,
        (&Method::POST, ["mpesa", "callback"]) => Route::MpesaCallback,

        _ => return resolve_record(method, &segments),
    };

    Some(route)
}

fn resolve_record(method: &Method, segments: &[&str]) -> Option<Route> {
    let (first, id) = match segments {
        [first] => (*first, None),
        [first, id] => (*first, Some(id.to_string())),
        _ => return None,
    };
    let collection = Collection::from_segment(first)?;

    match (method, id) {
        (&Method::GET, None) => Some(Route::ListRecords(collection)),
        (&Method::POST, None) => Some(Route::CreateRecord(collection)),
        (&Method::GET, Some(id)) => Some(Route::ShowRecord(collection, id)),
        (&Method::PUT, Some(id)) => Some(Route::UpdateRecord(collection, id)),
        (&Method::DELETE, Some(id)) => Some(Route::DeleteRecord(collection, id)),
        _ => None,
    }
}

impl Route {
    pub fn privilege(&self) -> Privilege {
        match self {
            Route::CreateRecord(_)
            | Route::UpdateRecord(..)
            | Route::DeleteRecord(..)
            | Route::ListMessages
            | Route::UpdateMessageStatus => Privilege::Admin,
            _ => Privilege::Public,
        }
    }

    /// Status returned when the collaborator succeeds
    pub fn success_status(&self) -> StatusCode {
        match self {
            Route::CreateRecord(_) | Route::Register | Route::Contact => StatusCode::CREATED,
            _ => StatusCode::OK,
        }
    }

    /// Multipart file part this route stores, if any
    pub fn upload_field(&self) -> Option<&'static str> {
        match self {
            Route::CreateRecord(_) | Route::UpdateRecord(..) => Some(IMAGE_FIELD),
            _ => None,
        }
    }

    /// Fields that must be present and non-empty, in reporting order
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            Route::Register => &["name", "email", "password"],
            Route::Login | Route::AdminLogin => &["email", "password"],
            Route::Contact => &["name", "email", "message"],
            Route::UpdateMessageStatus => &["message_id", "status"],
            Route::StkPush => &[
                "phoneNumber",
                "amount",
                "accountReference",
                "orderType",
                "orderId",
                "userId",
            ],
            _ => &[],
        }
    }
}
