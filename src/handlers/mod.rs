// handlers/mod.rs - single entry point for every request
//
// Request flow:
// resolve route → access policy → body parsing → required fields →
// collaborator → response encoder
//
// OPTIONS and unmatched paths short-circuit; `/uploads/{file}` is served
// straight from the uploads directory without a policy check.

pub mod body;
pub mod payment;
pub mod route;

use axum::{
    extract::{Request, State},
    http::Method,
    response::Response,
};

use crate::auth::Claims;
use crate::error::ApiError;
use crate::middleware::{check, encode, error_response, response, Decision};
use crate::services::{text, Fields, Registration, ServiceError, ServiceResult};
use crate::state::AppState;
use crate::upload::content_type_for;

pub use body::RequestBody;
pub use route::{resolve, Route};

/// Router fallback handling every method and path
pub async fn dispatch(State(state): State<AppState>, request: Request) -> Response {
    let method = request.method().clone();

    if method == Method::OPTIONS {
        return response::preflight();
    }

    let Some(route) = resolve(&method, request.uri().path()) else {
        tracing::debug!("No route for {} {}", method, request.uri().path());
        return error_response(ApiError::not_found("Resource not found"));
    };

    if let Route::Asset(name) = &route {
        return serve_asset(&state, name).await;
    }

    let claims = match check(&state.verifier, request.headers(), route.privilege()) {
        Decision::Allow(claims) => claims,
        Decision::Deny(err) => return error_response(err),
    };

    let fields = match RequestBody::read(request, &state, route.upload_field()).await {
        Ok(body) => body.into_fields(),
        Err(err) => return error_response(err),
    };

    let missing = body::missing_fields(&fields, route.required_fields());
    if !missing.is_empty() {
        return error_response(ApiError::missing_fields(missing));
    }

    let status = route.success_status();
    encode(invoke(&state, route, fields, claims.as_ref()).await, status)
}

/// Call the collaborator behind `route`
async fn invoke(
    state: &AppState,
    route: Route,
    fields: Fields,
    claims: Option<&Claims>,
) -> ServiceResult {
    let service = state.service.as_ref();
    let caller = claims.map(Claims::subject).unwrap_or_default();

    match route {
        Route::ListRecords(collection) => service.list_records(collection).await,
        Route::ShowRecord(collection, id) => service.get_record(collection, &id).await,
        Route::CreateRecord(collection) => service.create_record(collection, fields, caller).await,
        Route::UpdateRecord(collection, id) => {
            service.update_record(collection, &id, fields, caller).await
        }
        Route::DeleteRecord(collection, id) => service.delete_record(collection, &id, caller).await,

        Route::ListMessages => service.list_contact_messages().await,
        Route::UpdateMessageStatus => {
            service
                .update_message_status(&field(&fields, "message_id"), &field(&fields, "status"))
                .await
        }

        Route::Register => {
            let registration = Registration {
                name: field(&fields, "name"),
                email: field(&fields, "email"),
                password: field(&fields, "password"),
                phone: text(&fields, "phone"),
            };
            service.register_user(registration).await
        }
        Route::Login => {
            service
                .login_user(&field(&fields, "email"), &field(&fields, "password"))
                .await
        }
        Route::AdminLogin => {
            service
                .login_admin(&field(&fields, "email"), &field(&fields, "password"))
                .await
        }
        Route::Contact => service.create_contact_message(fields).await,

        Route::StkPush => payment::stk_push(&fields),
        Route::MpesaCallback => payment::callback(&fields),

        // Served before the policy check
        Route::Asset(_) => Err(ServiceError::internal("asset route reached the collaborator")),
    }
}

fn field(fields: &Fields, key: &str) -> String {
    text(fields, key).unwrap_or_default()
}

async fn serve_asset(state: &AppState, name: &str) -> Response {
    match state.uploads.read(name).await {
        Some(bytes) => response::binary(bytes, content_type_for(name)),
        None => error_response(ApiError::not_found("File not found")),
    }
}
