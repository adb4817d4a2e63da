pub mod admin_clients;
pub mod admin_crew;
pub mod admin_requests;
pub mod auth;
pub mod client_crew;
pub mod client_requests;
pub mod dashboard;
pub mod health;
pub mod registration;
pub mod reminders;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, StatusCode},
    middleware::{from_fn, from_fn_with_state},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Router,
};
use bytes::Bytes;

use crate::config::Config;
use crate::middleware::auth::{require_admin, require_client, resolve_principal};
use crate::models::crew::DocumentSlot;
use crate::policy::documents::content_type_for;
use crate::AppState;

#[derive(Debug, Clone, Copy)]
pub enum Disposition {
    Inline,
    Attachment,
}

pub(crate) fn document_response(
    data: Bytes,
    reference: &str,
    slot: DocumentSlot,
    disposition: Disposition,
) -> Response {
    let ext = reference.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("bin");
    let kind = match disposition {
        Disposition::Inline => "inline",
        Disposition::Attachment => "attachment",
    };
    let disposition = HeaderValue::from_str(&format!("{}; filename=\"{}.{}\"", kind, slot, ext))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(content_type_for(reference))),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CACHE_CONTROL, HeaderValue::from_static("no-store")),
        ],
        data,
    )
        .into_response()
}

/// Every route group with its guards. Outer layers (CORS, tracing) are added
/// by the binary.
pub fn router(state: AppState, config: &Config) -> Router {
    let public_api = Router::new()
        .route(
            "/api/crew/register",
            post(registration::register_crew)
                .layer(DefaultBodyLimit::max(config.max_upload_mb * 1024 * 1024)),
        )
        .route("/api/admin/auth/login", post(auth::admin_login))
        .route("/api/client/auth/login", post(auth::client_login));

    let admin_api = Router::new()
        .route("/api/admin/me", get(auth::admin_me))
        .route("/api/admin/dashboard", get(dashboard::get_dashboard))
        .route("/api/admin/crew", get(admin_crew::list_crew))
        .route("/api/admin/crew/export", post(admin_crew::export_crew))
        .route("/api/admin/crew/bulk/status", post(admin_crew::bulk_status))
        .route("/api/admin/crew/bulk/tags", post(admin_crew::bulk_tags))
        .route("/api/admin/crew/bulk/assign", post(admin_crew::bulk_assign))
        .route("/api/admin/crew/bulk/export", post(admin_crew::export_preview))
        .route(
            "/api/admin/crew/:id",
            get(admin_crew::get_crew).patch(admin_crew::update_crew),
        )
        .route("/api/admin/crew/:id/status", patch(admin_crew::set_status))
        .route("/api/admin/crew/:id/tags", post(admin_crew::merge_tags))
        .route(
            "/api/admin/crew/:id/documents/:slot",
            get(admin_crew::get_document),
        )
        .route(
            "/api/admin/crew/:id/clients/:client_id",
            post(admin_crew::assign_client).delete(admin_crew::unassign_client),
        )
        .route(
            "/api/admin/clients",
            get(admin_clients::list_clients).post(admin_clients::create_client),
        )
        .route(
            "/api/admin/clients/:id",
            get(admin_clients::get_client).patch(admin_clients::update_client),
        )
        .route("/api/admin/clients/:id/crew", get(admin_clients::assigned_crew))
        .route("/api/admin/requests", get(admin_requests::list_requests))
        .route(
            "/api/admin/requests/:id",
            get(admin_requests::get_request).delete(admin_requests::delete_request),
        )
        .route("/api/admin/requests/:id/respond", post(admin_requests::respond))
        .route(
            "/api/admin/requests/:id/follow-ups",
            post(admin_requests::add_follow_up),
        )
        .route(
            "/api/admin/reminders",
            get(reminders::list_reminders).post(reminders::create_reminder),
        )
        .route(
            "/api/admin/reminders/:id",
            get(reminders::get_reminder)
                .patch(reminders::update_reminder)
                .delete(reminders::delete_reminder),
        )
        .route(
            "/api/admin/reminders/:id/complete",
            post(reminders::complete_reminder),
        )
        .route(
            "/api/admin/reminders/:id/cancel",
            post(reminders::cancel_reminder),
        )
        .route_layer(from_fn(require_admin));

    let client_api = Router::new()
        .route("/api/client/me", get(auth::client_me))
        .route("/api/client/crew", get(client_crew::list_crew))
        .route("/api/client/crew/export", get(client_crew::export_crew))
        .route("/api/client/crew/:id", get(client_crew::get_crew))
        .route(
            "/api/client/crew/:id/documents/:slot",
            get(client_crew::get_document),
        )
        .route("/api/client/crew/:id/cv", get(client_crew::download_cv))
        .route(
            "/api/client/crew/:id/shortlist",
            post(client_crew::add_to_shortlist).delete(client_crew::remove_from_shortlist),
        )
        .route(
            "/api/client/requests",
            get(client_requests::list_requests).post(client_requests::submit_request),
        )
        .route("/api/client/requests/:id", get(client_requests::get_request))
        .route(
            "/api/client/requests/:id/follow-ups",
            post(client_requests::add_follow_up),
        )
        .route_layer(from_fn(require_client));

    let authenticated_api = admin_api
        .merge(client_api)
        .route_layer(from_fn_with_state(state.clone(), resolve_principal));

    Router::new()
        .route("/health", get(health::health))
        .merge(public_api)
        .merge(authenticated_api)
        .with_state(state)
}
