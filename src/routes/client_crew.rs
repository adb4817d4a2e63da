use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::dto::common::Page;
use crate::dto::crew_dto::{ClientCrewQuery, ShortlistResponse};
use crate::error::{Error, Result};
use crate::middleware::auth::ClientUser;
use crate::policy::documents::{client_viewable_slot, CV_FORBIDDEN_MESSAGE};
use crate::policy::visibility::ClientCrewView;
use crate::routes::{document_response, Disposition};
use crate::services::export_service::{ExportService, XLSX_CONTENT_TYPE};
use crate::AppState;

pub async fn list_crew(
    State(state): State<AppState>,
    ClientUser(client): ClientUser,
    Query(query): Query<ClientCrewQuery>,
) -> Result<Json<Page<ClientCrewView>>> {
    Ok(Json(
        state
            .crew_service
            .list_for_client(client.id, state.visibility, query)
            .await?,
    ))
}

pub async fn get_crew(
    State(state): State<AppState>,
    ClientUser(client): ClientUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ClientCrewView>> {
    let record = state
        .crew_service
        .get_for_client(id, client.id, state.visibility)
        .await?;
    Ok(Json(ClientCrewView::redact(&record, client.id)))
}

/// Inline view of an allow-listed slot. The slot rule is checked before the
/// record is even looked up.
pub async fn get_document(
    State(state): State<AppState>,
    ClientUser(client): ClientUser,
    Path((id, slot)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse> {
    let slot = client_viewable_slot(&slot)?;
    let record = state
        .crew_service
        .get_for_client(id, client.id, state.visibility)
        .await?;
    let reference = record
        .documents
        .get(slot)
        .ok_or_else(|| Error::NotFound(format!("No {} document on file", slot)))?;
    let data = state.file_store.retrieve(reference).await?;
    Ok(document_response(data, reference, slot, Disposition::Inline))
}

/// CVs are never released to clients.
pub async fn download_cv(ClientUser(client): ClientUser, Path(id): Path<Uuid>) -> Result<()> {
    tracing::info!(client_id = %client.id, crew_id = %id, "Client CV download refused");
    Err(Error::Forbidden(CV_FORBIDDEN_MESSAGE.into()))
}

pub async fn add_to_shortlist(
    State(state): State<AppState>,
    ClientUser(client): ClientUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ShortlistResponse>> {
    state
        .crew_service
        .shortlist_add(id, client.id, state.visibility)
        .await?;
    Ok(Json(ShortlistResponse {
        crew_id: id,
        client_id: client.id,
        shortlisted: true,
    }))
}

pub async fn remove_from_shortlist(
    State(state): State<AppState>,
    ClientUser(client): ClientUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ShortlistResponse>> {
    state.crew_service.shortlist_remove(id, client.id).await?;
    Ok(Json(ShortlistResponse {
        crew_id: id,
        client_id: client.id,
        shortlisted: false,
    }))
}

/// Redacted roster of every crew member visible to the caller.
pub async fn export_crew(
    State(state): State<AppState>,
    ClientUser(client): ClientUser,
) -> Result<impl IntoResponse> {
    let views = state
        .crew_service
        .export_for_client(client.id, state.visibility)
        .await?;
    let buffer = ExportService::generate_client_crew_xlsx(&views)?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        ExportService::attachment_name("available_crew")
    );
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        buffer,
    ))
}
