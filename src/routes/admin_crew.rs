use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::dto::common::{BulkSummary, Page};
use crate::dto::crew_dto::{
    BulkAssignPayload, BulkExportPayload, BulkStatusPayload, BulkTagsPayload, CrewListQuery,
    ExportCrewPayload, MergeTagsPayload, SetStatusPayload, UpdateCrewPayload,
};
use crate::error::{Error, Result};
use crate::middleware::auth::AdminUser;
use crate::models::crew::{CrewRecord, CrewSummary};
use crate::policy::documents::admin_slot;
use crate::routes::{document_response, Disposition};
use crate::services::export_service::{ExportService, XLSX_CONTENT_TYPE};
use crate::utils::validation::validate;
use crate::AppState;

pub async fn list_crew(
    State(state): State<AppState>,
    Query(query): Query<CrewListQuery>,
) -> Result<Json<Page<CrewSummary>>> {
    Ok(Json(state.crew_service.list(query).await?))
}

pub async fn get_crew(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CrewRecord>> {
    Ok(Json(state.crew_service.get(id).await?))
}

pub async fn update_crew(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCrewPayload>,
) -> Result<Json<CrewRecord>> {
    validate(&payload)?;
    let record = state.crew_service.update(id, payload).await?;
    tracing::info!(crew_id = %id, admin_id = %admin.id, "Crew record updated");
    Ok(Json(record))
}

pub async fn set_status(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetStatusPayload>,
) -> Result<Json<CrewRecord>> {
    validate(&payload)?;
    let record = state
        .crew_service
        .set_status(id, payload.status, payload.tags)
        .await?;
    tracing::debug!(crew_id = %id, admin_id = %admin.id, "Status set by admin");
    Ok(Json(record))
}

pub async fn merge_tags(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MergeTagsPayload>,
) -> Result<Json<CrewRecord>> {
    validate(&payload)?;
    Ok(Json(state.crew_service.merge_tags(id, payload.tags).await?))
}

/// Any slot, served as a download.
pub async fn get_document(
    State(state): State<AppState>,
    Path((id, slot)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse> {
    let slot = admin_slot(&slot)?;
    let record = state.crew_service.get(id).await?;
    let reference = record
        .documents
        .get(slot)
        .ok_or_else(|| Error::NotFound(format!("No {} document on file", slot)))?;
    let data = state.file_store.retrieve(reference).await?;
    Ok(document_response(data, reference, slot, Disposition::Attachment))
}

pub async fn assign_client(
    State(state): State<AppState>,
    Path((id, client_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<CrewRecord>> {
    let record = state.crew_service.assign(id, client_id).await?;
    tracing::info!(crew_id = %id, %client_id, "Crew assigned to client");
    Ok(Json(record))
}

pub async fn unassign_client(
    State(state): State<AppState>,
    Path((id, client_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<CrewRecord>> {
    let record = state.crew_service.unassign(id, client_id).await?;
    tracing::info!(crew_id = %id, %client_id, "Crew unassigned from client");
    Ok(Json(record))
}

pub async fn bulk_status(
    State(state): State<AppState>,
    Json(payload): Json<BulkStatusPayload>,
) -> Result<Json<BulkSummary>> {
    validate(&payload)?;
    let summary = state
        .crew_service
        .bulk_set_status(&payload.ids, payload.status, payload.tags)
        .await?;
    tracing::info!(
        total = summary.total,
        failed = summary.failed,
        status = %payload.status,
        "Bulk status update finished"
    );
    Ok(Json(summary))
}

pub async fn bulk_tags(
    State(state): State<AppState>,
    Json(payload): Json<BulkTagsPayload>,
) -> Result<Json<BulkSummary>> {
    validate(&payload)?;
    Ok(Json(
        state
            .crew_service
            .bulk_merge_tags(&payload.ids, payload.tags)
            .await?,
    ))
}

pub async fn bulk_assign(
    State(state): State<AppState>,
    Json(payload): Json<BulkAssignPayload>,
) -> Result<Json<BulkSummary>> {
    validate(&payload)?;
    Ok(Json(
        state
            .crew_service
            .bulk_assign(&payload.ids, payload.client_id)
            .await?,
    ))
}

/// Header carrying the per-id outcome of a named export selection.
pub const EXPORT_SUMMARY_HEADER: &str = "x-export-summary";

/// Named records, or the whole roster when no ids are given. Ids with no
/// record are reported in the summary header instead of failing the export.
pub async fn export_crew(
    State(state): State<AppState>,
    Json(payload): Json<ExportCrewPayload>,
) -> Result<Response> {
    validate(&payload)?;
    let (records, summary) = state.crew_service.list_for_export(payload.ids).await?;
    let buffer = ExportService::generate_admin_crew_xlsx(&records)?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        ExportService::attachment_name("crew_export")
    );
    let mut response = (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        buffer,
    )
        .into_response();

    if let Some(summary) = summary {
        if summary.failed > 0 {
            tracing::info!(missing = summary.failed, "Export selection named unknown crew ids");
        }
        let value = HeaderValue::from_str(&serde_json::to_string(&summary)?)
            .map_err(|e| Error::Internal(format!("Invalid export summary header: {}", e)))?;
        response.headers_mut().insert(EXPORT_SUMMARY_HEADER, value);
    }
    Ok(response)
}

/// Per-id outcome of an export selection without building the workbook.
pub async fn export_preview(
    State(state): State<AppState>,
    Json(payload): Json<BulkExportPayload>,
) -> Result<Json<BulkSummary>> {
    validate(&payload)?;
    let (_, summary) = state.crew_service.list_for_export(Some(payload.ids)).await?;
    summary
        .map(Json)
        .ok_or_else(|| Error::BadRequest("No crew ids given".into()))
}
