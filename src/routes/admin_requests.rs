use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::dto::common::Page;
use crate::dto::request_dto::{FollowUpPayload, RequestListQuery, RespondPayload};
use crate::error::Result;
use crate::middleware::auth::AdminUser;
use crate::models::client_request::ClientRequest;
use crate::models::principal::Principal;
use crate::utils::validation::validate;
use crate::AppState;

pub async fn list_requests(
    State(state): State<AppState>,
    Query(query): Query<RequestListQuery>,
) -> Result<Json<Page<ClientRequest>>> {
    Ok(Json(state.request_service.list(query).await?))
}

pub async fn get_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClientRequest>> {
    Ok(Json(state.request_service.get(id).await?))
}

pub async fn respond(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RespondPayload>,
) -> Result<Json<ClientRequest>> {
    validate(&payload)?;
    Ok(Json(
        state.request_service.respond(id, admin.id, payload).await?,
    ))
}

pub async fn add_follow_up(
    State(state): State<AppState>,
    user: AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<FollowUpPayload>,
) -> Result<Json<ClientRequest>> {
    validate(&payload)?;
    let author = Principal::from(user);
    Ok(Json(
        state
            .request_service
            .add_follow_up(id, &author, &payload.message)
            .await?,
    ))
}

pub async fn delete_request(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.request_service.delete(id).await?;
    tracing::info!(request_id = %id, admin_id = %admin.id, "Request removed by admin");
    Ok(StatusCode::NO_CONTENT)
}
