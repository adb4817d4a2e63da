use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::dto::account_dto::{ClientListQuery, CreateClientPayload, UpdateClientPayload};
use crate::dto::common::Page;
use crate::error::Result;
use crate::models::client::ClientAccount;
use crate::models::crew::CrewSummary;
use crate::utils::validation::validate;
use crate::AppState;

pub async fn list_clients(
    State(state): State<AppState>,
    Query(query): Query<ClientListQuery>,
) -> Result<Json<Page<ClientAccount>>> {
    Ok(Json(state.client_service.list(query).await?))
}

pub async fn create_client(
    State(state): State<AppState>,
    Json(payload): Json<CreateClientPayload>,
) -> Result<(StatusCode, Json<ClientAccount>)> {
    validate(&payload)?;
    let client = state.client_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

pub async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClientAccount>> {
    Ok(Json(state.client_service.get(id).await?))
}

pub async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateClientPayload>,
) -> Result<Json<ClientAccount>> {
    validate(&payload)?;
    let client = state.client_service.update(id, payload).await?;
    tracing::info!(client_id = %id, is_active = client.is_active, "Client account updated");
    Ok(Json(client))
}

pub async fn assigned_crew(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<CrewSummary>>> {
    Ok(Json(state.crew_service.assigned_to_client(id).await?))
}
