use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::dto::common::Page;
use crate::dto::request_dto::{
    CreateRequestPayload, CreatedRequestResponse, FollowUpPayload, RequestListQuery,
};
use crate::error::Result;
use crate::middleware::auth::ClientUser;
use crate::models::client_request::ClientRequest;
use crate::models::principal::Principal;
use crate::utils::validation::validate;
use crate::AppState;

pub async fn submit_request(
    State(state): State<AppState>,
    ClientUser(client): ClientUser,
    Json(payload): Json<CreateRequestPayload>,
) -> Result<(StatusCode, Json<CreatedRequestResponse>)> {
    validate(&payload)?;
    let request = state.request_service.submit(client.id, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedRequestResponse {
            id: request.id,
            status: request.status,
        }),
    ))
}

pub async fn list_requests(
    State(state): State<AppState>,
    ClientUser(client): ClientUser,
    Query(query): Query<RequestListQuery>,
) -> Result<Json<Page<ClientRequest>>> {
    Ok(Json(
        state
            .request_service
            .list_for_client(client.id, query)
            .await?,
    ))
}

pub async fn get_request(
    State(state): State<AppState>,
    ClientUser(client): ClientUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ClientRequest>> {
    Ok(Json(
        state.request_service.get_for_client(id, client.id).await?,
    ))
}

pub async fn add_follow_up(
    State(state): State<AppState>,
    user: ClientUser,
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
