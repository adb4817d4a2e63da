use axum::{extract::State, Json};

use crate::dto::account_dto::{LoginRequest, LoginResponse};
use crate::error::{Error, Result};
use crate::middleware::auth::{AdminUser, ClientUser};
use crate::models::admin::AdminAccount;
use crate::models::client::ClientAccount;
use crate::utils::validation::validate;
use crate::AppState;

pub async fn admin_login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    validate(&payload)?;
    let session = state
        .identity
        .login_admin(&payload.email, &payload.password)
        .await?;
    tracing::info!(admin_id = %session.principal.id(), "Admin logged in");
    Ok(Json(session))
}

pub async fn client_login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    validate(&payload)?;
    let session = state
        .identity
        .login_client(&payload.email, &payload.password)
        .await?;
    tracing::info!(client_id = %session.principal.id(), "Client logged in");
    Ok(Json(session))
}

pub async fn admin_me(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> Result<Json<AdminAccount>> {
    let account = state
        .admin_service
        .find_by_id(admin.id)
        .await?
        .ok_or_else(|| Error::NotFound("Admin not found".into()))?;
    Ok(Json(account))
}

pub async fn client_me(
    State(state): State<AppState>,
    ClientUser(client): ClientUser,
) -> Result<Json<ClientAccount>> {
    Ok(Json(state.client_service.get(client.id).await?))
}
