use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::dto::common::Page;
use crate::dto::reminder_dto::{CreateReminderPayload, ReminderListQuery, UpdateReminderPayload};
use crate::error::Result;
use crate::middleware::auth::AdminUser;
use crate::models::reminder::Reminder;
use crate::utils::validation::validate;
use crate::AppState;

pub async fn list_reminders(
    State(state): State<AppState>,
    Query(query): Query<ReminderListQuery>,
) -> Result<Json<Page<Reminder>>> {
    Ok(Json(state.reminder_service.list(query).await?))
}

pub async fn create_reminder(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<CreateReminderPayload>,
) -> Result<(StatusCode, Json<Reminder>)> {
    validate(&payload)?;
    let reminder = state.reminder_service.create(admin.id, payload).await?;
    Ok((StatusCode::CREATED, Json(reminder)))
}

pub async fn get_reminder(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Reminder>> {
    Ok(Json(state.reminder_service.get(id).await?))
}

pub async fn update_reminder(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateReminderPayload>,
) -> Result<Json<Reminder>> {
    validate(&payload)?;
    Ok(Json(state.reminder_service.update(id, payload).await?))
}

pub async fn complete_reminder(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Reminder>> {
    Ok(Json(state.reminder_service.complete(id, admin.id).await?))
}

pub async fn cancel_reminder(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Reminder>> {
    Ok(Json(state.reminder_service.cancel(id, admin.id).await?))
}

pub async fn delete_reminder(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.reminder_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
