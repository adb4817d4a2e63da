use axum::{extract::State, Json};
use serde::Serialize;

use crate::error::Result;
use crate::models::client_request::RequestStatus;
use crate::models::reminder::Reminder;
use crate::services::crew_service::CrewStatusCounts;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct RequestCounts {
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
    pub completed: i64,
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub crew: CrewStatusCounts,
    pub requests: RequestCounts,
    pub overdue_reminders: i64,
    pub due_today: Vec<Reminder>,
}

pub async fn get_dashboard(State(state): State<AppState>) -> Result<Json<DashboardStats>> {
    let (crew, request_counts, overdue_reminders, due_today) = tokio::try_join!(
        state.crew_service.status_counts(),
        state.request_service.status_counts(),
        state.reminder_service.overdue_count(),
        state.reminder_service.due_today(10),
    )?;

    let count_of = |status: RequestStatus| {
        request_counts
            .iter()
            .find(|(s, _)| *s == status)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    };

    Ok(Json(DashboardStats {
        crew,
        requests: RequestCounts {
            pending: count_of(RequestStatus::Pending),
            approved: count_of(RequestStatus::Approved),
            rejected: count_of(RequestStatus::Rejected),
            completed: count_of(RequestStatus::Completed),
        },
        overdue_reminders,
        due_today,
    }))
}
