use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::reminder::{ReminderPriority, ReminderStatus};
use crate::utils::validation::trimmed;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateReminderPayload {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub crew_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub priority: Option<ReminderPriority>,
    pub due_date: DateTime<Utc>,
    #[validate(length(max = 5000))]
    pub notes: Option<String>,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub tags: Vec<String>,
    pub assigned_to: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct UpdateReminderPayload {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub crew_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub priority: Option<ReminderPriority>,
    pub due_date: Option<DateTime<Utc>>,
    #[validate(length(max = 5000))]
    pub notes: Option<String>,
    #[validate(length(max = 50))]
    pub tags: Option<Vec<String>>,
    pub assigned_to: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ReminderListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<ReminderStatus>,
    pub priority: Option<ReminderPriority>,
    pub crew_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub assigned_to: Option<Uuid>,
    pub overdue: Option<bool>,
}
