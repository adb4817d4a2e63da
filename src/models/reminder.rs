use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{Error, Result};

string_enum! {
    pub enum ReminderPriority {
        Low => "low",
        Medium => "medium",
        High => "high",
        Urgent => "urgent",
    }
}

string_enum! {
    pub enum ReminderStatus {
        Pending => "pending",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

impl ReminderStatus {
    pub fn transition(self, next: ReminderStatus) -> Result<ReminderStatus> {
        match (self, next) {
            (ReminderStatus::Pending, ReminderStatus::Completed | ReminderStatus::Cancelled) => Ok(next),
            (from, to) => Err(Error::InvalidTransition(format!(
                "Reminder cannot move from {} to {}",
                from, to
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Reminder {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub crew_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    #[sqlx(try_from = "String")]
    pub priority: ReminderPriority,
    pub due_date: DateTime<Utc>,
    #[sqlx(try_from = "String")]
    pub status: ReminderStatus,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub created_by: Uuid,
    pub assigned_to: Option<Uuid>,
    pub completed_at: Option<DateTime<Utc>>,
    pub completed_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_reminders_complete_or_cancel() {
        assert_eq!(
            ReminderStatus::Pending.transition(ReminderStatus::Completed).unwrap(),
            ReminderStatus::Completed
        );
        assert_eq!(
            ReminderStatus::Pending.transition(ReminderStatus::Cancelled).unwrap(),
            ReminderStatus::Cancelled
        );
    }

    #[test]
    fn terminal_reminders_stay_terminal() {
        assert!(ReminderStatus::Completed.transition(ReminderStatus::Pending).is_err());
        assert!(ReminderStatus::Cancelled.transition(ReminderStatus::Completed).is_err());
        assert!(ReminderStatus::Pending.transition(ReminderStatus::Pending).is_err());
    }
}
