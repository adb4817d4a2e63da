use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

use super::principal::PrincipalKind;
use crate::error::{Error, Result};

string_enum! {
    pub enum RequestType {
        Interview => "interview",
        Booking => "booking",
        HoldCandidate => "hold_candidate",
        MoreInformation => "more_information",
    }
}

string_enum! {
    pub enum Urgency {
        Normal => "normal",
        Urgent => "urgent",
        Asap => "asap",
    }
}

string_enum! {
    /// Lifecycle of a client request. Only `Pending` can move, and only by an
    /// admin response.
    pub enum RequestStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
        Completed => "completed",
    }
}

string_enum! {
    /// Outcome an admin may record when answering a request.
    pub enum RequestResolution {
        Approved => "approved",
        Rejected => "rejected",
        Completed => "completed",
    }
}

impl From<RequestResolution> for RequestStatus {
    fn from(resolution: RequestResolution) -> Self {
        match resolution {
            RequestResolution::Approved => RequestStatus::Approved,
            RequestResolution::Rejected => RequestStatus::Rejected,
            RequestResolution::Completed => RequestStatus::Completed,
        }
    }
}

impl RequestStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }

    pub fn resolve(self, resolution: RequestResolution) -> Result<RequestStatus> {
        if self.is_terminal() {
            return Err(Error::InvalidTransition(format!(
                "Request is already {} and cannot be changed",
                self
            )));
        }
        Ok(resolution.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUp {
    pub message: String,
    pub author_role: PrincipalKind,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ClientRequest {
    pub id: Uuid,
    pub client_id: Uuid,
    pub crew_id: Uuid,
    #[sqlx(try_from = "String")]
    pub request_type: RequestType,
    pub message: String,
    #[sqlx(try_from = "String")]
    pub urgency: Urgency,
    #[sqlx(try_from = "String")]
    pub status: RequestStatus,
    pub admin_response: Option<String>,
    pub responded_by: Option<Uuid>,
    pub requested_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
    pub follow_ups: Json<Vec<FollowUp>>,
    pub updated_at: DateTime<Utc>,
}
