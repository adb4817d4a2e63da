use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::client_request::{RequestResolution, RequestStatus, RequestType, Urgency};
use crate::utils::validation::trimmed;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateRequestPayload {
    pub crew_id: Uuid,
    pub request_type: RequestType,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 2000))]
    pub message: String,
    pub urgency: Option<Urgency>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RespondPayload {
    pub status: RequestResolution,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 4000))]
    pub admin_response: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FollowUpPayload {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 2000))]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RequestListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<RequestStatus>,
    pub request_type: Option<RequestType>,
    pub urgency: Option<Urgency>,
    pub client_id: Option<Uuid>,
    pub crew_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedRequestResponse {
    pub id: Uuid,
    pub status: RequestStatus,
}
