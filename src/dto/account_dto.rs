use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::principal::Principal;
use crate::utils::validation::trimmed;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 256))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
    pub principal: Principal,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateClientPayload {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 200))]
    pub company_name: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 200))]
    pub contact_person: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 5, max = 32))]
    pub phone: Option<String>,
    #[validate(length(min = 8, max = 256))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct UpdateClientPayload {
    #[validate(length(min = 1, max = 200))]
    pub company_name: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub contact_person: Option<String>,
    #[validate(length(min = 5, max = 32))]
    pub phone: Option<String>,
    pub is_active: Option<bool>,
    #[validate(length(min = 8, max = 256))]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ClientListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}
