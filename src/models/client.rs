use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::principal::ClientPrincipal;

/// A company account that browses assigned crew and raises requests.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ClientAccount {
    pub id: Uuid,
    pub company_name: String,
    pub contact_person: String,
    pub email: String,
    pub phone: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub last_seen_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClientAccount {
    pub fn principal(&self) -> ClientPrincipal {
        ClientPrincipal {
            id: self.id,
            is_active: self.is_active,
        }
    }
}
