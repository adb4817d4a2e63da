use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::principal::{AdminPrincipal, AdminRole};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AdminAccount {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[sqlx(try_from = "String")]
    pub role: AdminRole,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub last_seen_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AdminAccount {
    pub fn principal(&self) -> AdminPrincipal {
        AdminPrincipal {
            id: self.id,
            role: self.role,
            is_active: self.is_active,
        }
    }
}
