use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::admin::AdminAccount;
use crate::models::principal::AdminRole;
use crate::utils::crypto::hash_password;
use crate::utils::validation::normalize_email;

const ADMIN_COLUMNS: &str = "id, name, email, password_hash, role, is_active, \
     last_login_at, last_seen_at, created_at, updated_at";

#[derive(Clone)]
pub struct AdminService {
    pool: PgPool,
}

impl AdminService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<AdminAccount>> {
        let admin = sqlx::query_as::<_, AdminAccount>(&format!(
            "SELECT {} FROM admins WHERE id = $1",
            ADMIN_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(admin)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<AdminAccount>> {
        let admin = sqlx::query_as::<_, AdminAccount>(&format!(
            "SELECT {} FROM admins WHERE email = $1",
            ADMIN_COLUMNS
        ))
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await?;
        Ok(admin)
    }

    pub async fn create(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: AdminRole,
    ) -> Result<AdminAccount> {
        let password_hash = hash_password(password)?;
        let admin = sqlx::query_as::<_, AdminAccount>(&format!(
            "INSERT INTO admins (id, name, email, password_hash, role) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            ADMIN_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(normalize_email(email))
        .bind(password_hash)
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(admin)
    }

    /// Creates the first super-admin when the table is empty. Later starts
    /// leave existing accounts untouched.
    pub async fn bootstrap(&self, email: &str, password: &str) -> Result<Option<AdminAccount>> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admins")
            .fetch_one(&self.pool)
            .await?;
        if count > 0 {
            return Ok(None);
        }
        let admin = self
            .create("Administrator", email, password, AdminRole::SuperAdmin)
            .await?;
        tracing::info!(admin_id = %admin.id, "Bootstrap super-admin created");
        Ok(Some(admin))
    }

    pub async fn record_login(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE admins SET last_login_at = NOW(), last_seen_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn touch_last_seen(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE admins SET last_seen_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
