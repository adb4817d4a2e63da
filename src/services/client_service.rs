use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::dto::account_dto::{ClientListQuery, CreateClientPayload, UpdateClientPayload};
use crate::dto::common::{Page, Paging};
use crate::error::{Error, Result};
use crate::models::client::ClientAccount;
use crate::utils::crypto::hash_password;
use crate::utils::validation::{non_blank, normalize_email};

const CLIENT_COLUMNS: &str = "id, company_name, contact_person, email, phone, password_hash, \
     is_active, last_login_at, last_seen_at, created_at, updated_at";

#[derive(Clone)]
pub struct ClientService {
    pool: PgPool,
}

impl ClientService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ClientAccount>> {
        let client = sqlx::query_as::<_, ClientAccount>(&format!(
            "SELECT {} FROM clients WHERE id = $1",
            CLIENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(client)
    }

    pub async fn get(&self, id: Uuid) -> Result<ClientAccount> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound("Client not found".into()))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<ClientAccount>> {
        let client = sqlx::query_as::<_, ClientAccount>(&format!(
            "SELECT {} FROM clients WHERE email = $1",
            CLIENT_COLUMNS
        ))
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await?;
        Ok(client)
    }

    /// Fails with `NotFound` unless the id names an existing client account.
    pub async fn ensure_exists(&self, id: Uuid) -> Result<()> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM clients WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        if !exists {
            return Err(Error::NotFound("Client not found".into()));
        }
        Ok(())
    }

    pub async fn create(&self, payload: CreateClientPayload) -> Result<ClientAccount> {
        let password_hash = hash_password(&payload.password)?;
        let client = sqlx::query_as::<_, ClientAccount>(&format!(
            "INSERT INTO clients (id, company_name, contact_person, email, phone, password_hash) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            CLIENT_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(payload.company_name.trim())
        .bind(payload.contact_person.trim())
        .bind(normalize_email(&payload.email))
        .bind(non_blank(payload.phone))
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(client_id = %client.id, "Client account created");
        Ok(client)
    }

    pub async fn update(&self, id: Uuid, payload: UpdateClientPayload) -> Result<ClientAccount> {
        let password_hash = payload.password.as_deref().map(hash_password).transpose()?;
        let client = sqlx::query_as::<_, ClientAccount>(&format!(
            "UPDATE clients SET \
                 company_name = COALESCE($2, company_name), \
                 contact_person = COALESCE($3, contact_person), \
                 phone = COALESCE($4, phone), \
                 is_active = COALESCE($5, is_active), \
                 password_hash = COALESCE($6, password_hash), \
                 updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            CLIENT_COLUMNS
        ))
        .bind(id)
        .bind(non_blank(payload.company_name))
        .bind(non_blank(payload.contact_person))
        .bind(non_blank(payload.phone))
        .bind(payload.is_active)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Client not found".into()))?;
        Ok(client)
    }

    pub async fn list(&self, query: ClientListQuery) -> Result<Page<ClientAccount>> {
        let paging = Paging::new(query.page, query.per_page);

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM clients WHERE TRUE");
        push_client_filters(&mut count, &query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM clients WHERE TRUE",
            CLIENT_COLUMNS
        ));
        push_client_filters(&mut select, &query);
        select
            .push(" ORDER BY company_name ASC LIMIT ")
            .push_bind(paging.per_page)
            .push(" OFFSET ")
            .push_bind(paging.offset());
        let items = select
            .build_query_as::<ClientAccount>()
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(items, total, paging))
    }

    pub async fn record_login(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE clients SET last_login_at = NOW(), last_seen_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn touch_last_seen(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE clients SET last_seen_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn push_client_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &ClientListQuery) {
    if let Some(active) = query.is_active {
        qb.push(" AND is_active = ").push_bind(active);
    }
    if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = format!("%{}%", search.trim());
        qb.push(" AND (company_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR contact_person ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR email ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}
