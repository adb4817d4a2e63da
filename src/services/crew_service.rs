use serde::Serialize;
use sqlx::{types::Json, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::dto::common::{unique_ids, BulkSummary, Page, Paging};
use crate::dto::crew_dto::{ClientCrewQuery, CrewListQuery, NewCrewRecord, UpdateCrewPayload};
use crate::error::{Error, Result};
use crate::models::crew::{CrewRecord, CrewStatus, CrewSummary};
use crate::policy::documents::missing_required;
use crate::policy::tags::normalize_tags;
use crate::policy::visibility::{push_client_visible, ClientCrewView, VisibilityMode};
use crate::services::client_service::ClientService;
use crate::utils::validation::{non_blank, normalize_email};

const CREW_COLUMNS: &str = "id, name, email, phone, address, date_of_birth, rank, nationality, \
     current_location, availability_date, preferred_vessel_type, documents, status, priority, \
     tags, internal_comments, admin_notes, approved_for_clients, client_shortlists, \
     created_at, updated_at";

#[derive(Debug, Clone, Default, Serialize)]
pub struct CrewStatusCounts {
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
    pub missing_docs: i64,
    pub priority: i64,
    pub released_to_clients: i64,
}

#[derive(Clone)]
pub struct CrewService {
    pool: PgPool,
    clients: ClientService,
}

impl CrewService {
    pub fn new(pool: PgPool, clients: ClientService) -> Self {
        Self { pool, clients }
    }

    /// Stores a new application as `pending`. Every required document slot
    /// must already hold a file reference.
    pub async fn register(&self, new: NewCrewRecord) -> Result<CrewRecord> {
        let missing = missing_required(&new.documents);
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(|slot| slot.as_str()).collect();
            return Err(Error::BadRequest(format!(
                "Missing required documents: {}",
                names.join(", ")
            )));
        }

        let profile = new.profile;
        let email = normalize_email(&profile.email);
        if self.email_exists(&email).await? {
            return Err(Error::Conflict(
                "A crew application with this email already exists".into(),
            ));
        }

        let record = sqlx::query_as::<_, CrewRecord>(&format!(
            "INSERT INTO crew_members (\
                 id, name, email, phone, address, date_of_birth, rank, nationality, \
                 current_location, availability_date, preferred_vessel_type, documents, status\
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, 'pending') \
             RETURNING {}",
            CREW_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(profile.name.trim())
        .bind(email)
        .bind(profile.phone.trim())
        .bind(non_blank(profile.address))
        .bind(profile.date_of_birth)
        .bind(profile.rank.as_str())
        .bind(profile.nationality.trim())
        .bind(non_blank(profile.current_location))
        .bind(profile.availability_date)
        .bind(profile.preferred_vessel_type.map(|v| v.as_str()))
        .bind(Json(&new.documents))
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(crew_id = %record.id, rank = %record.rank, "Crew application registered");
        Ok(record)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let exists = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM crew_members WHERE email = $1)")
            .bind(normalize_email(email))
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    pub async fn get(&self, id: Uuid) -> Result<CrewRecord> {
        sqlx::query_as::<_, CrewRecord>(&format!(
            "SELECT {} FROM crew_members WHERE id = $1",
            CREW_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(crew_not_found)
    }

    pub async fn list(&self, query: CrewListQuery) -> Result<Page<CrewSummary>> {
        let paging = Paging::new(query.page, query.per_page);

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM crew_members WHERE TRUE");
        push_admin_filters(&mut count, &query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM crew_members WHERE TRUE",
            CREW_COLUMNS
        ));
        push_admin_filters(&mut select, &query);
        select
            .push(" ORDER BY priority DESC, created_at DESC LIMIT ")
            .push_bind(paging.per_page)
            .push(" OFFSET ")
            .push_bind(paging.offset());
        let records = select
            .build_query_as::<CrewRecord>()
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(records, total, paging).map(CrewSummary::from))
    }

    /// Records for an admin export: the given ids, or every record when none
    /// are named. A named selection also reports which ids had no record.
    pub async fn list_for_export(
        &self,
        ids: Option<Vec<Uuid>>,
    ) -> Result<(Vec<CrewRecord>, Option<BulkSummary>)> {
        let ids = ids.map(|ids| unique_ids(&ids)).filter(|ids| !ids.is_empty());
        let mut select = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM crew_members",
            CREW_COLUMNS
        ));
        if let Some(ids) = &ids {
            select.push(" WHERE id = ANY(").push_bind(ids.clone()).push(")");
        }
        select.push(" ORDER BY created_at DESC");
        let records = select
            .build_query_as::<CrewRecord>()
            .fetch_all(&self.pool)
            .await?;
        let summary = ids.map(|ids| export_outcomes(&ids, &records));
        Ok((records, summary))
    }

    /// Admin annotations and profile corrections. Absent fields are left as is.
    pub async fn update(&self, id: Uuid, payload: UpdateCrewPayload) -> Result<CrewRecord> {
        let record = sqlx::query_as::<_, CrewRecord>(&format!(
            "UPDATE crew_members SET \
                 priority = COALESCE($2, priority), \
                 approved_for_clients = COALESCE($3, approved_for_clients), \
                 internal_comments = COALESCE($4, internal_comments), \
                 admin_notes = COALESCE($5, admin_notes), \
                 rank = COALESCE($6, rank), \
                 nationality = COALESCE($7, nationality), \
                 current_location = COALESCE($8, current_location), \
                 availability_date = COALESCE($9, availability_date), \
                 preferred_vessel_type = COALESCE($10, preferred_vessel_type), \
                 phone = COALESCE($11, phone), \
                 address = COALESCE($12, address), \
                 updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            CREW_COLUMNS
        ))
        .bind(id)
        .bind(payload.priority)
        .bind(payload.approved_for_clients)
        .bind(payload.internal_comments)
        .bind(payload.admin_notes)
        .bind(payload.rank.map(|r| r.as_str()))
        .bind(non_blank(payload.nationality))
        .bind(non_blank(payload.current_location))
        .bind(payload.availability_date)
        .bind(payload.preferred_vessel_type.map(|v| v.as_str()))
        .bind(non_blank(payload.phone))
        .bind(non_blank(payload.address))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(crew_not_found)?;
        Ok(record)
    }

    /// Moves a record to any status. A supplied tag list replaces the
    /// current tags in the same statement.
    pub async fn set_status(
        &self,
        id: Uuid,
        status: CrewStatus,
        tags: Option<Vec<String>>,
    ) -> Result<CrewRecord> {
        let tags = tags.map(normalize_tags);
        let record = sqlx::query_as::<_, CrewRecord>(&format!(
            "UPDATE crew_members SET \
                 status = $2, \
                 tags = COALESCE($3, tags), \
                 updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            CREW_COLUMNS
        ))
        .bind(id)
        .bind(status.as_str())
        .bind(tags)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(crew_not_found)?;

        tracing::info!(crew_id = %id, status = %status, "Crew status changed");
        Ok(record)
    }

    /// Set union of existing and supplied tags, computed inside the UPDATE so
    /// concurrent merges cannot drop each other's tags.
    pub async fn merge_tags(&self, id: Uuid, tags: Vec<String>) -> Result<CrewRecord> {
        let tags = normalize_tags(tags);
        let record = sqlx::query_as::<_, CrewRecord>(&format!(
            "UPDATE crew_members SET \
                 tags = ARRAY(SELECT DISTINCT t FROM unnest(tags || $2::text[]) AS t ORDER BY t), \
                 updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            CREW_COLUMNS
        ))
        .bind(id)
        .bind(tags)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(crew_not_found)?;
        Ok(record)
    }

    pub async fn bulk_set_status(
        &self,
        ids: &[Uuid],
        status: CrewStatus,
        tags: Option<Vec<String>>,
    ) -> Result<BulkSummary> {
        let mut results = Vec::new();
        for id in unique_ids(ids) {
            let outcome = self.set_status(id, status, tags.clone()).await.map(|_| ());
            results.push((id, outcome));
        }
        Ok(BulkSummary::from_results(results))
    }

    pub async fn bulk_merge_tags(&self, ids: &[Uuid], tags: Vec<String>) -> Result<BulkSummary> {
        let mut results = Vec::new();
        for id in unique_ids(ids) {
            let outcome = self.merge_tags(id, tags.clone()).await.map(|_| ());
            results.push((id, outcome));
        }
        Ok(BulkSummary::from_results(results))
    }

    /// Adds the client to the record's shortlist. Re-assigning is a no-op.
    pub async fn assign(&self, id: Uuid, client_id: Uuid) -> Result<CrewRecord> {
        self.clients.ensure_exists(client_id).await?;
        self.append_shortlist(id, client_id).await
    }

    async fn append_shortlist(&self, id: Uuid, client_id: Uuid) -> Result<CrewRecord> {
        sqlx::query_as::<_, CrewRecord>(&format!(
            "UPDATE crew_members SET \
                 client_shortlists = CASE WHEN $2 = ANY(client_shortlists) \
                     THEN client_shortlists ELSE array_append(client_shortlists, $2) END, \
                 updated_at = CASE WHEN $2 = ANY(client_shortlists) THEN updated_at ELSE NOW() END \
             WHERE id = $1 RETURNING {}",
            CREW_COLUMNS
        ))
        .bind(id)
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(crew_not_found)
    }

    pub async fn unassign(&self, id: Uuid, client_id: Uuid) -> Result<CrewRecord> {
        sqlx::query_as::<_, CrewRecord>(&format!(
            "UPDATE crew_members SET \
                 client_shortlists = array_remove(client_shortlists, $2), \
                 updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            CREW_COLUMNS
        ))
        .bind(id)
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(crew_not_found)
    }

    /// Assigns many records to one client. An unknown client fails the whole
    /// batch; unknown crew ids fail individually.
    pub async fn bulk_assign(&self, ids: &[Uuid], client_id: Uuid) -> Result<BulkSummary> {
        self.clients.ensure_exists(client_id).await?;
        let mut results = Vec::new();
        for id in unique_ids(ids) {
            let outcome = self.append_shortlist(id, client_id).await.map(|_| ());
            results.push((id, outcome));
        }
        Ok(BulkSummary::from_results(results))
    }

    /// Crew currently assigned to a client, regardless of release state.
    pub async fn assigned_to_client(&self, client_id: Uuid) -> Result<Vec<CrewSummary>> {
        self.clients.ensure_exists(client_id).await?;
        let records = sqlx::query_as::<_, CrewRecord>(&format!(
            "SELECT {} FROM crew_members WHERE $1 = ANY(client_shortlists) ORDER BY name ASC",
            CREW_COLUMNS
        ))
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(records.into_iter().map(CrewSummary::from).collect())
    }

    pub async fn list_for_client(
        &self,
        client_id: Uuid,
        mode: VisibilityMode,
        query: ClientCrewQuery,
    ) -> Result<Page<ClientCrewView>> {
        let paging = Paging::new(query.page, query.per_page);

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM crew_members WHERE ");
        push_client_visible(&mut count, client_id, mode);
        push_client_filters(&mut count, &query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM crew_members WHERE ",
            CREW_COLUMNS
        ));
        push_client_visible(&mut select, client_id, mode);
        push_client_filters(&mut select, &query);
        select
            .push(" ORDER BY availability_date ASC NULLS LAST, name ASC LIMIT ")
            .push_bind(paging.per_page)
            .push(" OFFSET ")
            .push_bind(paging.offset());
        let records = select
            .build_query_as::<CrewRecord>()
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(records, total, paging).map(|record| ClientCrewView::redact(&record, client_id)))
    }

    /// Every record visible to the client, already redacted.
    pub async fn export_for_client(
        &self,
        client_id: Uuid,
        mode: VisibilityMode,
    ) -> Result<Vec<ClientCrewView>> {
        let mut select = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM crew_members WHERE ",
            CREW_COLUMNS
        ));
        push_client_visible(&mut select, client_id, mode);
        select.push(" ORDER BY name ASC");
        let records = select
            .build_query_as::<CrewRecord>()
            .fetch_all(&self.pool)
            .await?;
        Ok(records
            .iter()
            .map(|record| ClientCrewView::redact(record, client_id))
            .collect())
    }

    /// The full record, but only when the client may see it. Invisible and
    /// missing records are indistinguishable to the caller.
    pub async fn get_for_client(
        &self,
        id: Uuid,
        client_id: Uuid,
        mode: VisibilityMode,
    ) -> Result<CrewRecord> {
        let mut select = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM crew_members WHERE id = ",
            CREW_COLUMNS
        ));
        select.push_bind(id).push(" AND ");
        push_client_visible(&mut select, client_id, mode);
        select
            .build_query_as::<CrewRecord>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(crew_not_found)
    }

    /// Client self-service shortlist. Only crew the client can already see
    /// may be added.
    pub async fn shortlist_add(
        &self,
        id: Uuid,
        client_id: Uuid,
        mode: VisibilityMode,
    ) -> Result<CrewRecord> {
        self.get_for_client(id, client_id, mode).await?;
        self.append_shortlist(id, client_id).await
    }

    /// Removing an entry that is not there succeeds.
    pub async fn shortlist_remove(&self, id: Uuid, client_id: Uuid) -> Result<()> {
        sqlx::query(
            "UPDATE crew_members SET \
                 client_shortlists = array_remove(client_shortlists, $2), \
                 updated_at = NOW() \
             WHERE id = $1 AND $2 = ANY(client_shortlists)",
        )
        .bind(id)
        .bind(client_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn status_counts(&self) -> Result<CrewStatusCounts> {
        let row: (i64, i64, i64, i64, i64, i64, i64) = sqlx::query_as(
            "SELECT \
                 COUNT(*), \
                 COUNT(*) FILTER (WHERE status = 'pending'), \
                 COUNT(*) FILTER (WHERE status = 'approved'), \
                 COUNT(*) FILTER (WHERE status = 'rejected'), \
                 COUNT(*) FILTER (WHERE status = 'missing_docs'), \
                 COUNT(*) FILTER (WHERE priority), \
                 COUNT(*) FILTER (WHERE status = 'approved' AND approved_for_clients) \
             FROM crew_members",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(CrewStatusCounts {
            total: row.0,
            pending: row.1,
            approved: row.2,
            rejected: row.3,
            missing_docs: row.4,
            priority: row.5,
            released_to_clients: row.6,
        })
    }
}

fn crew_not_found() -> Error {
    Error::NotFound("Crew member not found".into())
}

fn push_admin_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &CrewListQuery) {
    if let Some(status) = query.status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(rank) = query.rank {
        qb.push(" AND rank = ").push_bind(rank.as_str());
    }
    if let Some(nationality) = query.nationality.as_deref().filter(|s| !s.trim().is_empty()) {
        qb.push(" AND nationality ILIKE ").push_bind(nationality.trim().to_string());
    }
    if let Some(vessel) = query.vessel_type {
        qb.push(" AND preferred_vessel_type = ").push_bind(vessel.as_str());
    }
    if let Some(priority) = query.priority {
        qb.push(" AND priority = ").push_bind(priority);
    }
    if let Some(released) = query.approved_for_clients {
        qb.push(" AND approved_for_clients = ").push_bind(released);
    }
    if let Some(tag) = query.tag.as_deref().filter(|s| !s.trim().is_empty()) {
        qb.push(" AND ").push_bind(tag.trim().to_string()).push(" = ANY(tags)");
    }
    if let Some(client_id) = query.client_id {
        qb.push(" AND ").push_bind(client_id).push(" = ANY(client_shortlists)");
    }
    if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = format!("%{}%", search.trim());
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR email ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR phone ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

fn push_client_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &ClientCrewQuery) {
    if let Some(rank) = query.rank {
        qb.push(" AND rank = ").push_bind(rank.as_str());
    }
    if let Some(nationality) = query.nationality.as_deref().filter(|s| !s.trim().is_empty()) {
        qb.push(" AND nationality ILIKE ").push_bind(nationality.trim().to_string());
    }
    if let Some(vessel) = query.vessel_type {
        qb.push(" AND preferred_vessel_type = ").push_bind(vessel.as_str());
    }
    if let Some(before) = query.available_before {
        qb.push(" AND (availability_date IS NULL OR availability_date <= ")
            .push_bind(before)
            .push(")");
    }
    if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = format!("%{}%", search.trim());
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR current_location ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

/// Per-id outcome of a named export selection.
fn export_outcomes(requested: &[Uuid], found: &[CrewRecord]) -> BulkSummary {
    BulkSummary::from_results(
        requested
            .iter()
            .map(|id| {
                let outcome = if found.iter().any(|record| record.id == *id) {
                    Ok(())
                } else {
                    Err(crew_not_found())
                };
                (*id, outcome)
            })
            .collect(),
    )
}
