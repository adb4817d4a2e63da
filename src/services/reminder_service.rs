use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::dto::common::{Page, Paging};
use crate::dto::reminder_dto::{CreateReminderPayload, ReminderListQuery, UpdateReminderPayload};
use crate::error::{Error, Result};
use crate::models::reminder::{Reminder, ReminderPriority, ReminderStatus};
use crate::policy::tags::normalize_tags;
use crate::utils::validation::non_blank;

const REMINDER_COLUMNS: &str = "id, title, description, crew_id, client_id, priority, due_date, \
     status, notes, tags, created_by, assigned_to, completed_at, completed_by, created_at, updated_at";

#[derive(Clone)]
pub struct ReminderService {
    pool: PgPool,
}

impl ReminderService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, admin_id: Uuid, payload: CreateReminderPayload) -> Result<Reminder> {
        let reminder = sqlx::query_as::<_, Reminder>(&format!(
            "INSERT INTO reminders (\
                 id, title, description, crew_id, client_id, priority, due_date, \
                 status, notes, tags, created_by, assigned_to\
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending', $8, $9, $10, $11) RETURNING {}",
            REMINDER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(payload.title.trim())
        .bind(non_blank(payload.description))
        .bind(payload.crew_id)
        .bind(payload.client_id)
        .bind(payload.priority.unwrap_or(ReminderPriority::Medium).as_str())
        .bind(payload.due_date)
        .bind(non_blank(payload.notes))
        .bind(normalize_tags(payload.tags))
        .bind(admin_id)
        .bind(payload.assigned_to)
        .fetch_one(&self.pool)
        .await?;
        Ok(reminder)
    }

    pub async fn get(&self, id: Uuid) -> Result<Reminder> {
        sqlx::query_as::<_, Reminder>(&format!(
            "SELECT {} FROM reminders WHERE id = $1",
            REMINDER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(reminder_not_found)
    }

    pub async fn list(&self, query: ReminderListQuery) -> Result<Page<Reminder>> {
        let paging = Paging::new(query.page, query.per_page);

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM reminders WHERE TRUE");
        push_reminder_filters(&mut count, &query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM reminders WHERE TRUE",
            REMINDER_COLUMNS
        ));
        push_reminder_filters(&mut select, &query);
        select
            .push(" ORDER BY due_date ASC LIMIT ")
            .push_bind(paging.per_page)
            .push(" OFFSET ")
            .push_bind(paging.offset());
        let items = select
            .build_query_as::<Reminder>()
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(items, total, paging))
    }

    /// Edits content fields. Status only moves through `complete`/`cancel`.
    pub async fn update(&self, id: Uuid, payload: UpdateReminderPayload) -> Result<Reminder> {
        let reminder = sqlx::query_as::<_, Reminder>(&format!(
            "UPDATE reminders SET \
                 title = COALESCE($2, title), \
                 description = COALESCE($3, description), \
                 crew_id = COALESCE($4, crew_id), \
                 client_id = COALESCE($5, client_id), \
                 priority = COALESCE($6, priority), \
                 due_date = COALESCE($7, due_date), \
                 notes = COALESCE($8, notes), \
                 tags = COALESCE($9, tags), \
                 assigned_to = COALESCE($10, assigned_to), \
                 updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            REMINDER_COLUMNS
        ))
        .bind(id)
        .bind(non_blank(payload.title))
        .bind(payload.description)
        .bind(payload.crew_id)
        .bind(payload.client_id)
        .bind(payload.priority.map(|p| p.as_str()))
        .bind(payload.due_date)
        .bind(payload.notes)
        .bind(payload.tags.map(normalize_tags))
        .bind(payload.assigned_to)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(reminder_not_found)?;
        Ok(reminder)
    }

    pub async fn complete(&self, id: Uuid, admin_id: Uuid) -> Result<Reminder> {
        self.finish(id, admin_id, ReminderStatus::Completed).await
    }

    pub async fn cancel(&self, id: Uuid, admin_id: Uuid) -> Result<Reminder> {
        self.finish(id, admin_id, ReminderStatus::Cancelled).await
    }

    async fn finish(&self, id: Uuid, admin_id: Uuid, next: ReminderStatus) -> Result<Reminder> {
        let current = self.get(id).await?;
        let next = current.status.transition(next)?;

        sqlx::query_as::<_, Reminder>(&format!(
            "UPDATE reminders SET \
                 status = $2, \
                 completed_at = CASE WHEN $2 = 'completed' THEN NOW() ELSE NULL END, \
                 completed_by = CASE WHEN $2 = 'completed' THEN $3 ELSE NULL END, \
                 updated_at = NOW() \
             WHERE id = $1 AND status = 'pending' RETURNING {}",
            REMINDER_COLUMNS
        ))
        .bind(id)
        .bind(next.as_str())
        .bind(admin_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::InvalidTransition("Reminder is no longer pending".into()))
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM reminders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(reminder_not_found());
        }
        Ok(())
    }

    pub async fn overdue_count(&self) -> Result<i64> {
        let count = sqlx::query_scalar(
            "SELECT COUNT(*) FROM reminders WHERE status = 'pending' AND due_date < NOW()",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Pending reminders due before the end of the current UTC day, earliest first.
    pub async fn due_today(&self, limit: i64) -> Result<Vec<Reminder>> {
        let items = sqlx::query_as::<_, Reminder>(&format!(
            "SELECT {} FROM reminders \
             WHERE status = 'pending' AND due_date < date_trunc('day', NOW()) + INTERVAL '1 day' \
             ORDER BY due_date ASC LIMIT $1",
            REMINDER_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }
}

fn reminder_not_found() -> Error {
    Error::NotFound("Reminder not found".into())
}

fn push_reminder_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &ReminderListQuery) {
    if let Some(status) = query.status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(priority) = query.priority {
        qb.push(" AND priority = ").push_bind(priority.as_str());
    }
    if let Some(crew_id) = query.crew_id {
        qb.push(" AND crew_id = ").push_bind(crew_id);
    }
    if let Some(client_id) = query.client_id {
        qb.push(" AND client_id = ").push_bind(client_id);
    }
    if let Some(assigned_to) = query.assigned_to {
        qb.push(" AND assigned_to = ").push_bind(assigned_to);
    }
    if query.overdue == Some(true) {
        qb.push(" AND status = 'pending' AND due_date < NOW()");
    }
}
