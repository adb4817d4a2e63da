use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use sqlx::{types::Json, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::dto::common::{Page, Paging};
use crate::dto::request_dto::{CreateRequestPayload, RequestListQuery, RespondPayload};
use crate::error::{Error, Result};
use crate::models::client_request::{ClientRequest, FollowUp, RequestStatus, Urgency};
use crate::models::principal::{Principal, PrincipalKind};
use crate::policy::visibility::VisibilityMode;
use crate::services::client_service::ClientService;
use crate::services::crew_service::CrewService;
use crate::services::notification_service::{notify_detached, Notifier, NotifyChannel};

const REQUEST_COLUMNS: &str = "id, client_id, crew_id, request_type, message, urgency, status, \
     admin_response, responded_by, requested_at, responded_at, follow_ups, updated_at";

#[derive(Clone)]
pub struct RequestService {
    pool: PgPool,
    crew: CrewService,
    clients: ClientService,
    notifier: Arc<dyn Notifier>,
    visibility: VisibilityMode,
}

impl RequestService {
    pub fn new(
        pool: PgPool,
        crew: CrewService,
        clients: ClientService,
        notifier: Arc<dyn Notifier>,
        visibility: VisibilityMode,
    ) -> Self {
        Self {
            pool,
            crew,
            clients,
            notifier,
            visibility,
        }
    }

    /// Opens a pending request for a crew member the client can see. A
    /// client holds at most one pending request per crew member.
    pub async fn submit(&self, client_id: Uuid, payload: CreateRequestPayload) -> Result<ClientRequest> {
        let crew = self
            .crew
            .get_for_client(payload.crew_id, client_id, self.visibility)
            .await?;

        let pending: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM client_requests \
             WHERE client_id = $1 AND crew_id = $2 AND status = 'pending')",
        )
        .bind(client_id)
        .bind(crew.id)
        .fetch_one(&self.pool)
        .await?;
        if pending {
            return Err(Error::Conflict(
                "A pending request for this crew member already exists".into(),
            ));
        }

        let urgency = payload.urgency.unwrap_or(Urgency::Normal);
        let request = sqlx::query_as::<_, ClientRequest>(&format!(
            "INSERT INTO client_requests (id, client_id, crew_id, request_type, message, urgency, status) \
             VALUES ($1, $2, $3, $4, $5, $6, 'pending') RETURNING {}",
            REQUEST_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(client_id)
        .bind(crew.id)
        .bind(payload.request_type.as_str())
        .bind(payload.message.trim())
        .bind(urgency.as_str())
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            request_id = %request.id,
            %client_id,
            crew_id = %crew.id,
            request_type = %request.request_type,
            "Client request submitted"
        );
        notify_detached(
            self.notifier.clone(),
            NotifyChannel::Webhook,
            "admins".to_string(),
            json!({
                "event": "request_submitted",
                "request_id": request.id,
                "client_id": client_id,
                "crew_id": crew.id,
                "crew_name": crew.name,
                "request_type": request.request_type,
                "urgency": request.urgency,
            }),
        );
        Ok(request)
    }

    pub async fn get(&self, id: Uuid) -> Result<ClientRequest> {
        sqlx::query_as::<_, ClientRequest>(&format!(
            "SELECT {} FROM client_requests WHERE id = $1",
            REQUEST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(request_not_found)
    }

    /// A request as seen by the client that owns it. Someone else's request
    /// is a 403, an unknown id a 404.
    pub async fn get_for_client(&self, id: Uuid, client_id: Uuid) -> Result<ClientRequest> {
        let request = self.get(id).await?;
        ensure_owner(&request, client_id)?;
        Ok(request)
    }

    pub async fn list(&self, query: RequestListQuery) -> Result<Page<ClientRequest>> {
        self.list_filtered(query, None).await
    }

    /// Only the client's own requests, whatever `client_id` the query names.
    pub async fn list_for_client(
        &self,
        client_id: Uuid,
        query: RequestListQuery,
    ) -> Result<Page<ClientRequest>> {
        self.list_filtered(query, Some(client_id)).await
    }

    async fn list_filtered(
        &self,
        query: RequestListQuery,
        owner: Option<Uuid>,
    ) -> Result<Page<ClientRequest>> {
        let paging = Paging::new(query.page, query.per_page);
        let client_filter = owner.or(query.client_id);

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM client_requests WHERE TRUE");
        push_request_filters(&mut count, &query, client_filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM client_requests WHERE TRUE",
            REQUEST_COLUMNS
        ));
        push_request_filters(&mut select, &query, client_filter);
        select
            .push(" ORDER BY requested_at DESC LIMIT ")
            .push_bind(paging.per_page)
            .push(" OFFSET ")
            .push_bind(paging.offset());
        let items = select
            .build_query_as::<ClientRequest>()
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(items, total, paging))
    }

    /// Resolves a pending request. The status guard sits in the UPDATE itself
    /// so two admins racing on one request cannot both win.
    pub async fn respond(
        &self,
        id: Uuid,
        admin_id: Uuid,
        payload: RespondPayload,
    ) -> Result<ClientRequest> {
        let current = self.get(id).await?;
        let next = current.status.resolve(payload.status)?;

        let updated = sqlx::query_as::<_, ClientRequest>(&format!(
            "UPDATE client_requests SET \
                 status = $2, admin_response = $3, responded_by = $4, \
                 responded_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND status = 'pending' RETURNING {}",
            REQUEST_COLUMNS
        ))
        .bind(id)
        .bind(next.as_str())
        .bind(payload.admin_response.trim())
        .bind(admin_id)
        .fetch_optional(&self.pool)
        .await?;

        let request = match updated {
            Some(request) => request,
            None => {
                let latest = self.get(id).await?;
                return Err(Error::InvalidTransition(format!(
                    "Request is already {} and cannot be changed",
                    latest.status
                )));
            }
        };

        tracing::info!(request_id = %id, %admin_id, status = %request.status, "Client request answered");
        self.notify_client_of_response(&request).await;
        Ok(request)
    }

    async fn notify_client_of_response(&self, request: &ClientRequest) {
        let client = match self.clients.find_by_id(request.client_id).await {
            Ok(Some(client)) => client,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(error = %e, request_id = %request.id, "Could not load client for notification");
                return;
            }
        };
        notify_detached(
            self.notifier.clone(),
            NotifyChannel::Email,
            client.email,
            json!({
                "event": "request_responded",
                "request_id": request.id,
                "crew_id": request.crew_id,
                "company_name": client.company_name,
                "status": request.status,
                "admin_response": request.admin_response,
                "responded_at": request.responded_at,
            }),
        );
    }

    /// Appends a note to the request's thread. Clients may only write on
    /// their own requests; follow-ups never change the status.
    pub async fn add_follow_up(
        &self,
        id: Uuid,
        author: &Principal,
        message: &str,
    ) -> Result<ClientRequest> {
        if let Principal::Client(client) = author {
            let request = self.get(id).await?;
            ensure_owner(&request, client.id)?;
        }

        let entry = FollowUp {
            message: message.trim().to_string(),
            author_role: author.kind(),
            author_id: author.id(),
            created_at: Utc::now(),
        };
        let request = sqlx::query_as::<_, ClientRequest>(&format!(
            "UPDATE client_requests SET \
                 follow_ups = follow_ups || $2::jsonb, updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            REQUEST_COLUMNS
        ))
        .bind(id)
        .bind(Json(vec![entry]))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(request_not_found)?;

        if author.kind() == PrincipalKind::Admin {
            self.notify_client_of_follow_up(&request, message).await;
        }
        Ok(request)
    }

    async fn notify_client_of_follow_up(&self, request: &ClientRequest, message: &str) {
        if let Ok(Some(client)) = self.clients.find_by_id(request.client_id).await {
            notify_detached(
                self.notifier.clone(),
                NotifyChannel::Email,
                client.email,
                json!({
                    "event": "request_follow_up",
                    "request_id": request.id,
                    "message": message,
                }),
            );
        }
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM client_requests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(request_not_found());
        }
        tracing::info!(request_id = %id, "Client request deleted");
        Ok(())
    }

    pub async fn status_counts(&self) -> Result<Vec<(RequestStatus, i64)>> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM client_requests GROUP BY status")
                .fetch_all(&self.pool)
                .await?;
        let counts = RequestStatus::ALL
            .iter()
            .map(|status| {
                let n = rows
                    .iter()
                    .find(|(raw, _)| raw == status.as_str())
                    .map(|(_, n)| *n)
                    .unwrap_or(0);
                (*status, n)
            })
            .collect();
        Ok(counts)
    }
}

fn request_not_found() -> Error {
    Error::NotFound("Request not found".into())
}

fn ensure_owner(request: &ClientRequest, client_id: Uuid) -> Result<()> {
    if request.client_id != client_id {
        return Err(Error::Forbidden(
            "This request belongs to another client".into(),
        ));
    }
    Ok(())
}

fn push_request_filters(
    qb: &mut QueryBuilder<'_, Postgres>,
    query: &RequestListQuery,
    client_id: Option<Uuid>,
) {
    if let Some(client_id) = client_id {
        qb.push(" AND client_id = ").push_bind(client_id);
    }
    if let Some(crew_id) = query.crew_id {
        qb.push(" AND crew_id = ").push_bind(crew_id);
    }
    if let Some(status) = query.status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(request_type) = query.request_type {
        qb.push(" AND request_type = ").push_bind(request_type.as_str());
    }
    if let Some(urgency) = query.urgency {
        qb.push(" AND urgency = ").push_bind(urgency.as_str());
    }
}
