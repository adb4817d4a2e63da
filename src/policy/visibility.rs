//! Which crew records a client may see, and the redacted shape they see.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::crew::{CrewRecord, CrewStatus, DocumentSlot, Rank, VesselType};
use crate::policy::documents::CLIENT_VIEWABLE_SLOTS;

/// Deployment-wide rule for client crew visibility.
///
/// `Assigned` (the default) shows a client only crew whose `client_shortlists`
/// contains the client's id. `Approved` shows every approved and released
/// record to every client. Both require `status == approved` and
/// `approved_for_clients`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityMode {
    Assigned,
    Approved,
}

impl std::str::FromStr for VisibilityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "assigned" => Ok(VisibilityMode::Assigned),
            "approved" => Ok(VisibilityMode::Approved),
            other => Err(format!("expected 'assigned' or 'approved', got '{}'", other)),
        }
    }
}

impl VisibilityMode {
    pub fn requires_assignment(&self) -> bool {
        matches!(self, VisibilityMode::Assigned)
    }
}

/// Appends the SQL form of [`client_can_view`] over `crew_members`.
pub fn push_client_visible(qb: &mut QueryBuilder<'_, Postgres>, client_id: Uuid, mode: VisibilityMode) {
    qb.push("status = 'approved' AND approved_for_clients = TRUE AND (NOT ")
        .push_bind(mode.requires_assignment())
        .push(" OR ")
        .push_bind(client_id)
        .push(" = ANY(client_shortlists))");
}

/// Released for client browsing at all, before any assignment check.
pub fn is_released(record: &CrewRecord) -> bool {
    record.status == CrewStatus::Approved && record.approved_for_clients
}

pub fn client_can_view(record: &CrewRecord, client_id: Uuid, mode: VisibilityMode) -> bool {
    is_released(record)
        && (!mode.requires_assignment() || record.client_shortlists.contains(&client_id))
}

/// Marker returned in place of any CV reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CvAccess {
    ContactAdmin,
}

/// Client-facing crew record. Contact details, internal annotations and raw
/// document references are not fields of this type.
#[derive(Debug, Clone, Serialize)]
pub struct ClientCrewView {
    pub id: Uuid,
    pub name: String,
    pub rank: Rank,
    pub nationality: String,
    pub date_of_birth: NaiveDate,
    pub current_location: Option<String>,
    pub availability_date: Option<NaiveDate>,
    pub preferred_vessel_type: Option<VesselType>,
    pub viewable_documents: Vec<DocumentSlot>,
    pub cv: CvAccess,
    pub shortlisted: bool,
}

impl ClientCrewView {
    pub fn redact(record: &CrewRecord, client_id: Uuid) -> Self {
        let viewable_documents = record
            .documents
            .present_slots()
            .into_iter()
            .filter(|slot| CLIENT_VIEWABLE_SLOTS.contains(slot))
            .collect();

        Self {
            id: record.id,
            name: record.name.clone(),
            rank: record.rank,
            nationality: record.nationality.clone(),
            date_of_birth: record.date_of_birth,
            current_location: record.current_location.clone(),
            availability_date: record.availability_date,
            preferred_vessel_type: record.preferred_vessel_type,
            viewable_documents,
            cv: CvAccess::ContactAdmin,
            shortlisted: record.client_shortlists.contains(&client_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::testing::sample_record;

    #[test]
    fn unreleased_records_are_hidden_in_every_mode() {
        let client = Uuid::new_v4();
        for status in [CrewStatus::Pending, CrewStatus::Rejected, CrewStatus::MissingDocs] {
            let mut record = sample_record();
            record.status = status;
            record.approved_for_clients = true;
            record.client_shortlists = vec![client];
            assert!(!client_can_view(&record, client, VisibilityMode::Assigned));
            assert!(!client_can_view(&record, client, VisibilityMode::Approved));
        }

        let mut record = sample_record();
        record.status = CrewStatus::Approved;
        record.approved_for_clients = false;
        record.client_shortlists = vec![client];
        assert!(!client_can_view(&record, client, VisibilityMode::Approved));
    }

    #[test]
    fn assigned_mode_requires_membership() {
        let c1 = Uuid::new_v4();
        let c2 = Uuid::new_v4();
        let mut record = sample_record();
        record.status = CrewStatus::Approved;
        record.approved_for_clients = true;
        record.client_shortlists = vec![c1];

        assert!(client_can_view(&record, c1, VisibilityMode::Assigned));
        assert!(!client_can_view(&record, c2, VisibilityMode::Assigned));
        assert!(client_can_view(&record, c2, VisibilityMode::Approved));
    }

    #[test]
    fn redacted_view_never_carries_private_fields() {
        let client = Uuid::new_v4();
        let mut record = sample_record();
        record.internal_comments = Some("prefers short contracts".into());
        record.admin_notes = Some("called twice".into());
        record.tags = vec!["vip".into()];
        record.priority = true;
        record.address = Some("12 Harbour Road".into());
        record.client_shortlists = vec![client, Uuid::new_v4()];

        let view = ClientCrewView::redact(&record, client);
        let json = serde_json::to_value(&view).unwrap();
        let obj = json.as_object().unwrap();
        for key in [
            "email",
            "phone",
            "address",
            "internal_comments",
            "admin_notes",
            "tags",
            "priority",
            "documents",
            "client_shortlists",
        ] {
            assert!(!obj.contains_key(key), "client view leaked {key}");
        }

        let text = json.to_string();
        assert!(!text.contains(&record.email));
        assert!(!text.contains(&record.phone));
        assert!(!text.contains(record.documents.cv.as_deref().unwrap()));
        assert_eq!(json["cv"], "contact_admin");
        assert_eq!(json["shortlisted"], true);
    }

    #[test]
    fn redacted_view_lists_only_viewable_uploaded_slots() {
        let record = sample_record();
        let view = ClientCrewView::redact(&record, Uuid::new_v4());
        assert!(!view.viewable_documents.contains(&DocumentSlot::Cv));
        assert!(view.viewable_documents.contains(&DocumentSlot::Passport));
        assert!(!view.viewable_documents.contains(&DocumentSlot::Photo));
        assert!(!view.shortlisted);
    }

    #[test]
    fn sql_predicate_binds_mode_then_client() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT id FROM crew_members WHERE ");
        push_client_visible(&mut qb, Uuid::new_v4(), VisibilityMode::Assigned);
        let sql = qb.sql();
        assert!(sql.contains("status = 'approved'"));
        assert!(sql.contains("(NOT $1 OR $2 = ANY(client_shortlists))"));
    }

    #[test]
    fn visibility_mode_parses_from_config() {
        assert_eq!("Assigned".parse::<VisibilityMode>(), Ok(VisibilityMode::Assigned));
        assert_eq!("approved".parse::<VisibilityMode>(), Ok(VisibilityMode::Approved));
        assert!("everyone".parse::<VisibilityMode>().is_err());
    }
}
