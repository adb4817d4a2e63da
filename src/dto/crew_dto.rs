use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::crew::{CrewDocuments, CrewStatus, Rank, VesselType};

/// Profile fields of a public crew application. Documents travel separately
/// as multipart file parts.
#[derive(Debug, Clone, Validate)]
pub struct CreateCrewPayload {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 5, max = 32))]
    pub phone: String,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    pub date_of_birth: NaiveDate,
    pub rank: Rank,
    #[validate(length(min = 1, max = 100))]
    pub nationality: String,
    #[validate(length(max = 200))]
    pub current_location: Option<String>,
    pub availability_date: Option<NaiveDate>,
    pub preferred_vessel_type: Option<VesselType>,
}

#[derive(Debug, Clone)]
pub struct NewCrewRecord {
    pub profile: CreateCrewPayload,
    pub documents: CrewDocuments,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterCrewResponse {
    pub id: Uuid,
    pub status: CrewStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CrewListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<CrewStatus>,
    pub rank: Option<Rank>,
    pub nationality: Option<String>,
    pub vessel_type: Option<VesselType>,
    pub priority: Option<bool>,
    pub approved_for_clients: Option<bool>,
    pub tag: Option<String>,
    pub client_id: Option<Uuid>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ClientCrewQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub rank: Option<Rank>,
    pub nationality: Option<String>,
    pub vessel_type: Option<VesselType>,
    pub available_before: Option<NaiveDate>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct UpdateCrewPayload {
    pub priority: Option<bool>,
    pub approved_for_clients: Option<bool>,
    #[validate(length(max = 5000))]
    pub internal_comments: Option<String>,
    #[validate(length(max = 5000))]
    pub admin_notes: Option<String>,
    pub rank: Option<Rank>,
    #[validate(length(min = 1, max = 100))]
    pub nationality: Option<String>,
    #[validate(length(max = 200))]
    pub current_location: Option<String>,
    pub availability_date: Option<NaiveDate>,
    pub preferred_vessel_type: Option<VesselType>,
    #[validate(length(min = 5, max = 32))]
    pub phone: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
}

/// Status change. A supplied `tags` list replaces the record's tag set.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SetStatusPayload {
    pub status: CrewStatus,
    #[validate(length(max = 50))]
    pub tags: Option<Vec<String>>,
}

/// Additive tag update: the result is the union of old and new tags.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MergeTagsPayload {
    #[validate(length(min = 1, max = 50))]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BulkStatusPayload {
    #[validate(length(min = 1, max = 500))]
    pub ids: Vec<Uuid>,
    pub status: CrewStatus,
    #[validate(length(max = 50))]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BulkTagsPayload {
    #[validate(length(min = 1, max = 500))]
    pub ids: Vec<Uuid>,
    #[validate(length(min = 1, max = 50))]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BulkAssignPayload {
    #[validate(length(min = 1, max = 500))]
    pub ids: Vec<Uuid>,
    pub client_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BulkExportPayload {
    #[validate(length(min = 1, max = 500))]
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct ExportCrewPayload {
    #[validate(length(max = 500))]
    pub ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortlistResponse {
    pub crew_id: Uuid,
    pub client_id: Uuid,
    pub shortlisted: bool,
}
