use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, types::Json, FromRow, Row};
use uuid::Uuid;

use super::{decode_enum, decode_optional_enum};

string_enum! {
    /// Vetting state of a crew application. Admins may move a record between
    /// any two states, including re-opening a rejected record.
    pub enum CrewStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
        MissingDocs => "missing_docs",
    }
}

string_enum! {
    pub enum Rank {
        Master => "master",
        ChiefOfficer => "chief_officer",
        SecondOfficer => "second_officer",
        ThirdOfficer => "third_officer",
        ChiefEngineer => "chief_engineer",
        SecondEngineer => "second_engineer",
        ThirdEngineer => "third_engineer",
        FourthEngineer => "fourth_engineer",
        ElectroTechnicalOfficer => "electro_technical_officer",
        Bosun => "bosun",
        AbleSeaman => "able_seaman",
        OrdinarySeaman => "ordinary_seaman",
        Pumpman => "pumpman",
        Fitter => "fitter",
        Oiler => "oiler",
        Wiper => "wiper",
        ChiefCook => "chief_cook",
        Messman => "messman",
        DeckCadet => "deck_cadet",
        EngineCadet => "engine_cadet",
    }
}

string_enum! {
    pub enum VesselType {
        BulkCarrier => "bulk_carrier",
        Container => "container",
        OilTanker => "oil_tanker",
        ChemicalTanker => "chemical_tanker",
        LpgCarrier => "lpg_carrier",
        LngCarrier => "lng_carrier",
        GeneralCargo => "general_cargo",
        RoRo => "ro_ro",
        Passenger => "passenger",
        Offshore => "offshore",
        Tug => "tug",
        Other => "other",
    }
}

string_enum! {
    /// Named document categories attached to a crew application.
    pub enum DocumentSlot {
        Cv => "cv",
        Passport => "passport",
        Cdc => "cdc",
        Stcw => "stcw",
        Coc => "coc",
        SeamanBook => "seaman_book",
        Visa => "visa",
        Photo => "photo",
    }
}

impl DocumentSlot {
    /// Slots that must all be uploaded for an application to be accepted.
    pub const REQUIRED: [DocumentSlot; 7] = [
        DocumentSlot::Cv,
        DocumentSlot::Passport,
        DocumentSlot::Cdc,
        DocumentSlot::Stcw,
        DocumentSlot::Coc,
        DocumentSlot::SeamanBook,
        DocumentSlot::Visa,
    ];

    pub fn is_required(&self) -> bool {
        Self::REQUIRED.contains(self)
    }
}

/// Opaque file-store references for each document slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewDocuments {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cv: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passport: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cdc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stcw: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seaman_book: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visa: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

impl CrewDocuments {
    fn slot_mut(&mut self, slot: DocumentSlot) -> &mut Option<String> {
        match slot {
            DocumentSlot::Cv => &mut self.cv,
            DocumentSlot::Passport => &mut self.passport,
            DocumentSlot::Cdc => &mut self.cdc,
            DocumentSlot::Stcw => &mut self.stcw,
            DocumentSlot::Coc => &mut self.coc,
            DocumentSlot::SeamanBook => &mut self.seaman_book,
            DocumentSlot::Visa => &mut self.visa,
            DocumentSlot::Photo => &mut self.photo,
        }
    }

    pub fn get(&self, slot: DocumentSlot) -> Option<&str> {
        let value = match slot {
            DocumentSlot::Cv => &self.cv,
            DocumentSlot::Passport => &self.passport,
            DocumentSlot::Cdc => &self.cdc,
            DocumentSlot::Stcw => &self.stcw,
            DocumentSlot::Coc => &self.coc,
            DocumentSlot::SeamanBook => &self.seaman_book,
            DocumentSlot::Visa => &self.visa,
            DocumentSlot::Photo => &self.photo,
        };
        value.as_deref()
    }

    pub fn set(&mut self, slot: DocumentSlot, reference: String) {
        *self.slot_mut(slot) = Some(reference);
    }

    pub fn present_slots(&self) -> Vec<DocumentSlot> {
        DocumentSlot::ALL
            .iter()
            .copied()
            .filter(|slot| self.get(*slot).is_some())
            .collect()
    }
}

/// Full crew application as stored. Only admins ever receive this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrewRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub date_of_birth: NaiveDate,
    pub rank: Rank,
    pub nationality: String,
    pub current_location: Option<String>,
    pub availability_date: Option<NaiveDate>,
    pub preferred_vessel_type: Option<VesselType>,
    pub documents: CrewDocuments,
    pub status: CrewStatus,
    pub priority: bool,
    pub tags: Vec<String>,
    pub internal_comments: Option<String>,
    pub admin_notes: Option<String>,
    pub approved_for_clients: bool,
    pub client_shortlists: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for CrewRecord {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            address: row.try_get("address")?,
            date_of_birth: row.try_get("date_of_birth")?,
            rank: decode_enum(row, "rank")?,
            nationality: row.try_get("nationality")?,
            current_location: row.try_get("current_location")?,
            availability_date: row.try_get("availability_date")?,
            preferred_vessel_type: decode_optional_enum(row, "preferred_vessel_type")?,
            documents: row.try_get::<Json<CrewDocuments>, _>("documents")?.0,
            status: decode_enum(row, "status")?,
            priority: row.try_get("priority")?,
            tags: row.try_get("tags")?,
            internal_comments: row.try_get("internal_comments")?,
            admin_notes: row.try_get("admin_notes")?,
            approved_for_clients: row.try_get("approved_for_clients")?,
            client_shortlists: row.try_get("client_shortlists")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Admin list row: everything except the document references.
#[derive(Debug, Clone, Serialize)]
pub struct CrewSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub rank: Rank,
    pub nationality: String,
    pub current_location: Option<String>,
    pub availability_date: Option<NaiveDate>,
    pub preferred_vessel_type: Option<VesselType>,
    pub status: CrewStatus,
    pub priority: bool,
    pub tags: Vec<String>,
    pub approved_for_clients: bool,
    pub assigned_clients: usize,
    pub uploaded_documents: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CrewRecord> for CrewSummary {
    fn from(record: CrewRecord) -> Self {
        Self {
            uploaded_documents: record.documents.present_slots().len(),
            assigned_clients: record.client_shortlists.len(),
            id: record.id,
            name: record.name,
            email: record.email,
            phone: record.phone,
            rank: record.rank,
            nationality: record.nationality,
            current_location: record.current_location,
            availability_date: record.availability_date,
            preferred_vessel_type: record.preferred_vessel_type,
            status: record.status,
            priority: record.priority,
            tags: record.tags,
            approved_for_clients: record.approved_for_clients,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}
