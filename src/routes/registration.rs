use std::collections::HashMap;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use chrono::NaiveDate;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::dto::crew_dto::{CreateCrewPayload, NewCrewRecord, RegisterCrewResponse};
use crate::error::{Error, Result};
use crate::models::crew::{CrewDocuments, DocumentSlot, Rank};
use crate::policy::documents::{missing_required, parse_slot};
use crate::utils::validation::non_blank;
use crate::AppState;

struct Upload {
    filename: String,
    data: Bytes,
}

/// Multipart body of a crew application: text fields plus one file part
/// per document slot, named after the slot.
#[derive(Default)]
struct RegistrationForm {
    fields: HashMap<String, String>,
    files: Vec<(DocumentSlot, Upload)>,
}

impl RegistrationForm {
    async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut form = RegistrationForm::default();
        while let Some(field) = multipart.next_field().await.map_err(|e| {
            tracing::error!("Failed to read multipart field: {}", e);
            Error::BadRequest(e.to_string())
        })? {
            let name = field.name().unwrap_or_default().to_string();
            match parse_slot(&name) {
                Some(slot) => {
                    let filename = field
                        .file_name()
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("{}.bin", slot));
                    let data = field.bytes().await.map_err(|e| {
                        tracing::error!("Failed to read document bytes: {}", e);
                        Error::BadRequest("Failed to read file upload".into())
                    })?;
                    if !data.is_empty() {
                        form.files.retain(|(existing, _)| *existing != slot);
                        form.files.push((slot, Upload { filename, data }));
                    }
                }
                None => {
                    let value = field.text().await?;
                    form.fields.insert(name, value);
                }
            }
        }
        Ok(form)
    }

    fn text(&self, key: &str) -> Option<String> {
        non_blank(self.fields.get(key).cloned())
    }

    /// Parses an optional typed field, recording a field error when the raw
    /// value is present but malformed.
    fn parsed<T>(
        &self,
        key: &'static str,
        code: &'static str,
        parse: impl Fn(&str) -> Option<T>,
        errors: &mut ValidationErrors,
    ) -> Option<T> {
        let raw = self.text(key)?;
        let value = parse(&raw);
        if value.is_none() {
            errors.add(key, field_error(code, format!("'{}' is not a valid value", raw)));
        }
        value
    }

    /// Every problem with the text fields is reported as a field error, in
    /// the same shape as JSON payload validation.
    fn profile(&self) -> Result<CreateCrewPayload> {
        let mut errors = ValidationErrors::new();
        let date = |raw: &str| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok();

        let rank = self.parsed("rank", "rank", |raw| raw.parse().ok(), &mut errors);
        let date_of_birth = self.parsed("date_of_birth", "date", date, &mut errors);
        let availability_date = self.parsed("availability_date", "date", date, &mut errors);
        let preferred_vessel_type =
            self.parsed("preferred_vessel_type", "vessel_type", |raw| raw.parse().ok(), &mut errors);
        for (key, present) in [
            ("rank", rank.is_some() || self.text("rank").is_some()),
            ("date_of_birth", date_of_birth.is_some() || self.text("date_of_birth").is_some()),
        ] {
            if !present {
                errors.add(key, field_error("required", format!("{} is required", key)));
            }
        }

        let profile = CreateCrewPayload {
            name: self.text("name").unwrap_or_default(),
            email: self.text("email").unwrap_or_default(),
            phone: self.text("phone").unwrap_or_default(),
            address: self.text("address"),
            date_of_birth: date_of_birth.unwrap_or(NaiveDate::MIN),
            rank: rank.unwrap_or(Rank::AbleSeaman),
            nationality: self.text("nationality").unwrap_or_default(),
            current_location: self.text("current_location"),
            availability_date,
            preferred_vessel_type,
        };
        if let Err(field_errors) = profile.validate() {
            for (field, kind) in field_errors.into_errors() {
                if let ValidationErrorsKind::Field(list) = kind {
                    for err in list {
                        errors.add(field, err);
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(profile)
        } else {
            Err(Error::Validation(errors))
        }
    }

    /// Slots that carry an uploaded file, before anything is stored.
    fn uploaded_slots(&self) -> CrewDocuments {
        let mut documents = CrewDocuments::default();
        for (slot, _) in &self.files {
            documents.set(*slot, String::new());
        }
        documents
    }
}

/// Public crew application. The profile and the presence of every required
/// document are checked before any file is written.
pub async fn register_crew(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<RegisterCrewResponse>)> {
    let form = RegistrationForm::read(multipart).await?;
    let profile = form.profile()?;

    let missing = missing_required(&form.uploaded_slots());
    if !missing.is_empty() {
        let names: Vec<&str> = missing.iter().map(|slot| slot.as_str()).collect();
        return Err(Error::BadRequest(format!(
            "Missing required documents: {}",
            names.join(", ")
        )));
    }
    if state.crew_service.email_exists(&profile.email).await? {
        return Err(Error::Conflict(
            "A crew application with this email already exists".into(),
        ));
    }

    let mut documents = CrewDocuments::default();
    let mut stored = Vec::new();
    for (slot, upload) in form.files {
        match state.file_store.store(&upload.filename, upload.data).await {
            Ok(reference) => {
                stored.push(reference.clone());
                documents.set(slot, reference);
            }
            Err(e) => {
                discard(&state, &stored).await;
                return Err(e);
            }
        }
    }

    match state
        .crew_service
        .register(NewCrewRecord { profile, documents })
        .await
    {
        Ok(record) => Ok((
            StatusCode::CREATED,
            Json(RegisterCrewResponse {
                id: record.id,
                status: record.status,
            }),
        )),
        Err(e) => {
            discard(&state, &stored).await;
            Err(e)
        }
    }
}

fn field_error(code: &'static str, message: String) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

async fn discard(state: &AppState, references: &[String]) {
    for reference in references {
        if let Err(e) = state.file_store.remove(reference).await {
            tracing::warn!(error = %e, %reference, "Failed to remove orphaned upload");
        }
    }
}
