use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Conflict(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Multipart error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("Excel export error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest(_) | Error::Json(_) | Error::Multipart(_) => StatusCode::BAD_REQUEST,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Conflict(_) => StatusCode::BAD_REQUEST,
            Error::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidTransition(_) => StatusCode::CONFLICT,
            Error::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::Reqwest(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Error::BadRequest(_) | Error::Json(_) | Error::Multipart(_) => "bad_request",
            Error::Validation(_) => "validation_failed",
            Error::Conflict(_) => "duplicate",
            Error::Unauthenticated(_) => "unauthenticated",
            Error::Forbidden(_) => "forbidden",
            Error::NotFound(_) => "not_found",
            Error::InvalidTransition(_) => "invalid_transition",
            Error::Unavailable(_) => "unavailable",
            Error::Reqwest(_) => "downstream_error",
            _ => "internal",
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let code = self.code();
        let body = match self {
            Error::Validation(err) => json!({
                "error": "Request validation failed",
                "code": code,
                "fields": err,
            }),
            Error::BadRequest(msg)
            | Error::Unauthenticated(msg)
            | Error::Forbidden(msg)
            | Error::NotFound(msg)
            | Error::Conflict(msg)
            | Error::InvalidTransition(msg)
            | Error::Unavailable(msg) => json!({ "error": msg, "code": code }),
            Error::Json(err) => json!({ "error": err.to_string(), "code": code }),
            Error::Multipart(err) => json!({ "error": err.to_string(), "code": code }),
            Error::Reqwest(err) => json!({
                "error": format!("External service error: {}", err),
                "code": code,
            }),
            other => {
                tracing::error!(error = %other, "Request failed with internal error");
                json!({ "error": "An unexpected error occurred", "code": code })
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                Error::Conflict(unique_violation_message(db_err.constraint()))
            }
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                Error::NotFound(missing_link_message(db_err.constraint()))
            }
            other => Error::Database(other),
        }
    }
}

fn unique_violation_message(constraint: Option<&str>) -> String {
    match constraint {
        Some("crew_members_email_key") => "A crew application with this email already exists".into(),
        Some("clients_email_key") => "A client account with this email already exists".into(),
        Some("admins_email_key") => "An admin account with this email already exists".into(),
        Some("client_requests_one_pending_per_pair") => {
            "A pending request for this crew member already exists".into()
        }
        _ => "Record already exists".into(),
    }
}

/// Foreign keys use the Postgres default `<table>_<column>_fkey` names.
fn missing_link_message(constraint: Option<&str>) -> String {
    let column = constraint
        .and_then(|name| name.strip_suffix("_fkey"))
        .unwrap_or_default();
    if column.ends_with("crew_id") {
        "Crew member not found".into()
    } else if column.ends_with("client_id") {
        "Client not found".into()
    } else if column.ends_with("assigned_to")
        || column.ends_with("created_by")
        || column.ends_with("responded_by")
        || column.ends_with("completed_by")
    {
        "Admin not found".into()
    } else {
        "Referenced record not found".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: Error) -> (StatusCode, serde_json::Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), 64 * 1024).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn unauthenticated_and_forbidden_are_distinct() {
        let (s1, b1) = body_json(Error::Unauthenticated("log in again".into())).await;
        let (s2, b2) = body_json(Error::Forbidden("nope".into())).await;
        assert_eq!(s1, StatusCode::UNAUTHORIZED);
        assert_eq!(s2, StatusCode::FORBIDDEN);
        assert_eq!(b1["code"], "unauthenticated");
        assert_eq!(b2["code"], "forbidden");
    }

    #[tokio::test]
    async fn duplicates_surface_as_bad_request_with_specific_code() {
        let (status, body) = body_json(Error::Conflict("dup email".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "duplicate");
        assert_eq!(body["error"], "dup email");
    }

    #[test]
    fn foreign_key_violations_name_the_missing_link() {
        assert_eq!(missing_link_message(Some("reminders_crew_id_fkey")), "Crew member not found");
        assert_eq!(missing_link_message(Some("reminders_client_id_fkey")), "Client not found");
        assert_eq!(missing_link_message(Some("reminders_assigned_to_fkey")), "Admin not found");
        assert_eq!(missing_link_message(None), "Referenced record not found");
    }

    #[tokio::test]
    async fn internal_errors_do_not_leak_details() {
        let (status, body) = body_json(Error::Internal("db password is hunter2".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "An unexpected error occurred");
    }
}
