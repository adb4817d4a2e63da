//! Per-role document slot rules.

use crate::error::{Error, Result};
use crate::models::crew::{CrewDocuments, DocumentSlot};

/// Slots a client may open inline. The CV is deliberately absent.
pub const CLIENT_VIEWABLE_SLOTS: [DocumentSlot; 7] = [
    DocumentSlot::Passport,
    DocumentSlot::Cdc,
    DocumentSlot::Stcw,
    DocumentSlot::Coc,
    DocumentSlot::SeamanBook,
    DocumentSlot::Visa,
    DocumentSlot::Photo,
];

pub const CV_FORBIDDEN_MESSAGE: &str =
    "CV documents are not available to clients, please contact an administrator for access";

/// Accepts the storage spelling plus the camelCase form used by older clients.
pub fn parse_slot(raw: &str) -> Option<DocumentSlot> {
    match raw {
        "seamanBook" => Some(DocumentSlot::SeamanBook),
        other => other.parse().ok(),
    }
}

/// Resolves a client-requested slot name. Anything outside the allow-list,
/// including names that match no slot at all, is a policy violation.
pub fn client_viewable_slot(raw: &str) -> Result<DocumentSlot> {
    match parse_slot(raw) {
        Some(DocumentSlot::Cv) => Err(Error::Forbidden(CV_FORBIDDEN_MESSAGE.into())),
        Some(slot) if CLIENT_VIEWABLE_SLOTS.contains(&slot) => Ok(slot),
        _ => Err(Error::Forbidden(format!(
            "Document type '{}' is not available to clients",
            raw
        ))),
    }
}

/// Admins may fetch any known slot; unknown names are plain bad input.
pub fn admin_slot(raw: &str) -> Result<DocumentSlot> {
    parse_slot(raw).ok_or_else(|| Error::BadRequest(format!("Unknown document type '{}'", raw)))
}

pub fn missing_required(documents: &CrewDocuments) -> Vec<DocumentSlot> {
    DocumentSlot::REQUIRED
        .iter()
        .copied()
        .filter(|slot| documents.get(*slot).is_none())
        .collect()
}

pub fn content_type_for(reference: &str) -> &'static str {
    let ext = reference
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "txt" => "text/plain; charset=utf-8",
        "rtf" => "application/rtf",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creation_gate_needs_all_seven_required_slots() {
        let mut docs = CrewDocuments::default();
        assert_eq!(missing_required(&docs).len(), 7);

        for (i, slot) in DocumentSlot::REQUIRED.iter().enumerate() {
            docs.set(*slot, format!("crew/{i}.pdf"));
        }
        assert!(missing_required(&docs).is_empty());
        assert!(docs.photo.is_none());

        docs.stcw = None;
        assert_eq!(missing_required(&docs), vec![DocumentSlot::Stcw]);
    }

    #[test]
    fn cv_is_never_client_viewable() {
        assert!(matches!(client_viewable_slot("cv"), Err(Error::Forbidden(_))));
    }

    #[test]
    fn unknown_slots_are_forbidden_not_missing() {
        for raw in ["medical", "../etc/passwd", "", "CV", "Passport"] {
            assert!(
                matches!(client_viewable_slot(raw), Err(Error::Forbidden(_))),
                "{raw} should be forbidden"
            );
        }
    }

    #[test]
    fn allow_listed_slots_resolve() {
        assert_eq!(client_viewable_slot("passport").unwrap(), DocumentSlot::Passport);
        assert_eq!(client_viewable_slot("seamanBook").unwrap(), DocumentSlot::SeamanBook);
        assert_eq!(client_viewable_slot("seaman_book").unwrap(), DocumentSlot::SeamanBook);
        assert_eq!(client_viewable_slot("photo").unwrap(), DocumentSlot::Photo);
    }

    #[test]
    fn admins_may_fetch_the_cv() {
        assert_eq!(admin_slot("cv").unwrap(), DocumentSlot::Cv);
        assert!(matches!(admin_slot("medical"), Err(Error::BadRequest(_))));
    }

    #[test]
    fn content_type_follows_extension() {
        assert_eq!(content_type_for("crew/x.PDF"), "application/pdf");
        assert_eq!(content_type_for("crew/x.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("crew/x"), "application/octet-stream");
    }
}
