use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

pub const DEFAULT_PER_PAGE: i64 = 20;
pub const MAX_PER_PAGE: i64 = 100;
/// Highest page whose offset still fits in an `i64`.
pub const MAX_PAGE: i64 = i64::MAX / MAX_PER_PAGE;

#[derive(Debug, Clone, Copy)]
pub struct Paging {
    pub page: i64,
    pub per_page: i64,
}

impl Paging {
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).clamp(1, MAX_PAGE),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, paging: Paging) -> Self {
        let total_pages = ((total as f64) / (paging.per_page as f64)).ceil() as i64;
        Self {
            items,
            total,
            page: paging.page,
            per_page: paging.per_page,
            total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            total_pages: self.total_pages,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BulkOutcome {
    pub id: Uuid,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Per-id report for batch operations; one failing id never aborts the rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub results: Vec<BulkOutcome>,
}

impl BulkSummary {
    pub fn from_results(results: Vec<(Uuid, Result<(), Error>)>) -> Self {
        let results: Vec<BulkOutcome> = results
            .into_iter()
            .map(|(id, outcome)| match outcome {
                Ok(()) => BulkOutcome {
                    id,
                    success: true,
                    reason: None,
                },
                Err(err) => BulkOutcome {
                    id,
                    success: false,
                    reason: Some(bulk_reason(&err)),
                },
            })
            .collect();
        let succeeded = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            results,
        }
    }
}

fn bulk_reason(err: &Error) -> String {
    match err {
        Error::NotFound(msg)
        | Error::BadRequest(msg)
        | Error::Conflict(msg)
        | Error::Forbidden(msg)
        | Error::InvalidTransition(msg) => msg.clone(),
        _ => "Internal error".to_string(),
    }
}

/// Deduplicates batch ids while keeping request order.
pub fn unique_ids(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = std::collections::HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paging_is_clamped() {
        let p = Paging::new(Some(0), Some(1000));
        assert_eq!(p.page, 1);
        assert_eq!(p.per_page, MAX_PER_PAGE);
        assert_eq!(Paging::new(Some(3), Some(10)).offset(), 20);
    }

    #[test]
    fn huge_page_numbers_do_not_overflow_the_offset() {
        let p = Paging::new(Some(i64::MAX), Some(MAX_PER_PAGE));
        assert_eq!(p.page, MAX_PAGE);
        assert!(p.offset() > 0);
        assert_eq!(Paging::new(Some(i64::MIN), None).offset(), 0);
    }

    #[test]
    fn total_pages_rounds_up() {
        let page = Page::new(vec![1, 2], 41, Paging::new(Some(1), Some(20)));
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn bulk_summary_counts_partial_failure() {
        let ok = Uuid::new_v4();
        let missing = Uuid::new_v4();
        let summary = BulkSummary::from_results(vec![
            (ok, Ok(())),
            (missing, Err(Error::NotFound("Crew member not found".into()))),
        ]);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.results[1].reason.as_deref(), Some("Crew member not found"));
        assert!(summary.results[0].reason.is_none());
    }

    #[test]
    fn unique_ids_keeps_first_occurrence_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(unique_ids(&[a, b, a]), vec![a, b]);
    }
}
