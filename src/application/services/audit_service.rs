//! Read access to the audit trail.

use std::sync::Arc;

use crate::domain::entities::AuditLogEntry;
use crate::domain::repositories::{AuditFilter, AuditRepository};
use crate::error::AppError;
use serde_json::json;

/// Service for querying recorded audit entries.
///
/// Writes never pass through here; they go from the audit middleware to the
/// background worker.
pub struct AuditService<R: AuditRepository + ?Sized> {
    repository: Arc<R>,
}

impl<R: AuditRepository + ?Sized> AuditService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Returns one page of entries, newest first, plus the filtered total.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `from` is after `to`.
    pub async fn list(&self, filter: AuditFilter) -> Result<(Vec<AuditLogEntry>, i64), AppError> {
        if let (Some(from), Some(to)) = (filter.from, filter.to)
            && from > to
        {
            return Err(AppError::bad_request(
                "Invalid date range",
                json!({ "reason": "'from' must not be after 'to'" }),
            ));
        }

        let entries = self.repository.list(filter.clone()).await?;
        let total = self.repository.count(filter).await?;
        Ok((entries, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::AuditOutcome;
    use crate::domain::repositories::MockAuditRepository;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_list_passes_filter_through() {
        let mut repo = MockAuditRepository::new();
        repo.expect_list()
            .withf(|f| f.status == Some(AuditOutcome::Failure) && f.limit == 25)
            .returning(|_| Ok(vec![]));
        repo.expect_count().returning(|_| Ok(12));

        let filter = AuditFilter::new(0, 25).with_status(Some(AuditOutcome::Failure));
        let (entries, total) = AuditService::new(Arc::new(repo)).list(filter).await.unwrap();

        assert!(entries.is_empty());
        assert_eq!(total, 12);
    }

    #[tokio::test]
    async fn test_inverted_range_rejected() {
        let mut repo = MockAuditRepository::new();
        repo.expect_list().times(0);

        let now = Utc::now();
        let filter = AuditFilter::new(0, 25).with_date_range(Some(now), Some(now - Duration::hours(1)));

        let result = AuditService::new(Arc::new(repo)).list(filter).await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }
}
