//! Repository trait for audit log persistence.

use crate::domain::entities::{AuditLogEntry, AuditOutcome};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Query filter for audit log listing.
#[derive(Debug, Clone)]
pub struct AuditFilter {
    pub offset: i64,
    pub limit: i64,
    pub user_id: Option<String>,
    pub status: Option<AuditOutcome>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl AuditFilter {
    pub fn new(offset: i64, limit: i64) -> Self {
        Self {
            offset,
            limit,
            user_id: None,
            status: None,
            from: None,
            to: None,
        }
    }

    pub fn with_user_id(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn with_status(mut self, status: Option<AuditOutcome>) -> Self {
        self.status = status;
        self
    }

    pub fn with_date_range(
        mut self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Self {
        self.from = from;
        self.to = to;
        self
    }
}

/// Repository interface for the audit trail.
///
/// `create` is called only by the background audit worker; its errors are
/// logged there and never reach a client.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Persists one entry.
    async fn create(&self, entry: &AuditLogEntry) -> Result<(), AppError>;

    /// Lists entries newest first.
    async fn list(&self, filter: AuditFilter) -> Result<Vec<AuditLogEntry>, AppError>;

    /// Counts entries matching the filter, ignoring pagination.
    async fn count(&self, filter: AuditFilter) -> Result<i64, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_builder() {
        let filter = AuditFilter::new(20, 10)
            .with_user_id(Some("3".to_string()))
            .with_status(Some(AuditOutcome::Failure));

        assert_eq!(filter.offset, 20);
        assert_eq!(filter.limit, 10);
        assert_eq!(filter.user_id.as_deref(), Some("3"));
        assert_eq!(filter.status, Some(AuditOutcome::Failure));
        assert!(filter.from.is_none());
    }
}
