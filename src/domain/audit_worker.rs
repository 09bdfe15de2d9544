use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::domain::entities::AuditLogEntry;
use crate::domain::repositories::AuditRepository;

/// Drains the audit queue into the repository.
///
/// Writes are best-effort: a failed write is logged, counted and dropped, and
/// the worker moves on. Runs until every sender is dropped.
pub async fn run_audit_worker(
    mut rx: mpsc::Receiver<AuditLogEntry>,
    repository: Arc<dyn AuditRepository>,
) {
    info!("Audit worker started");

    while let Some(entry) = rx.recv().await {
        match repository.create(&entry).await {
            Ok(()) => debug!(audit_id = %entry.id, "Audit entry persisted"),
            Err(e) => {
                metrics::counter!("audit_write_failures_total").increment(1);
                error!(
                    audit_id = %entry.id,
                    action = %entry.action,
                    resource = %entry.resource,
                    error = %e,
                    "Failed to persist audit entry"
                );
            }
        }
    }

    info!("Audit worker stopped: queue closed");
}
