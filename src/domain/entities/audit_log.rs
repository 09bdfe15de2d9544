//! Audit log entry recorded for every audited request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Outcome of an audited request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditOutcome {
    Success,
    Failure,
}

impl AuditOutcome {
    /// `Failure` iff the response status is 400 or above.
    pub fn from_status(status: u16) -> Self {
        if status >= 400 {
            AuditOutcome::Failure
        } else {
            AuditOutcome::Success
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuditOutcome::Success => "success",
            AuditOutcome::Failure => "failure",
        }
    }
}

impl fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(AuditOutcome::Success),
            "failure" => Ok(AuditOutcome::Failure),
            other => Err(format!("unknown audit status '{}'", other)),
        }
    }
}

/// One audited request.
///
/// Built once after the response is produced and never modified. Identity
/// fields are empty strings for unauthenticated requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditLogEntry {
    pub id: Uuid,
    pub user_id: String,
    pub username: String,
    pub action: String,
    pub resource: String,
    pub client_ip: String,
    pub user_agent: String,
    pub status: AuditOutcome,
    pub status_code: u16,
    pub request_body: String,
    pub duration_ms: i64,
    pub created_at: DateTime<Utc>,
}

/// Request facts gathered by the audit middleware.
#[derive(Debug, Clone, Default)]
pub struct AuditContext {
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub method: String,
    pub path: String,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    pub request_body: Option<String>,
}

impl AuditLogEntry {
    /// Builds an entry stamped with a fresh id and the current time.
    pub fn record(ctx: AuditContext, status_code: u16, duration_ms: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: ctx.user_id.map(|id| id.to_string()).unwrap_or_default(),
            username: ctx.username.unwrap_or_default(),
            action: ctx.method,
            resource: ctx.path,
            client_ip: ctx.client_ip.unwrap_or_default(),
            user_agent: ctx.user_agent.unwrap_or_default(),
            status: AuditOutcome::from_status(status_code),
            status_code,
            request_body: ctx.request_body.unwrap_or_default(),
            duration_ms,
            created_at: Utc::now(),
        }
    }
}
