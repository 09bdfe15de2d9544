//! Resource request entity and its approval state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a resource request.
///
/// Only `Pending` requests move; every other state is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Cancelled => "cancelled",
        }
    }

    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        *self == RequestStatus::Pending && next != RequestStatus::Pending
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "approved" => Ok(RequestStatus::Approved),
            "rejected" => Ok(RequestStatus::Rejected),
            "cancelled" => Ok(RequestStatus::Cancelled),
            other => Err(format!("unknown request status '{}'", other)),
        }
    }
}

/// A request for lab resources awaiting (or past) review.
#[derive(Debug, Clone)]
pub struct ResourceRequest {
    pub id: i64,
    pub requester_id: i64,
    pub resource_type: String,
    pub quantity: i32,
    pub justification: String,
    pub status: RequestStatus,
    pub reviewer_id: Option<i64>,
    pub review_comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input data for filing a new request.
#[derive(Debug, Clone)]
pub struct NewResourceRequest {
    pub requester_id: i64,
    pub resource_type: String,
    pub quantity: i32,
    pub justification: String,
}

/// A state change applied only if the request is still in `from`.
#[derive(Debug, Clone)]
pub struct StatusTransition {
    pub from: RequestStatus,
    pub to: RequestStatus,
    pub reviewer_id: Option<i64>,
    pub comment: Option<String>,
}
