//! Audit recording middleware.
//!
//! Every request produces one synchronous summary log line. Requests outside
//! the exclusion set also produce an [`AuditLogEntry`] that is handed to the
//! background worker through a bounded queue; when the queue is full the entry
//! is dropped rather than delaying the response.

use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use futures_util::{StreamExt, stream};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::time::Instant;

use crate::api::middleware::client_ip::ClientIp;
use crate::domain::entities::{AuditContext, AuditLogEntry};
use crate::domain::identity::CurrentUser;
use crate::utils::redact::redact_body;

/// Hands audit entries to the background worker.
#[derive(Clone)]
pub struct AuditRecorder {
    sender: mpsc::Sender<AuditLogEntry>,
    excluded: Arc<HashSet<String>>,
    max_body_bytes: usize,
}

impl AuditRecorder {
    pub fn new(
        sender: mpsc::Sender<AuditLogEntry>,
        excluded_paths: impl IntoIterator<Item = String>,
        max_body_bytes: usize,
    ) -> Self {
        Self {
            sender,
            excluded: Arc::new(excluded_paths.into_iter().collect()),
            max_body_bytes,
        }
    }

    /// Exact match; `/health/deep` is not excluded by `/health`.
    pub fn is_excluded(&self, path: &str) -> bool {
        self.excluded.contains(path)
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Free slots left in the queue.
    pub fn capacity(&self) -> usize {
        self.sender.capacity()
    }

    /// Enqueues `entry` without waiting. Returns false if it was dropped.
    pub fn dispatch(&self, entry: AuditLogEntry) -> bool {
        match self.sender.try_send(entry) {
            Ok(()) => true,
            Err(TrySendError::Full(entry)) => {
                metrics::counter!("audit_entries_dropped_total", "reason" => "full").increment(1);
                tracing::warn!(
                    audit_id = %entry.id,
                    action = %entry.action,
                    resource = %entry.resource,
                    "Audit queue full, dropping entry"
                );
                false
            }
            Err(TrySendError::Closed(entry)) => {
                metrics::counter!("audit_entries_dropped_total", "reason" => "closed")
                    .increment(1);
                tracing::error!(
                    audit_id = %entry.id,
                    resource = %entry.resource,
                    "Audit queue closed, dropping entry"
                );
                false
            }
        }
    }

    /// Buffers up to `max_body_bytes` of the body and puts the bytes back
    /// into the request.
    ///
    /// Bodies are read chunk by chunk whether or not `Content-Length` is
    /// declared. A body that turns out to be larger than the bound is not
    /// recorded; the chunks read so far are replayed in front of the unread
    /// remainder, so the handler still receives the whole body. A transport
    /// error while reading is replayed after those chunks, so the handler
    /// sees the same failure it would have seen without this layer.
    async fn capture_body(&self, req: Request) -> (Request, Option<String>) {
        let declared = req
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<usize>().ok());

        match declared {
            Some(0) => return (req, None),
            Some(len) if len > self.max_body_bytes => {
                tracing::warn!(
                    content_length = len,
                    max = self.max_body_bytes,
                    "Request body too large for audit capture"
                );
                return (req, None);
            }
            _ => {}
        }

        let (parts, body) = req.into_parts();
        let mut frames = body.into_data_stream();
        let mut chunks: Vec<Bytes> = Vec::new();
        let mut read = 0usize;

        while let Some(frame) = frames.next().await {
            match frame {
                Ok(chunk) => {
                    read += chunk.len();
                    chunks.push(chunk);
                    if read > self.max_body_bytes {
                        tracing::warn!(
                            read,
                            max = self.max_body_bytes,
                            "Request body too large for audit capture"
                        );
                        let replay = stream::iter(chunks.into_iter().map(Ok)).chain(frames);
                        return (Request::from_parts(parts, Body::from_stream(replay)), None);
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read request body for audit");
                    let replay = chunks
                        .into_iter()
                        .map(Ok)
                        .chain(std::iter::once(Err(e)));
                    return (
                        Request::from_parts(parts, Body::from_stream(stream::iter(replay))),
                        None,
                    );
                }
            }
        }

        if read == 0 {
            return (Request::from_parts(parts, Body::empty()), None);
        }

        let bytes = Bytes::from(chunks.concat());
        let captured = redact_body(&String::from_utf8_lossy(&bytes));
        (Request::from_parts(parts, Body::from(bytes)), Some(captured))
    }
}

/// Records the request/response cycle.
///
/// Identity comes from the response extensions (set by the authentication
/// layer further in) or, failing that, the request extensions.
pub async fn layer(
    State(recorder): State<AuditRecorder>,
    client_ip: ClientIp,
    req: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let excluded = recorder.is_excluded(&path);
    let user_agent = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let (req, request_body) = if excluded {
        (req, None)
    } else {
        recorder.capture_body(req).await
    };
    let request_user = req.extensions().get::<CurrentUser>().cloned();

    let response = next.run(req).await;

    let duration_ms = i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX);
    let status = response.status().as_u16();
    let user = response
        .extensions()
        .get::<CurrentUser>()
        .cloned()
        .or(request_user);

    tracing::info!(
        method = %method,
        path = %path,
        status,
        duration_ms,
        client_ip = %client_ip,
        user_id = user.as_ref().map(|u| u.user_id),
        "Request completed"
    );

    if !excluded {
        let (user_id, username) = match user {
            Some(u) => (Some(u.user_id), Some(u.username)),
            None => (None, None),
        };

        recorder.dispatch(AuditLogEntry::record(
            AuditContext {
                user_id,
                username,
                method,
                path,
                client_ip: client_ip.0.map(|ip| ip.to_string()),
                user_agent,
                request_body,
            },
            status,
            duration_ms,
        ));
    }

    response
}
