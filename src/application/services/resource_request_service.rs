//! Resource request filing and the approval workflow.

use std::sync::Arc;

use crate::domain::entities::{
    NewResourceRequest, RequestStatus, ResourceRequest, StatusTransition,
};
use crate::domain::identity::CurrentUser;
use crate::domain::repositories::{ResourceRequestFilter, ResourceRequestRepository};
use crate::error::AppError;
use serde_json::json;

/// Service for resource requests.
///
/// Members file and cancel their own requests; admins see everything and
/// decide on pending ones. Every transition is conditional on the request
/// still being pending, so two concurrent reviews cannot both succeed.
pub struct ResourceRequestService<R: ResourceRequestRepository> {
    repository: Arc<R>,
}

impl<R: ResourceRequestRepository> ResourceRequestService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub async fn create(
        &self,
        caller: &CurrentUser,
        resource_type: String,
        quantity: i32,
        justification: String,
    ) -> Result<ResourceRequest, AppError> {
        let request = self
            .repository
            .create(NewResourceRequest {
                requester_id: caller.user_id,
                resource_type,
                quantity,
                justification,
            })
            .await?;

        tracing::info!(
            request_id = request.id,
            requester_id = caller.user_id,
            resource_type = %request.resource_type,
            quantity = request.quantity,
            "Resource request filed"
        );
        Ok(request)
    }

    /// Lists requests visible to `caller`: all for admins, own otherwise.
    pub async fn list(
        &self,
        caller: &CurrentUser,
        status: Option<RequestStatus>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<ResourceRequest>, i64), AppError> {
        let filter = ResourceRequestFilter {
            offset,
            limit,
            requester_id: (!caller.is_admin()).then_some(caller.user_id),
            status,
        };

        let requests = self.repository.list(filter.clone()).await?;
        let total = self.repository.count(filter).await?;
        Ok((requests, total))
    }

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for unknown ids and [`AppError::Forbidden`]
    /// when a member asks for someone else's request.
    pub async fn get(&self, caller: &CurrentUser, id: i64) -> Result<ResourceRequest, AppError> {
        let request = self.find(id).await?;
        caller.require_self_or_admin(request.requester_id)?;
        Ok(request)
    }

    pub async fn approve(
        &self,
        caller: &CurrentUser,
        id: i64,
        comment: Option<String>,
    ) -> Result<ResourceRequest, AppError> {
        caller.require_admin()?;
        self.transition(caller, id, RequestStatus::Approved, comment)
            .await
    }

    pub async fn reject(
        &self,
        caller: &CurrentUser,
        id: i64,
        comment: Option<String>,
    ) -> Result<ResourceRequest, AppError> {
        caller.require_admin()?;
        self.transition(caller, id, RequestStatus::Rejected, comment)
            .await
    }

    /// Withdraws a pending request. Only its requester may cancel it.
    pub async fn cancel(&self, caller: &CurrentUser, id: i64) -> Result<ResourceRequest, AppError> {
        let request = self.find(id).await?;
        if request.requester_id != caller.user_id {
            return Err(AppError::forbidden(
                "Only the requester can cancel a request",
                json!({ "id": id }),
            ));
        }
        self.transition(caller, id, RequestStatus::Cancelled, None)
            .await
    }

    async fn find(&self, id: i64) -> Result<ResourceRequest, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Resource request not found", json!({ "id": id })))
    }

    async fn transition(
        &self,
        caller: &CurrentUser,
        id: i64,
        to: RequestStatus,
        comment: Option<String>,
    ) -> Result<ResourceRequest, AppError> {
        let current = self.find(id).await?;

        if !current.status.can_transition_to(to) {
            return Err(invalid_transition(id, current.status, to));
        }

        let reviewer_id = (to != RequestStatus::Cancelled).then_some(caller.user_id);

        let updated = self
            .repository
            .transition(
                id,
                StatusTransition {
                    from: current.status,
                    to,
                    reviewer_id,
                    comment,
                },
            )
            .await?
            // Another reviewer got there first
            .ok_or_else(|| invalid_transition(id, current.status, to))?;

        tracing::info!(request_id = id, actor_id = caller.user_id, status = %to, "Resource request updated");
        Ok(updated)
    }
}

fn invalid_transition(id: i64, from: RequestStatus, to: RequestStatus) -> AppError {
    AppError::conflict(
        format!("Request cannot move from {} to {}", from, to),
        json!({ "id": id, "status": from }),
    )
}
