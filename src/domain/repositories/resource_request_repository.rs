//! Repository trait for resource requests.

use crate::domain::entities::{
    NewResourceRequest, RequestStatus, ResourceRequest, StatusTransition,
};
use crate::error::AppError;
use async_trait::async_trait;

/// Query filter for listing requests.
#[derive(Debug, Clone)]
pub struct ResourceRequestFilter {
    pub offset: i64,
    pub limit: i64,
    /// Restricts to one requester; `None` lists everyone's.
    pub requester_id: Option<i64>,
    pub status: Option<RequestStatus>,
}

/// Repository interface for resource requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResourceRequestRepository: Send + Sync {
    async fn create(&self, request: NewResourceRequest) -> Result<ResourceRequest, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<ResourceRequest>, AppError>;

    /// Lists requests newest first.
    async fn list(&self, filter: ResourceRequestFilter) -> Result<Vec<ResourceRequest>, AppError>;

    async fn count(&self, filter: ResourceRequestFilter) -> Result<i64, AppError>;

    /// Applies `transition` only if the request is still in `transition.from`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(request))` with the updated row
    /// - `Ok(None)` if the request does not exist or already left `from`
    async fn transition(
        &self,
        id: i64,
        transition: StatusTransition,
    ) -> Result<Option<ResourceRequest>, AppError>;
}
