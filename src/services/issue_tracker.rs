use async_trait::async_trait;
use serde::Serialize;

use crate::config::BackendCredentials;
use crate::error::AppResult;

/// User id handed out by the backend's login call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionUid(pub u64);

/// The only fields sent to the helpdesk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HelpdeskRecord {
    pub name: String,
    pub description: String,
    pub priority: String,
}

#[async_trait]
pub trait IssueTrackerService: Send + Sync {
    async fn authenticate(&self, credentials: &BackendCredentials) -> AppResult<SessionUid>;

    /// Creates one record and returns its id.
    async fn create_ticket(
        &self,
        credentials: &BackendCredentials,
        uid: SessionUid,
        record: &HelpdeskRecord,
    ) -> AppResult<u64>;
}
