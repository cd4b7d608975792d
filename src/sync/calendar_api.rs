use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::calendar::{CopiedEvent, EventDraft, SourceEvent};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Request error: {0}")]
    RequestError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Rate limit exceeded")]
    RateLimited,
    #[error("Authentication failed")]
    AuthenticationFailed,
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}

/// Read side: the calendar events are mirrored from.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CalendarSource: Send + Sync {
    /// Events modified at or after `since`. Recurring series come back as
    /// their master event.
    async fn list_changed_since(
        &self,
        since: DateTime<Utc>,
        include_cancelled: bool,
    ) -> Result<Vec<SourceEvent>, ApiError>;

    /// Events occurring between `start` and `end`, ordered by start time
    /// when recurrences are expanded.
    async fn list_in_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        expand_recurrence: bool,
    ) -> Result<Vec<SourceEvent>, ApiError>;
}

/// Write side: the calendar holding the copies.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CalendarSink: Send + Sync {
    async fn find_by_correlation_tag(
        &self,
        key: &str,
        value: &str,
    ) -> Result<Vec<CopiedEvent>, ApiError>;

    async fn insert(&self, draft: &EventDraft) -> Result<CopiedEvent, ApiError>;

    async fn update(&self, id: &str, draft: &EventDraft) -> Result<CopiedEvent, ApiError>;

    async fn remove(&self, id: &str) -> Result<(), ApiError>;
}
