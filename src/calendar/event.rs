use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::color::ColorTag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventStatus {
    Confirmed,
    Tentative,
    Cancelled,
}

impl EventStatus {
    pub fn from_api(value: Option<&str>) -> Self {
        match value {
            Some("cancelled") => EventStatus::Cancelled,
            Some("tentative") => EventStatus::Tentative,
            _ => EventStatus::Confirmed,
        }
    }
}

/// Start or end of an event, either a whole day or an instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventTime {
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
}

impl EventTime {
    /// All-day dates are read as midnight UTC.
    pub fn as_utc(&self) -> DateTime<Utc> {
        match self {
            EventTime::Date(date) => date.and_time(chrono::NaiveTime::MIN).and_utc(),
            EventTime::DateTime(at) => *at,
        }
    }
}

/// Snapshot of an event in the source calendar.
///
/// `start` and `end` are only ever absent on cancelled events, which the
/// Calendar API returns as bare tombstones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceEvent {
    pub id: String,
    pub status: EventStatus,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: Option<EventTime>,
    pub end: Option<EventTime>,
    pub last_modified: DateTime<Utc>,
}

impl SourceEvent {
    pub fn is_cancelled(&self) -> bool {
        self.status == EventStatus::Cancelled
    }

    pub fn starts_within(&self, from: DateTime<Utc>, until: DateTime<Utc>) -> bool {
        self.start
            .map(|start| {
                let at = start.as_utc();
                at >= from && at <= until
            })
            .unwrap_or(false)
    }
}

/// An event in the destination calendar that was mirrored from a source event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CopiedEvent {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: Option<EventTime>,
    pub end: Option<EventTime>,
    pub color: Option<ColorTag>,
    pub private_properties: BTreeMap<String, String>,
}

impl CopiedEvent {
    pub fn correlation_id(&self, tag_key: &str) -> Option<&str> {
        self.private_properties.get(tag_key).map(String::as_str)
    }

    /// True when writing `draft` would leave this copy's mirrored fields and
    /// color unchanged. Missing and empty text are treated alike because the
    /// API drops empty strings.
    pub fn matches_draft(&self, draft: &EventDraft) -> bool {
        self.title == draft.title
            && non_empty(&self.description) == non_empty(&draft.description)
            && non_empty(&self.location) == non_empty(&draft.location)
            && self.start == Some(draft.start)
            && self.end == Some(draft.end)
            && self.color == Some(draft.color)
    }
}

/// Payload written to the destination calendar on insert or update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDraft {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
    pub color: ColorTag,
    pub private_properties: BTreeMap<String, String>,
}

impl EventDraft {
    /// Mirrors the source's visible fields. Returns `None` when the source
    /// has no start or end.
    pub fn mirror(source: &SourceEvent, color: ColorTag) -> Option<Self> {
        Some(Self {
            title: source.title.clone(),
            description: source.description.clone(),
            location: source.location.clone(),
            start: source.start?,
            end: source.end?,
            color,
            private_properties: BTreeMap::new(),
        })
    }

    pub fn with_correlation_tag(mut self, tag_key: &str, source_id: &str) -> Self {
        self.private_properties
            .insert(tag_key.to_string(), source_id.to_string());
        self
    }

    pub fn with_private_properties(mut self, properties: BTreeMap<String, String>) -> Self {
        self.private_properties = properties;
        self
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
