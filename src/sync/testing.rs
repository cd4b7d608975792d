//! In-memory calendars for exercising the sync pipeline without HTTP.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::calendar::{CopiedEvent, EventDraft, EventStatus, EventTime, SourceEvent};
use crate::sync::calendar_api::{ApiError, CalendarSink, CalendarSource};

pub fn source_event(id: &str, title: &str, start: DateTime<Utc>) -> SourceEvent {
    SourceEvent {
        id: id.to_string(),
        status: EventStatus::Confirmed,
        title: title.to_string(),
        description: None,
        location: None,
        start: Some(EventTime::DateTime(start)),
        end: Some(EventTime::DateTime(start + chrono::Duration::hours(1))),
        last_modified: start - chrono::Duration::days(30),
    }
}

pub fn cancelled_event(id: &str, modified: DateTime<Utc>) -> SourceEvent {
    SourceEvent {
        id: id.to_string(),
        status: EventStatus::Cancelled,
        title: String::new(),
        description: None,
        location: None,
        start: None,
        end: None,
        last_modified: modified,
    }
}

/// Source calendar backed by a list of events. Cancelled events are only
/// visible to change listings that ask for them, as with the real API.
#[derive(Default)]
pub struct MemorySource {
    events: Mutex<Vec<SourceEvent>>,
}

impl MemorySource {
    pub fn new(events: Vec<SourceEvent>) -> Self {
        Self {
            events: Mutex::new(events),
        }
    }

    pub fn upsert(&self, event: SourceEvent) {
        let mut events = self.events.lock().unwrap();
        events.retain(|e| e.id != event.id);
        events.push(event);
    }
}

#[async_trait]
impl CalendarSource for MemorySource {
    async fn list_changed_since(
        &self,
        since: DateTime<Utc>,
        include_cancelled: bool,
    ) -> Result<Vec<SourceEvent>, ApiError> {
        let events = self.events.lock().unwrap();
        Ok(events
            .iter()
            .filter(|e| e.last_modified >= since)
            .filter(|e| include_cancelled || !e.is_cancelled())
            .cloned()
            .collect())
    }

    async fn list_in_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        _expand_recurrence: bool,
    ) -> Result<Vec<SourceEvent>, ApiError> {
        let events = self.events.lock().unwrap();
        let mut found: Vec<SourceEvent> = events
            .iter()
            .filter(|e| !e.is_cancelled() && e.starts_within(start, end))
            .cloned()
            .collect();
        found.sort_by_key(|e| e.start.map(|s| s.as_utc()));
        Ok(found)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Insert(String),
    Update(String),
    Remove(String),
}

#[derive(Default)]
struct SinkState {
    copies: BTreeMap<String, CopiedEvent>,
    mutations: Vec<Mutation>,
    next_id: usize,
}

/// Destination calendar keeping copies in memory and logging every mutation.
#[derive(Default)]
pub struct MemorySink {
    state: Mutex<SinkState>,
}

impl MemorySink {
    pub fn copies(&self) -> Vec<CopiedEvent> {
        self.state.lock().unwrap().copies.values().cloned().collect()
    }

    pub fn copies_for(&self, tag_key: &str, source_id: &str) -> Vec<CopiedEvent> {
        self.copies()
            .into_iter()
            .filter(|c| c.correlation_id(tag_key) == Some(source_id))
            .collect()
    }

    pub fn mutations(&self) -> Vec<Mutation> {
        self.state.lock().unwrap().mutations.clone()
    }

    pub fn clear_mutations(&self) {
        self.state.lock().unwrap().mutations.clear();
    }
}

fn copy_from_draft(id: String, draft: &EventDraft) -> CopiedEvent {
    CopiedEvent {
        id,
        title: draft.title.clone(),
        description: draft.description.clone(),
        location: draft.location.clone(),
        start: Some(draft.start),
        end: Some(draft.end),
        color: Some(draft.color),
        private_properties: draft.private_properties.clone(),
    }
}

#[async_trait]
impl CalendarSink for MemorySink {
    async fn find_by_correlation_tag(
        &self,
        key: &str,
        value: &str,
    ) -> Result<Vec<CopiedEvent>, ApiError> {
        Ok(self.copies_for(key, value))
    }

    async fn insert(&self, draft: &EventDraft) -> Result<CopiedEvent, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = format!("copy{}", state.next_id);
        let copy = copy_from_draft(id.clone(), draft);
        state.copies.insert(id.clone(), copy.clone());
        state.mutations.push(Mutation::Insert(id));
        Ok(copy)
    }

    async fn update(&self, id: &str, draft: &EventDraft) -> Result<CopiedEvent, ApiError> {
        let mut state = self.state.lock().unwrap();
        if !state.copies.contains_key(id) {
            return Err(ApiError::NotFound(id.to_string()));
        }
        let copy = copy_from_draft(id.to_string(), draft);
        state.copies.insert(id.to_string(), copy.clone());
        state.mutations.push(Mutation::Update(id.to_string()));
        Ok(copy)
    }

    async fn remove(&self, id: &str) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        state.mutations.push(Mutation::Remove(id.to_string()));
        match state.copies.remove(id) {
            Some(_) => Ok(()),
            None => Err(ApiError::NotFound(id.to_string())),
        }
    }
}
