use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::{ColorTag, CopiedEvent, EventDraft, EventStatus, EventTime, SourceEvent};
use crate::sync::calendar_api::{ApiError, CalendarSink, CalendarSource};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";
const PAGE_SIZE: &str = "250";

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start: Option<GoogleDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end: Option<GoogleDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    color_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    extended_properties: Option<ExtendedProperties>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleDateTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ExtendedProperties {
    #[serde(default)]
    private: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventListResponse {
    items: Option<Vec<GoogleEvent>>,
    next_page_token: Option<String>,
}

/// Calendar API v3 client bound to a single calendar.
pub struct GoogleCalendarClient {
    base_url: String,
    access_token: String,
    calendar_id: String,
    client: reqwest::Client,
}

impl GoogleCalendarClient {
    pub fn new(access_token: String, calendar_id: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token,
            calendar_id: calendar_id.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    fn events_url(&self) -> String {
        format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(&self.calendar_id)
        )
    }

    fn event_url(&self, event_id: &str) -> String {
        format!("{}/{}", self.events_url(), urlencoding::encode(event_id))
    }

    async fn list_events(&self, query: &[(&str, String)]) -> Result<Vec<GoogleEvent>, ApiError> {
        let url = self.events_url();
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(&url)
                .bearer_auth(&self.access_token)
                .query(query)
                .query(&[("maxResults", PAGE_SIZE)]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = request.send().await?;
            let response = ensure_success(response, &self.calendar_id).await?;
            let page: EventListResponse = response.json().await?;

            events.extend(page.items.unwrap_or_default());

            match page.next_page_token {
                Some(token) if token.is_empty() => break,
                Some(token) if page_token.as_deref() == Some(token.as_str()) => {
                    tracing::warn!("{} repeated page token, stopping listing", self.calendar_id);
                    break;
                }
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        tracing::debug!("Listed {} raw events from {}", events.len(), self.calendar_id);
        Ok(events)
    }

    fn convert_source_events(&self, raw: Vec<GoogleEvent>) -> Vec<SourceEvent> {
        raw.into_iter()
            .filter_map(|ge| match source_event_from_google(ge) {
                Ok(event) => Some(event),
                Err(e) => {
                    tracing::warn!("Skipping unreadable event in {}: {}", self.calendar_id, e);
                    None
                }
            })
            .collect()
    }
}

#[async_trait]
impl CalendarSource for GoogleCalendarClient {
    async fn list_changed_since(
        &self,
        since: DateTime<Utc>,
        include_cancelled: bool,
    ) -> Result<Vec<SourceEvent>, ApiError> {
        tracing::info!("Fetching events in {} updated since {}", self.calendar_id, since);

        let raw = self
            .list_events(&[
                ("updatedMin", rfc3339(since)),
                ("showDeleted", include_cancelled.to_string()),
                ("singleEvents", "false".to_string()),
            ])
            .await?;

        Ok(self.convert_source_events(raw))
    }

    async fn list_in_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        expand_recurrence: bool,
    ) -> Result<Vec<SourceEvent>, ApiError> {
        tracing::info!("Fetching events in {} from {} to {}", self.calendar_id, start, end);

        let mut query = vec![
            ("timeMin", rfc3339(start)),
            ("timeMax", rfc3339(end)),
            ("singleEvents", expand_recurrence.to_string()),
        ];
        // The API only orders by start time over expanded instances.
        if expand_recurrence {
            query.push(("orderBy", "startTime".to_string()));
        }

        let raw = self.list_events(&query).await?;
        Ok(self.convert_source_events(raw))
    }
}

#[async_trait]
impl CalendarSink for GoogleCalendarClient {
    async fn find_by_correlation_tag(
        &self,
        key: &str,
        value: &str,
    ) -> Result<Vec<CopiedEvent>, ApiError> {
        let raw = self
            .list_events(&[("privateExtendedProperty", format!("{key}={value}"))])
            .await?;

        Ok(raw
            .into_iter()
            .filter_map(|ge| match copied_event_from_google(ge) {
                Ok(event) => Some(event),
                Err(e) => {
                    tracing::warn!("Skipping unreadable copy in {}: {}", self.calendar_id, e);
                    None
                }
            })
            .collect())
    }

    async fn insert(&self, draft: &EventDraft) -> Result<CopiedEvent, ApiError> {
        let url = self.events_url();
        let payload = google_event_from_draft(draft);

        tracing::debug!("POST {} with payload: {:?}", url, payload);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&payload)
            .send()
            .await?;
        let response = ensure_success(response, &self.calendar_id).await?;

        let created: GoogleEvent = response.json().await?;
        copied_event_from_google(created)
    }

    async fn update(&self, id: &str, draft: &EventDraft) -> Result<CopiedEvent, ApiError> {
        let url = self.event_url(id);
        let payload = google_event_from_draft(draft);

        tracing::debug!("PUT {} with payload: {:?}", url, payload);

        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.access_token)
            .json(&payload)
            .send()
            .await?;
        let response = ensure_success(response, id).await?;

        let updated: GoogleEvent = response.json().await?;
        copied_event_from_google(updated)
    }

    async fn remove(&self, id: &str) -> Result<(), ApiError> {
        let url = self.event_url(id);

        tracing::debug!("DELETE {}", url);

        let response = self
            .client
            .delete(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        ensure_success(response, id).await?;

        Ok(())
    }
}

async fn ensure_success(
    response: reqwest::Response,
    resource: &str,
) -> Result<reqwest::Response, ApiError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    match status.as_u16() {
        401 => Err(ApiError::AuthenticationFailed),
        404 | 410 => Err(ApiError::NotFound(resource.to_string())),
        429 => Err(ApiError::RateLimited),
        _ => {
            let body = response.text().await?;
            Err(ApiError::RequestError(format!("Status {}: {}", status, body)))
        }
    }
}

fn rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_event_time(value: &GoogleDateTime) -> Result<EventTime, ApiError> {
    if let Some(date_time) = &value.date_time {
        let at = DateTime::parse_from_rfc3339(date_time)
            .map_err(|e| ApiError::ParseError(format!("Invalid dateTime {}: {}", date_time, e)))?;
        return Ok(EventTime::DateTime(at.with_timezone(&Utc)));
    }

    if let Some(date) = &value.date {
        let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|e| ApiError::ParseError(format!("Invalid date {}: {}", date, e)))?;
        return Ok(EventTime::Date(day));
    }

    Err(ApiError::ParseError("Time has neither date nor dateTime".to_string()))
}

fn to_google_time(time: &EventTime) -> GoogleDateTime {
    match time {
        EventTime::Date(day) => GoogleDateTime {
            date_time: None,
            date: Some(day.format("%Y-%m-%d").to_string()),
        },
        EventTime::DateTime(at) => GoogleDateTime {
            date_time: Some(rfc3339(*at)),
            date: None,
        },
    }
}

fn optional_time(value: Option<&GoogleDateTime>) -> Result<Option<EventTime>, ApiError> {
    value.map(parse_event_time).transpose()
}

fn source_event_from_google(ge: GoogleEvent) -> Result<SourceEvent, ApiError> {
    let id = ge
        .id
        .ok_or_else(|| ApiError::ParseError("Missing event id".to_string()))?;
    let status = EventStatus::from_api(ge.status.as_deref());
    let start = optional_time(ge.start.as_ref())?;
    let end = optional_time(ge.end.as_ref())?;

    if status != EventStatus::Cancelled && (start.is_none() || end.is_none()) {
        return Err(ApiError::ParseError(format!("Event {} has no start or end", id)));
    }

    let last_modified = ge
        .updated
        .as_deref()
        .and_then(|updated| DateTime::parse_from_rfc3339(updated).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);

    Ok(SourceEvent {
        id,
        status,
        title: ge.summary.unwrap_or_default(),
        description: ge.description,
        location: ge.location,
        start,
        end,
        last_modified,
    })
}

fn copied_event_from_google(ge: GoogleEvent) -> Result<CopiedEvent, ApiError> {
    let id = ge
        .id
        .ok_or_else(|| ApiError::ParseError("Missing event id".to_string()))?;

    Ok(CopiedEvent {
        id,
        title: ge.summary.unwrap_or_default(),
        description: ge.description,
        location: ge.location,
        start: optional_time(ge.start.as_ref())?,
        end: optional_time(ge.end.as_ref())?,
        color: ge.color_id.as_deref().and_then(ColorTag::from_color_id),
        private_properties: ge
            .extended_properties
            .map(|props| props.private)
            .unwrap_or_default(),
    })
}

fn google_event_from_draft(draft: &EventDraft) -> GoogleEvent {
    GoogleEvent {
        summary: Some(draft.title.clone()),
        description: draft.description.clone(),
        location: draft.location.clone(),
        start: Some(to_google_time(&draft.start)),
        end: Some(to_google_time(&draft.end)),
        color_id: Some(draft.color.color_id().to_string()),
        extended_properties: Some(ExtendedProperties {
            private: draft.private_properties.clone(),
        }),
        ..GoogleEvent::default()
    }
}
