use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::calendar::SourceEvent;
use crate::classifier::Classifier;
use crate::storage::config::{Config, ConfigError};
use crate::sync::calendar_api::{CalendarSink, CalendarSource};
use crate::sync::google_api::GoogleCalendarClient;
use crate::sync::google_auth::GoogleAuthenticator;
use crate::sync::reconcile::{Outcome, Reconciler};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Authentication error: {0}")]
    AuthError(#[from] crate::sync::google_auth::AuthError),
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),
}

/// Tally of one sync pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub fetched: usize,
    pub processed: usize,
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: usize,
    pub dry_run: bool,
}

impl SyncReport {
    fn record(&mut self, outcome: Outcome) {
        self.processed += 1;
        match outcome {
            Outcome::Created => self.created += 1,
            Outcome::Updated => self.updated += 1,
            Outcome::Deleted => self.deleted += 1,
            Outcome::Unchanged => self.unchanged += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Failed => self.failed += 1,
        }
    }

    pub fn mutations(&self) -> usize {
        self.created + self.updated + self.deleted
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} processed of {} fetched: {} created, {} updated, {} deleted, {} unchanged, {} skipped, {} failed",
            self.processed,
            self.fetched,
            self.created,
            self.updated,
            self.deleted,
            self.unchanged,
            self.skipped,
            self.failed
        )?;
        if self.dry_run {
            write!(f, " (dry run)")?;
        }
        Ok(())
    }
}

/// Drives one pass: collects recently changed and upcoming source events,
/// then reconciles each against the destination.
pub struct SyncEngine<S, K> {
    source: S,
    sink: K,
    classifier: Classifier,
    lookback: chrono::Duration,
    lookahead: chrono::Duration,
    tag_key: String,
    dry_run: bool,
}

impl<S: CalendarSource, K: CalendarSink> SyncEngine<S, K> {
    pub fn new(source: S, sink: K, config: &Config) -> Self {
        Self {
            source,
            sink,
            classifier: Classifier::new(&config.classifier),
            lookback: config.sync.lookback(),
            lookahead: config.sync.lookahead(),
            tag_key: config.sync.correlation_tag.clone(),
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub async fn run(&self, now: DateTime<Utc>) -> SyncReport {
        let horizon_end = now
            .checked_add_signed(self.lookahead)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let merged = self.collect_candidates(now, horizon_end).await;

        let mut report = SyncReport {
            fetched: merged.len(),
            dry_run: self.dry_run,
            ..SyncReport::default()
        };

        let relevant: Vec<SourceEvent> = merged
            .into_values()
            .filter(|event| event.is_cancelled() || event.starts_within(now, horizon_end))
            .collect();

        if relevant.is_empty() {
            tracing::info!("No relevant events to process after filtering.");
            return report;
        }

        tracing::info!(
            "Processing {} unique and relevant event(s) after filtering...",
            relevant.len()
        );

        let reconciler =
            Reconciler::new(&self.sink, &self.classifier, &self.tag_key).with_dry_run(self.dry_run);
        for event in &relevant {
            let outcome = reconciler.reconcile(event).await;
            report.record(outcome);
        }

        tracing::info!("Sync complete: {}", report);
        report
    }

    /// Union of both fetches keyed by event id. A failed fetch contributes
    /// nothing; the other still runs.
    async fn collect_candidates(
        &self,
        now: DateTime<Utc>,
        horizon_end: DateTime<Utc>,
    ) -> HashMap<String, SourceEvent> {
        let mut merged = HashMap::new();
        let changed_since = now
            .checked_sub_signed(self.lookback)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        match self.source.list_changed_since(changed_since, true).await {
            Ok(events) => {
                tracing::info!("Found {} recently updated event(s).", events.len());
                merged.extend(events.into_iter().map(|e| (e.id.clone(), e)));
            }
            Err(e) => tracing::error!("Could not fetch recently updated events: {}", e),
        }

        match self.source.list_in_window(now, horizon_end, true).await {
            Ok(events) => {
                tracing::info!("Found {} upcoming event(s) before {}.", events.len(), horizon_end);
                merged.extend(events.into_iter().map(|e| (e.id.clone(), e)));
            }
            Err(e) => tracing::error!("Could not fetch upcoming events: {}", e),
        }

        merged
    }
}

/// Runs one pass between the configured Google calendars with a fresh token.
pub async fn sync_google_calendars(
    config: &Config,
    auth: &mut GoogleAuthenticator,
    dry_run: bool,
) -> Result<SyncReport, SyncError> {
    config.validate()?;
    let token = auth.get_valid_token().await?;

    let source = GoogleCalendarClient::new(token.access_token.clone(), &config.calendars.source);
    let sink = GoogleCalendarClient::new(token.access_token, &config.calendars.destination);

    let engine = SyncEngine::new(source, sink, config).with_dry_run(dry_run);
    Ok(engine.run(Utc::now()).await)
}
