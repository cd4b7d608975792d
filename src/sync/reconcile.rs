use crate::calendar::{CopiedEvent, EventDraft, SourceEvent};
use crate::classifier::Classifier;
use crate::sync::calendar_api::CalendarSink;
use crate::sync::link::LinkResolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteReason {
    SourceCancelled,
    NoLongerEligible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    CancelledWithoutCopy,
    NotEligible,
    MissingTimes,
}

/// What reconciliation decided for one source event.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncAction {
    Create(EventDraft),
    Update { copy_id: String, draft: EventDraft },
    Delete { copy_id: String, reason: DeleteReason },
    Keep { copy_id: String },
    Skip(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Updated,
    Deleted,
    Unchanged,
    Skipped,
    Failed,
}

pub struct Reconciler<'a> {
    sink: &'a dyn CalendarSink,
    classifier: &'a Classifier,
    resolver: LinkResolver<'a>,
    dry_run: bool,
}

impl<'a> Reconciler<'a> {
    pub fn new(sink: &'a dyn CalendarSink, classifier: &'a Classifier, tag_key: &'a str) -> Self {
        Self {
            sink,
            classifier,
            resolver: LinkResolver::new(sink, tag_key),
            dry_run: false,
        }
    }

    /// Plan every action but leave the destination untouched.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub async fn reconcile(&self, source: &SourceEvent) -> Outcome {
        let existing = self.resolver.find_copy(&source.id).await;
        let action = self.plan(source, existing.as_ref());
        self.apply(source, action).await
    }

    pub fn plan(&self, source: &SourceEvent, existing: Option<&CopiedEvent>) -> SyncAction {
        if source.is_cancelled() {
            return match existing {
                Some(copy) => SyncAction::Delete {
                    copy_id: copy.id.clone(),
                    reason: DeleteReason::SourceCancelled,
                },
                None => SyncAction::Skip(SkipReason::CancelledWithoutCopy),
            };
        }

        if !self.classifier.is_eligible(source) {
            return match existing {
                Some(copy) => SyncAction::Delete {
                    copy_id: copy.id.clone(),
                    reason: DeleteReason::NoLongerEligible,
                },
                None => SyncAction::Skip(SkipReason::NotEligible),
            };
        }

        let color = self.classifier.color_for(source);
        let Some(draft) = EventDraft::mirror(source, color) else {
            return SyncAction::Skip(SkipReason::MissingTimes);
        };

        let tag_key = self.resolver.tag_key();
        match existing {
            Some(copy) if copy.matches_draft(&draft) => SyncAction::Keep {
                copy_id: copy.id.clone(),
            },
            Some(copy) => SyncAction::Update {
                copy_id: copy.id.clone(),
                draft: draft
                    .with_private_properties(copy.private_properties.clone())
                    .with_correlation_tag(tag_key, &source.id),
            },
            None => SyncAction::Create(draft.with_correlation_tag(tag_key, &source.id)),
        }
    }

    pub async fn apply(&self, source: &SourceEvent, action: SyncAction) -> Outcome {
        let title = &source.title;

        match action {
            SyncAction::Skip(reason) => {
                if reason == SkipReason::MissingTimes {
                    tracing::warn!("Skipping \"{}\" ({}): no start or end time", title, source.id);
                } else {
                    tracing::debug!("Nothing to do for {} ({:?})", source.id, reason);
                }
                Outcome::Skipped
            }
            SyncAction::Keep { copy_id } => {
                tracing::debug!("Copy {} of \"{}\" is up to date", copy_id, title);
                Outcome::Unchanged
            }
            SyncAction::Create(draft) => {
                tracing::info!("Copying new event: \"{}\" ({})", title, draft.color.name());
                if self.dry_run {
                    return Outcome::Created;
                }
                match self.sink.insert(&draft).await {
                    Ok(copy) => {
                        tracing::debug!("Created copy {} for {}", copy.id, source.id);
                        Outcome::Created
                    }
                    Err(e) => {
                        tracing::error!("Failed to create event \"{}\": {}", title, e);
                        Outcome::Failed
                    }
                }
            }
            SyncAction::Update { copy_id, draft } => {
                tracing::info!("Updating copied event: \"{}\" ({})", title, draft.color.name());
                if self.dry_run {
                    return Outcome::Updated;
                }
                match self.sink.update(&copy_id, &draft).await {
                    Ok(_) => Outcome::Updated,
                    Err(e) => {
                        tracing::error!("Failed to update event \"{}\": {}", title, e);
                        Outcome::Failed
                    }
                }
            }
            SyncAction::Delete { copy_id, reason } => {
                match reason {
                    DeleteReason::SourceCancelled => {
                        tracing::info!("Deleting copied event {} for cancelled source {}", copy_id, source.id)
                    }
                    DeleteReason::NoLongerEligible => tracing::info!(
                        "Deleting copied event for source that no longer matches criteria: \"{}\"",
                        title
                    ),
                }
                if self.dry_run {
                    return Outcome::Deleted;
                }
                match self.sink.remove(&copy_id).await {
                    Ok(()) => Outcome::Deleted,
                    Err(e) if e.is_not_found() => {
                        tracing::info!("Copied event {} was already removed", copy_id);
                        Outcome::Deleted
                    }
                    Err(e) => {
                        tracing::warn!("Could not delete copied event {}: {}", copy_id, e);
                        Outcome::Failed
                    }
                }
            }
        }
    }
}
