use crate::calendar::CopiedEvent;
use crate::sync::calendar_api::CalendarSink;

/// Finds the destination copy made for a source event via the private
/// correlation tag stored on every copy.
pub struct LinkResolver<'a> {
    sink: &'a dyn CalendarSink,
    tag_key: &'a str,
}

impl<'a> LinkResolver<'a> {
    pub fn new(sink: &'a dyn CalendarSink, tag_key: &'a str) -> Self {
        Self { sink, tag_key }
    }

    pub fn tag_key(&self) -> &str {
        self.tag_key
    }

    /// Lookup failures are logged and reported as "no copy", so the caller
    /// falls through to creating one.
    pub async fn find_copy(&self, source_id: &str) -> Option<CopiedEvent> {
        match self.sink.find_by_correlation_tag(self.tag_key, source_id).await {
            Ok(copies) => {
                if copies.len() > 1 {
                    tracing::warn!(
                        "Found {} copies for source event {}; using {}",
                        copies.len(),
                        source_id,
                        copies[0].id
                    );
                }
                copies.into_iter().next()
            }
            Err(e) => {
                tracing::error!("Error finding copied event for source ID {}: {}", source_id, e);
                None
            }
        }
    }
}
