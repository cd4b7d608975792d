pub mod calendar_api;
pub mod google_api;
pub mod google_auth;
pub mod link;
pub mod reconcile;
pub mod sync_engine;

#[cfg(test)]
pub(crate) mod testing;

pub use calendar_api::{ApiError, CalendarSink, CalendarSource};
pub use link::LinkResolver;
pub use reconcile::{Outcome, Reconciler, SyncAction};
pub use sync_engine::{SyncEngine, SyncError, SyncReport};
