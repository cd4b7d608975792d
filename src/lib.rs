pub mod calendar;
pub mod classifier;
pub mod sync;
pub mod storage;

pub use calendar::{ColorTag, CopiedEvent, EventDraft, EventStatus, EventTime, SourceEvent};
pub use classifier::{Assessment, Classifier};
pub use storage::config::Config;
