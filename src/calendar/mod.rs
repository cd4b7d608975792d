pub mod event;
pub mod color;

pub use event::{CopiedEvent, EventDraft, EventStatus, EventTime, SourceEvent};
pub use color::ColorTag;
