pub mod aggregator;
pub mod codec;
pub mod display;
pub mod merge;
pub mod submit;

pub use aggregator::{Transcript, TranscriptView};
pub use display::{LineStyle, TranscriptLine};
pub use merge::{TimelineReducer, merge_timelines};
pub use submit::Submitter;
