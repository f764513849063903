pub mod engine;
pub mod error;
pub mod parser;
pub mod runner;

pub use engine::segment_stream;
pub use error::{Result, SessionError};
pub use parser::{
    strip_think_markers, Progress, Segment, SegmentedReply, ThinkParser, CLOSE_MARKER, OPEN_MARKER,
};
pub use runner::{TurnHandle, TurnRunner};
