//! Frame driver and its host seams.
//!
//! A frame carries the segments of one interaction (in any order), the selected
//! [`crate::composition::CompositionRequest`] and the draw mode. The driver orders
//! the segments, levels them when a constant slope is requested, and resolves the
//! composition of every segment. Compositions already on the segments are read
//! through [`source::ExistingSource`]; progress is reported to an
//! [`events::EventSink`].
pub mod events;
pub mod runner;
pub mod source;

pub use events::{EngineEvent, EngineEventKind, EventSink, FnSink, MultiSink, VecSink};
pub use runner::{
    resolve_frame, resolve_frame_with_events, ChainResult, CourseEngine, Frame, FrameResult,
    SegmentResult,
};
pub use source::{ExistingSource, FnExistingSource};
