#![forbid(unsafe_code)]
//! course_resolve: ordering, levelling and composition resolution for network courses.
//!
//! Modules:
//! - course: assemble unordered segments into primary and parallel chains, propagate a constant grade
//! - composition: request flags, threshold classification and the composition resolver
//! - engine: frame driver, event sinks and the existing-composition seam
//! - thresholds, config: elevation thresholds and engine configuration
//!
//! For an overview, see the README.
pub mod composition;
pub mod config;
pub mod course;
pub mod engine;
pub mod error;
pub(crate) mod flags;
pub mod geometry;
pub mod thresholds;

/// Convenient re-exports for common types. Import with `use course_resolve::prelude::*;`.
pub mod prelude {
    pub use crate::composition::{
        classify, resolve, Classification, CompositionFlags, CompositionRequest,
        CompositionRequestBuilder, DrawMode, ExistingComposition, GeneralBand, GeneralFlags,
        GeneralSelection, Placement, ReplaceTargets, ResolutionState, ResolveInput,
        ResolvedOutput, Side, SideBand, SideFlags, SideUpgrades,
    };
    pub use crate::config::EngineConfig;
    pub use crate::course::{
        apply_grade, assemble, compute_grade, AssembledCourse, AssemblyIssue, Chain, ChainRole,
        Traversal,
    };
    pub use crate::engine::{
        resolve_frame, resolve_frame_with_events, ChainResult, CourseEngine, EngineEvent,
        EngineEventKind, EventSink, ExistingSource, FnExistingSource, FnSink, Frame,
        FrameResult, MultiSink, SegmentResult, VecSink,
    };
    pub use crate::error::{Error, Result};
    pub use crate::geometry::{CubicCurve, Knot, KnotFlags, PathSegment, SegmentId};
    pub use crate::thresholds::ThresholdTable;
}
