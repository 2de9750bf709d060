//! Frame driver: orders the segments of one interaction frame, levels them and
//! resolves their compositions.
use glam::Vec2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::composition::{
    resolve, CompositionRequest, DrawMode, ResolveInput, ResolvedOutput,
};
use crate::config::EngineConfig;
use crate::course::{
    apply_grade, assemble, compute_grade, AssemblyIssue, Chain, ChainRole, Traversal,
};
use crate::engine::events::{EngineEvent, EngineEventKind, EventSink};
use crate::engine::source::ExistingSource;
use crate::error::Result;
use crate::geometry::{PathSegment, SegmentId};

/// Input of one interaction frame.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
#[derive(Debug, Clone, Default)]
pub struct Frame {
    /// Segments of the course being drawn or replaced, in any order.
    pub segments: Vec<PathSegment>,
    /// Composition selected for this frame.
    pub request: CompositionRequest,
    pub mode: DrawMode,
    /// Elevation selected in the tool.
    pub tool_elevation: f32,
}

impl Frame {
    /// Creates a new [`Frame`] in [`DrawMode::Create`] at tool elevation zero.
    pub fn new(segments: Vec<PathSegment>, request: CompositionRequest) -> Self {
        Self {
            segments,
            request,
            ..Default::default()
        }
    }

    /// Sets the draw mode.
    pub fn with_mode(mut self, mode: DrawMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the tool elevation.
    pub fn with_tool_elevation(mut self, tool_elevation: f32) -> Self {
        self.tool_elevation = tool_elevation;
        self
    }

    /// Whether this frame rewrites vertical geometry.
    pub fn levels_slope(&self) -> bool {
        self.mode == DrawMode::Create && self.request.constant_slope()
    }
}

/// Updated geometry and resolved composition for one segment.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentResult {
    pub segment: PathSegment,
    pub output: ResolvedOutput,
}

/// Result for one ordered chain.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ChainResult {
    pub role: ChainRole,
    pub traversal: Traversal,
    /// Grade applied to the chain, if any.
    pub grade: Option<f32>,
    /// Slots that could not be linked.
    pub gaps: usize,
    /// Present segments in chain order.
    pub segments: Vec<SegmentResult>,
}

/// Result of resolving a frame.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameResult {
    pub primary: Option<ChainResult>,
    pub parallel: Option<ChainResult>,
    /// Segments that could not be linked into a chain; resolved without levelling.
    pub unplaced: Vec<SegmentResult>,
    pub issues: Vec<AssemblyIssue>,
}

impl FrameResult {
    /// All results: primary chain, parallel chain, then unplaced segments.
    pub fn iter(&self) -> impl Iterator<Item = &SegmentResult> {
        self.primary
            .iter()
            .chain(self.parallel.iter())
            .flat_map(|c| c.segments.iter())
            .chain(self.unplaced.iter())
    }

    pub fn get(&self, id: SegmentId) -> Option<&SegmentResult> {
        self.iter().find(|r| r.segment.id == id)
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of segments the host has to write back.
    pub fn changed_count(&self) -> usize {
        self.iter().filter(|r| r.output.changed).count()
    }

    /// Resolved elevation `(left, right)` of every segment, for hosts that only
    /// commit elevation ranges.
    pub fn elevations(&self) -> Vec<(SegmentId, Vec2)> {
        self.iter()
            .map(|r| (r.segment.id, r.output.elevation))
            .collect()
    }
}

/// Resolves frames with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct CourseEngine {
    /// Configuration applied to every frame.
    pub config: EngineConfig,
}

impl CourseEngine {
    pub fn try_new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn new(config: EngineConfig) -> Self {
        debug_assert!(config.validate().is_ok(), "engine config must be valid");
        Self { config }
    }

    /// Resolves the given frame.
    pub fn resolve(&self, frame: &Frame, existing: &dyn ExistingSource) -> FrameResult {
        resolve_frame(frame, &self.config, existing, None)
    }

    pub fn resolve_with_events(
        &self,
        frame: &Frame,
        existing: &dyn ExistingSource,
        sink: &mut dyn EventSink,
    ) -> FrameResult {
        resolve_frame(frame, &self.config, existing, Some(sink))
    }
}

pub fn resolve_frame(
    frame: &Frame,
    config: &EngineConfig,
    existing: &dyn ExistingSource,
    sink: Option<&mut dyn EventSink>,
) -> FrameResult {
    if let Some(s) = sink {
        resolve_frame_with_events(frame, config, existing, s)
    } else {
        resolve_frame_with_events(frame, config, existing, &mut ())
    }
}

struct FrameContext<'a> {
    frame: &'a Frame,
    config: &'a EngineConfig,
    existing: &'a dyn ExistingSource,
}

pub fn resolve_frame_with_events(
    frame: &Frame,
    config: &EngineConfig,
    existing: &dyn ExistingSource,
    sink: &mut dyn EventSink,
) -> FrameResult {
    if sink.wants(EngineEventKind::FrameStarted) {
        sink.send(EngineEvent::FrameStarted {
            mode: frame.mode,
            segment_count: frame.segments.len(),
        });
    }

    let course = assemble(&frame.segments);
    if sink.wants(EngineEventKind::Warning) {
        for issue in &course.issues {
            sink.send(EngineEvent::Warning {
                context: format!("chain:{:?}", issue.role()),
                message: issue.to_string(),
            });
        }
    }

    let ctx = FrameContext {
        frame,
        config,
        existing,
    };

    let primary = course
        .primary
        .map(|chain| resolve_chain(ChainRole::Primary, chain, &ctx, &mut *sink));
    let parallel = course
        .parallel
        .map(|chain| resolve_chain(ChainRole::Parallel, chain, &ctx, &mut *sink));

    if !course.unplaced.is_empty() {
        warn!(
            "{} segment(s) could not be linked; resolving them without levelling.",
            course.unplaced.len()
        );
    }
    let mut unplaced = Vec::with_capacity(course.unplaced.len());
    for segment in course.unplaced {
        unplaced.push(resolve_segment(None, segment, &ctx, sink));
    }

    let result = FrameResult {
        primary,
        parallel,
        unplaced,
        issues: course.issues,
    };

    let resolved = result.len();
    let changed = result.changed_count();
    info!(
        "Frame resolved: {resolved} segment(s), {changed} changed ({:?}).",
        frame.mode
    );
    if sink.wants(EngineEventKind::FrameFinished) {
        sink.send(EngineEvent::FrameFinished { resolved, changed });
    }

    result
}

fn resolve_chain(
    role: ChainRole,
    mut chain: Chain,
    ctx: &FrameContext<'_>,
    sink: &mut dyn EventSink,
) -> ChainResult {
    if sink.wants(EngineEventKind::ChainAssembled) {
        sink.send(EngineEvent::ChainAssembled {
            role,
            len: chain.len(),
            gaps: chain.gap_count(),
        });
    }

    let grade = if ctx.frame.levels_slope() {
        compute_grade(&chain)
    } else {
        None
    };
    match grade {
        Some(grade) => {
            apply_grade(&mut chain, grade);
            if sink.wants(EngineEventKind::GradeApplied) {
                sink.send(EngineEvent::GradeApplied {
                    role,
                    grade,
                    segments: chain.segments().count(),
                });
            }
        }
        None if ctx.frame.levels_slope() => {
            debug!("{role:?} chain carries no grade; leaving geometry as drawn.");
        }
        None => {}
    }

    let traversal = chain.traversal;
    let gaps = chain.gap_count();
    let mut segments = Vec::with_capacity(chain.len());
    for segment in chain.into_segments() {
        segments.push(resolve_segment(Some(role), segment, ctx, sink));
    }

    ChainResult {
        role,
        traversal,
        grade,
        gaps,
        segments,
    }
}

fn resolve_segment(
    role: Option<ChainRole>,
    segment: PathSegment,
    ctx: &FrameContext<'_>,
    sink: &mut dyn EventSink,
) -> SegmentResult {
    let existing = match ctx.frame.mode {
        DrawMode::Replace => ctx.existing.existing(segment.id),
        DrawMode::Create | DrawMode::Grid => None,
    };
    let input = ResolveInput::new(&ctx.frame.request, ctx.frame.mode, segment.elevation)
        .with_existing(existing.as_ref())
        .with_tool_elevation(ctx.frame.tool_elevation);
    let output = resolve(&input, ctx.config);

    if sink.wants(EngineEventKind::SegmentResolved) {
        sink.send(EngineEvent::SegmentResolved {
            role,
            segment: segment.id,
            output,
        });
    }

    SegmentResult { segment, output }
}
