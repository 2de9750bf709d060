//! Event types and sinks for observing frame resolution.
//!
//! This module defines [`EngineEvent`] and a set of sinks to emit, collect, or
//! forward events while resolving a [`crate::engine::runner::Frame`] via
//! [`crate::engine::runner::CourseEngine`] or
//! [`crate::engine::runner::resolve_frame_with_events`].
use crate::composition::{DrawMode, ResolvedOutput};
use crate::course::ChainRole;
use crate::geometry::SegmentId;

/// Describes events emitted while resolving a frame.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// Emitted before assembly starts.
    FrameStarted {
        /// Draw mode of the frame.
        mode: DrawMode,
        /// Number of input segments.
        segment_count: usize,
    },

    /// Emitted once per chain after ordering.
    ChainAssembled {
        role: ChainRole,
        /// Slots in the chain, gaps included.
        len: usize,
        /// Slots that could not be linked.
        gaps: usize,
    },

    /// Emitted when a constant grade was applied to a chain.
    GradeApplied {
        role: ChainRole,
        grade: f32,
        /// Number of segments that carry the grade.
        segments: usize,
    },

    /// Emitted after a segment's composition was resolved.
    SegmentResolved {
        /// Chain the segment belongs to; `None` for unplaced segments.
        role: Option<ChainRole>,
        segment: SegmentId,
        output: ResolvedOutput,
    },

    /// Non-fatal warning, e.g. malformed topology.
    Warning {
        /// Context string (e.g. chain role).
        context: String,
        /// Human-readable message.
        message: String,
    },

    /// Emitted when the frame is done.
    FrameFinished {
        /// Segments resolved.
        resolved: usize,
        /// Segments whose output differs from what they carry.
        changed: usize,
    },
}

/// Discriminant of [`EngineEvent`], used to filter sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineEventKind {
    FrameStarted,
    ChainAssembled,
    GradeApplied,
    SegmentResolved,
    Warning,
    FrameFinished,
}

impl EngineEvent {
    pub fn kind(&self) -> EngineEventKind {
        match self {
            EngineEvent::FrameStarted { .. } => EngineEventKind::FrameStarted,
            EngineEvent::ChainAssembled { .. } => EngineEventKind::ChainAssembled,
            EngineEvent::GradeApplied { .. } => EngineEventKind::GradeApplied,
            EngineEvent::SegmentResolved { .. } => EngineEventKind::SegmentResolved,
            EngineEvent::Warning { .. } => EngineEventKind::Warning,
            EngineEvent::FrameFinished { .. } => EngineEventKind::FrameFinished,
        }
    }
}

/// A generic event sink that accepts [`EngineEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: EngineEvent);

    /// Whether events of `kind` should be built at all.
    #[inline]
    fn wants(&self, _kind: EngineEventKind) -> bool {
        true
    }

    fn send_many<I>(&mut self, events: I)
    where
        Self: Sized,
        I: IntoIterator<Item = EngineEvent>,
    {
        for e in events {
            self.send(e);
        }
    }
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: EngineEvent) {}

    #[inline]
    fn wants(&self, _kind: EngineEventKind) -> bool {
        false
    }
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(EngineEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(EngineEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(EngineEvent),
{
    #[inline]
    fn send(&mut self, event: EngineEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects events in a `Vec`, optionally only some kinds.
#[derive(Default)]
pub struct VecSink {
    events: Vec<EngineEvent>,
    only: Option<Vec<EngineEventKind>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects only events of the given kinds.
    pub fn filtered(kinds: impl IntoIterator<Item = EngineEventKind>) -> Self {
        Self {
            events: Vec::new(),
            only: Some(kinds.into_iter().collect()),
        }
    }

    pub fn into_inner(self) -> Vec<EngineEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[EngineEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: EngineEvent) {
        if self.wants(event.kind()) {
            self.events.push(event);
        }
    }

    fn wants(&self, kind: EngineEventKind) -> bool {
        self.only.as_ref().is_none_or(|kinds| kinds.contains(&kind))
    }
}

/// Fan-out sink that forwards each event to all contained sinks.
pub struct MultiSink<S: EventSink> {
    pub(crate) sinks: Vec<S>,
}

impl<S: EventSink> MultiSink<S> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn with_sinks(sinks: Vec<S>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: S) {
        self.sinks.push(sink);
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }
}

impl<S: EventSink> Default for MultiSink<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EventSink> EventSink for MultiSink<S> {
    fn send(&mut self, event: EngineEvent) {
        let kind = event.kind();
        let targets: Vec<usize> = (0..self.sinks.len())
            .filter(|&i| self.sinks[i].wants(kind))
            .collect();
        let Some((&last, rest)) = targets.split_last() else {
            return;
        };
        for &i in rest {
            self.sinks[i].send(event.clone());
        }
        self.sinks[last].send(event);
    }

    fn wants(&self, kind: EngineEventKind) -> bool {
        self.sinks.iter().any(|s| s.wants(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn warning(context: &str) -> EngineEvent {
        EngineEvent::Warning {
            context: context.into(),
            message: "msg".into(),
        }
    }

    #[test]
    fn vec_sink_collects_events() {
        let mut sink = VecSink::new();
        assert!(sink.is_empty());
        sink.send(warning("a"));
        sink.send(warning("b"));
        assert_eq!(sink.len(), 2);
        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn filtered_vec_sink_drops_other_kinds() {
        let mut sink = VecSink::filtered([EngineEventKind::FrameFinished]);
        assert!(!sink.wants(EngineEventKind::Warning));
        sink.send(warning("a"));
        sink.send(EngineEvent::FrameFinished {
            resolved: 1,
            changed: 0,
        });
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.as_slice()[0].kind(), EngineEventKind::FrameFinished);
    }

    #[test]
    fn multi_sink_fans_out_to_interested_sinks() {
        let all = VecSink::new();
        let finished_only = VecSink::filtered([EngineEventKind::FrameFinished]);
        let mut multi = MultiSink::with_sinks(vec![all, finished_only]);

        multi.send(warning("ctx"));
        assert_eq!(multi.sinks[0].len(), 1);
        assert_eq!(multi.sinks[1].len(), 0);
        assert!(multi.wants(EngineEventKind::Warning));
    }

    #[test]
    fn unit_sink_wants_nothing() {
        assert!(!EventSink::wants(&(), EngineEventKind::SegmentResolved));
    }

    #[test]
    fn fn_sink_invokes_callback() {
        let mut count = 0;
        let mut sink = FnSink::new(|_event| {
            count += 1;
        });
        sink.send(warning("ctx"));
        assert_eq!(count, 1);
    }
}
