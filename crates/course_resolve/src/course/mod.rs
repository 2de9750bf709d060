//! Course chains: ordering unordered segments and propagating a constant grade.
use glam::Vec3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::{KnotFlags, PathSegment, SegmentId};

pub mod assembler;
pub mod slope;

pub use assembler::assemble;
pub use slope::{apply_grade, compute_grade};

/// Which course a chain belongs to.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChainRole {
    Primary,
    Parallel,
}

/// Direction in which chain slots were linked relative to segment geometry.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Traversal {
    /// Slots follow segment start to end; the head's start is first.
    Forward,
    /// Slots follow segment end to start; the head's end is first.
    Reversed,
}

impl Traversal {
    /// Returns `true` if `segment` opens a chain walked in this direction.
    #[inline]
    pub fn is_head(self, segment: &PathSegment) -> bool {
        match self {
            Traversal::Forward => segment.start.has(KnotFlags::IS_FIRST),
            Traversal::Reversed => segment.end.has(KnotFlags::IS_FIRST),
        }
    }

    /// Point where the walk enters `segment`.
    #[inline]
    pub fn entry(self, segment: &PathSegment) -> Vec3 {
        match self {
            Traversal::Forward => segment.start.position,
            Traversal::Reversed => segment.end.position,
        }
    }

    /// Point where the walk leaves `segment`.
    #[inline]
    pub fn exit(self, segment: &PathSegment) -> Vec3 {
        match self {
            Traversal::Forward => segment.end.position,
            Traversal::Reversed => segment.start.position,
        }
    }
}

/// A linearly ordered course. Empty slots mark links that could not be resolved.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Chain {
    pub traversal: Traversal,
    pub slots: Vec<Option<PathSegment>>,
}

impl Chain {
    pub fn new(traversal: Traversal, slots: Vec<Option<PathSegment>>) -> Self {
        Self { traversal, slots }
    }

    /// Number of slots, gaps included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn gap_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_none()).count()
    }

    /// Present segments in slot order.
    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.slots.iter().flatten()
    }

    /// Slot indices in geometric start-to-end order.
    pub fn geometric_indices(&self) -> Vec<usize> {
        match self.traversal {
            Traversal::Forward => (0..self.slots.len()).collect(),
            Traversal::Reversed => (0..self.slots.len()).rev().collect(),
        }
    }

    /// Slots in geometric start-to-end order, so that each present segment's
    /// end meets the next present segment's start.
    pub fn iter_geometric(&self) -> impl Iterator<Item = Option<&PathSegment>> {
        self.geometric_indices()
            .into_iter()
            .map(move |i| self.slots[i].as_ref())
    }

    /// Ids of the present segments in slot order.
    pub fn ids(&self) -> Vec<SegmentId> {
        self.segments().map(|s| s.id).collect()
    }

    pub fn into_segments(self) -> impl Iterator<Item = PathSegment> {
        self.slots.into_iter().flatten()
    }
}

/// Something that went wrong while linking a chain. Never fatal.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum AssemblyIssue {
    /// No segment carries the head flag for this chain.
    MissingHead { role: ChainRole },
    /// More than one segment carries the head flag; the first was used.
    DuplicateHead {
        role: ChainRole,
        candidates: Vec<SegmentId>,
    },
    /// No segment continues the chain at `slot`.
    MissingSuccessor {
        role: ChainRole,
        slot: usize,
        after: Option<SegmentId>,
    },
}

impl AssemblyIssue {
    pub fn role(&self) -> ChainRole {
        match self {
            AssemblyIssue::MissingHead { role }
            | AssemblyIssue::DuplicateHead { role, .. }
            | AssemblyIssue::MissingSuccessor { role, .. } => *role,
        }
    }
}

impl std::fmt::Display for AssemblyIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssemblyIssue::MissingHead { role } => write!(f, "{role:?} chain has no head"),
            AssemblyIssue::DuplicateHead { role, candidates } => {
                write!(f, "{role:?} chain has several heads {candidates:?}")
            }
            AssemblyIssue::MissingSuccessor { role, slot, after } => match after {
                Some(id) => write!(f, "{role:?} chain slot {slot}: nothing continues {id:?}"),
                None => write!(f, "{role:?} chain slot {slot}: no tail to continue from"),
            },
        }
    }
}

/// Output of [`assemble`]: ordered chains plus anything that could not be placed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AssembledCourse {
    pub primary: Option<Chain>,
    pub parallel: Option<Chain>,
    /// Segments left over after linking failed.
    pub unplaced: Vec<PathSegment>,
    pub issues: Vec<AssemblyIssue>,
}

impl AssembledCourse {
    pub fn chain(&self, role: ChainRole) -> Option<&Chain> {
        match role {
            ChainRole::Primary => self.primary.as_ref(),
            ChainRole::Parallel => self.parallel.as_ref(),
        }
    }

    pub fn is_well_formed(&self) -> bool {
        self.issues.is_empty() && self.unplaced.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::geometry::Knot;

    fn seg(id: u32, from: f32, to: f32) -> PathSegment {
        PathSegment::straight(
            SegmentId(id),
            Knot::new(Vec3::new(from, 0.0, 0.0)),
            Knot::new(Vec3::new(to, 0.0, 0.0)),
        )
    }

    #[test]
    fn reversed_chain_iterates_back_to_front() {
        let chain = Chain::new(
            Traversal::Reversed,
            vec![Some(seg(0, 20.0, 30.0)), None, Some(seg(2, 0.0, 10.0))],
        );
        let ids: Vec<_> = chain.iter_geometric().map(|s| s.map(|s| s.id.0)).collect();
        assert_eq!(ids, vec![Some(2), None, Some(0)]);
        assert_eq!(chain.gap_count(), 1);
        assert_eq!(chain.ids(), vec![SegmentId(0), SegmentId(2)]);
    }

    #[test]
    fn traversal_swaps_entry_and_exit() {
        let s = seg(0, 0.0, 10.0);
        assert_eq!(Traversal::Forward.entry(&s), Vec3::ZERO);
        assert_eq!(Traversal::Reversed.entry(&s), Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(Traversal::Reversed.exit(&s), Vec3::ZERO);
    }

    #[test]
    fn issue_display_mentions_slot() {
        let issue = AssemblyIssue::MissingSuccessor {
            role: ChainRole::Primary,
            slot: 2,
            after: Some(SegmentId(7)),
        };
        assert_eq!(
            issue.to_string(),
            "Primary chain slot 2: nothing continues SegmentId(7)"
        );
    }
}
