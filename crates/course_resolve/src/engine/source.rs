//! Host accessor for compositions already written to segments.
use std::collections::{BTreeMap, HashMap};

use crate::composition::ExistingComposition;
use crate::geometry::SegmentId;

/// Looks up the composition a segment carries before it is replaced.
pub trait ExistingSource {
    fn existing(&self, id: SegmentId) -> Option<ExistingComposition>;
}

/// No segment carries a composition.
impl ExistingSource for () {
    #[inline]
    fn existing(&self, _id: SegmentId) -> Option<ExistingComposition> {
        None
    }
}

impl<S: std::hash::BuildHasher> ExistingSource for HashMap<SegmentId, ExistingComposition, S> {
    fn existing(&self, id: SegmentId) -> Option<ExistingComposition> {
        self.get(&id).copied()
    }
}

impl ExistingSource for BTreeMap<SegmentId, ExistingComposition> {
    fn existing(&self, id: SegmentId) -> Option<ExistingComposition> {
        self.get(&id).copied()
    }
}

/// Source backed by a user-provided closure.
pub struct FnExistingSource<F>
where
    F: Fn(SegmentId) -> Option<ExistingComposition>,
{
    f: F,
}

impl<F> FnExistingSource<F>
where
    F: Fn(SegmentId) -> Option<ExistingComposition>,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> ExistingSource for FnExistingSource<F>
where
    F: Fn(SegmentId) -> Option<ExistingComposition>,
{
    #[inline]
    fn existing(&self, id: SegmentId) -> Option<ExistingComposition> {
        (self.f)(id)
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::composition::CompositionFlags;

    fn sample() -> ExistingComposition {
        ExistingComposition::new(CompositionFlags::default(), Vec2::splat(3.0))
    }

    #[test]
    fn maps_return_stored_compositions() {
        let mut hashed = HashMap::new();
        hashed.insert(SegmentId(4), sample());
        assert_eq!(hashed.existing(SegmentId(4)), Some(sample()));
        assert_eq!(hashed.existing(SegmentId(5)), None);

        let ordered: BTreeMap<_, _> = hashed.into_iter().collect();
        assert_eq!(ordered.existing(SegmentId(4)), Some(sample()));
    }

    #[test]
    fn closure_source_forwards_lookups() {
        let source = FnExistingSource::new(|id| (id.0 % 2 == 0).then(sample));
        assert!(source.existing(SegmentId(2)).is_some());
        assert!(source.existing(SegmentId(3)).is_none());
        assert!(().existing(SegmentId(2)).is_none());
    }
}
