//! Course graph assembler: rebuilds the visiting order of unordered segments.
//!
//! Segments are partitioned by [`KnotFlags::IS_PARALLEL`]. The primary chain starts
//! at the segment whose start knot is flagged [`KnotFlags::IS_FIRST`] and links each
//! successor whose start equals the current tail's end. The parallel course is
//! drawn in reverse, so its head is the segment whose *end* knot is flagged
//! `IS_FIRST` and links follow end-to-start (see [`Traversal::Reversed`]).
//!
//! Endpoints are compared with exact floating-point equality. Shared endpoints come
//! from a single upstream computation and are expected to be bit-identical; a
//! near-miss is reported as [`AssemblyIssue::MissingSuccessor`] rather than
//! silently snapped.
use tracing::{debug, warn};

use crate::course::{AssembledCourse, AssemblyIssue, Chain, ChainRole, Traversal};
use crate::geometry::{KnotFlags, PathSegment};

/// Orders the given segments into a primary chain and an optional parallel chain.
pub fn assemble(segments: &[PathSegment]) -> AssembledCourse {
    let (parallel, primary): (Vec<PathSegment>, Vec<PathSegment>) =
        segments.iter().copied().partition(PathSegment::is_parallel);

    let mut course = AssembledCourse::default();

    if !primary.is_empty() {
        let (chain, unplaced) = order_chain(primary, ChainRole::Primary, &mut course.issues);
        course.primary = Some(chain);
        course.unplaced.extend(unplaced);
    }
    if !parallel.is_empty() {
        let (chain, unplaced) = order_chain(parallel, ChainRole::Parallel, &mut course.issues);
        course.parallel = Some(chain);
        course.unplaced.extend(unplaced);
    }

    debug!(
        "Assembled course: primary {} slot(s), parallel {} slot(s), {} unplaced, {} issue(s).",
        course.primary.as_ref().map_or(0, Chain::len),
        course.parallel.as_ref().map_or(0, Chain::len),
        course.unplaced.len(),
        course.issues.len(),
    );

    course
}

/// Links one partition into a chain. Returns the chain and any segments that
/// could not be placed.
pub fn order_chain(
    mut pool: Vec<PathSegment>,
    role: ChainRole,
    issues: &mut Vec<AssemblyIssue>,
) -> (Chain, Vec<PathSegment>) {
    let traversal = match role {
        ChainRole::Primary => Traversal::Forward,
        ChainRole::Parallel => Traversal::Reversed,
    };
    let count = pool.len();
    let mut slots: Vec<Option<PathSegment>> = Vec::with_capacity(count);

    if count <= 1 {
        slots.extend(pool.pop().map(Some));
        return (Chain::new(traversal, slots), Vec::new());
    }

    let heads: Vec<usize> = pool
        .iter()
        .enumerate()
        .filter(|(_, s)| traversal.is_head(s))
        .map(|(i, _)| i)
        .collect();
    if heads.len() > 1 {
        let candidates = heads.iter().map(|&i| pool[i].id).collect::<Vec<_>>();
        warn!("{role:?} chain has {} heads {candidates:?}; using the first.", heads.len());
        issues.push(AssemblyIssue::DuplicateHead { role, candidates });
    }

    let mut tail: Option<PathSegment> = match heads.first() {
        Some(&i) => Some(pool.remove(i)),
        None => {
            warn!("{role:?} chain has no segment flagged {:?}.", KnotFlags::IS_FIRST);
            issues.push(AssemblyIssue::MissingHead { role });
            None
        }
    };
    slots.push(tail);

    for slot in 1..count {
        let next = tail.and_then(|t| {
            let link = traversal.exit(&t);
            pool.iter().position(|s| traversal.entry(s) == link)
        });

        match next {
            Some(i) => {
                let segment = pool.remove(i);
                tail = Some(segment);
                slots.push(Some(segment));
            }
            None => {
                let after = tail.map(|t| t.id);
                warn!("{role:?} chain slot {slot}: no successor after {after:?}.");
                issues.push(AssemblyIssue::MissingSuccessor { role, slot, after });
                slots.push(None);
            }
        }
    }

    (Chain::new(traversal, slots), pool)
}

#[cfg(test)]
mod tests {
    use glam::{Vec2, Vec3};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::geometry::{Knot, SegmentId};

    fn point(i: usize) -> Vec3 {
        // Irregular coordinates so equality is not trivially satisfied.
        Vec3::new(i as f32 * 7.25, (i as f32 * 0.37).sin() * 3.0, i as f32 * -1.5)
    }

    fn forward_course(n: usize, id_offset: u32, extra: KnotFlags) -> Vec<PathSegment> {
        (0..n)
            .map(|i| {
                let mut start = Knot::new(point(i)).with_flags(extra);
                let mut end = Knot::new(point(i + 1)).with_flags(extra);
                if i == 0 {
                    start.flags.insert(KnotFlags::IS_FIRST);
                }
                if i + 1 == n {
                    end.flags.insert(KnotFlags::IS_LAST);
                }
                PathSegment::straight(SegmentId(id_offset + i as u32), start, end)
            })
            .collect()
    }

    /// Parallel courses run opposite to drawing order: segment `i` goes from
    /// point `i + 1` back to point `i`, and the drawing start sits on its end knot.
    fn parallel_course(n: usize, id_offset: u32) -> Vec<PathSegment> {
        (0..n)
            .map(|i| {
                let offset = Vec3::new(0.0, 0.0, 4.0);
                let mut start = Knot::new(point(i + 1) + offset).with_flags(KnotFlags::IS_PARALLEL);
                let mut end = Knot::new(point(i) + offset).with_flags(KnotFlags::IS_PARALLEL);
                if i == 0 {
                    end.flags.insert(KnotFlags::IS_FIRST);
                }
                if i + 1 == n {
                    start.flags.insert(KnotFlags::IS_LAST);
                }
                PathSegment::straight(SegmentId(id_offset + i as u32), start, end)
            })
            .collect()
    }

    fn shuffle(segments: &mut [PathSegment], seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        for i in (1..segments.len()).rev() {
            let j = (rng.next_u32() as usize) % (i + 1);
            segments.swap(i, j);
        }
    }

    fn assert_linked(chain: &Chain) {
        let present: Vec<_> = chain.iter_geometric().flatten().collect();
        for pair in present.windows(2) {
            assert_eq!(pair[0].end.position, pair[1].start.position);
        }
    }

    #[test]
    fn orders_shuffled_primary_chain() {
        for seed in 0..8 {
            let mut segments = forward_course(6, 0, KnotFlags::empty());
            shuffle(&mut segments, seed);

            let course = assemble(&segments);
            assert!(course.is_well_formed());
            let chain = course.primary.expect("primary chain");
            assert_eq!(chain.ids(), (0..6).map(SegmentId).collect::<Vec<_>>());
            assert_linked(&chain);

            let first = chain.slots[0].expect("head");
            let last = chain.slots[5].expect("tail");
            assert!(first.start.has(KnotFlags::IS_FIRST));
            assert!(last.end.has(KnotFlags::IS_LAST));
        }
    }

    #[test]
    fn orders_parallel_chain_from_end_flagged_head() {
        let mut segments = forward_course(4, 0, KnotFlags::empty());
        segments.extend(parallel_course(4, 100));
        shuffle(&mut segments, 99);

        let course = assemble(&segments);
        assert!(course.is_well_formed());

        let parallel = course.parallel.expect("parallel chain");
        assert_eq!(parallel.traversal, Traversal::Reversed);
        assert_eq!(
            parallel.ids(),
            vec![SegmentId(100), SegmentId(101), SegmentId(102), SegmentId(103)]
        );
        assert_linked(&parallel);
        assert_eq!(course.primary.expect("primary").len(), 4);
    }

    #[test]
    fn single_and_empty_partitions_skip_linking() {
        let course = assemble(&[]);
        assert!(course.primary.is_none());
        assert!(course.parallel.is_none());

        // A lone segment needs no head flag.
        let lone = PathSegment::straight(SegmentId(5), Knot::new(Vec3::ZERO), Knot::new(Vec3::X));
        let course = assemble(&[lone]);
        assert!(course.is_well_formed());
        assert_eq!(course.primary.expect("chain").ids(), vec![SegmentId(5)]);
    }

    #[test]
    fn broken_link_leaves_gaps_and_unplaced_segments() {
        let mut segments = forward_course(4, 0, KnotFlags::empty());
        // Nudge the start of segment 2 so it no longer matches bit-exactly.
        segments[2].start.position.x += 1e-3;

        let course = assemble(&segments);
        let chain = course.primary.as_ref().expect("chain");
        assert_eq!(chain.len(), 4);
        assert_eq!(chain.gap_count(), 2);
        assert_eq!(chain.ids(), vec![SegmentId(0), SegmentId(1)]);

        let mut unplaced: Vec<_> = course.unplaced.iter().map(|s| s.id).collect();
        unplaced.sort();
        assert_eq!(unplaced, vec![SegmentId(2), SegmentId(3)]);
        assert_eq!(
            course.issues[0],
            AssemblyIssue::MissingSuccessor {
                role: ChainRole::Primary,
                slot: 2,
                after: Some(SegmentId(1)),
            }
        );
    }

    #[test]
    fn missing_head_yields_empty_first_slot() {
        let mut segments = forward_course(3, 0, KnotFlags::empty());
        segments[0].start.flags.remove(KnotFlags::IS_FIRST);

        let course = assemble(&segments);
        let chain = course.primary.as_ref().expect("chain");
        assert!(chain.slots.iter().all(Option::is_none));
        assert_eq!(course.unplaced.len(), 3);
        assert!(course
            .issues
            .contains(&AssemblyIssue::MissingHead { role: ChainRole::Primary }));
    }

    #[test]
    fn duplicate_head_is_reported_and_first_wins() {
        let mut segments = forward_course(3, 0, KnotFlags::empty());
        segments[2].start.flags.insert(KnotFlags::IS_FIRST);

        let course = assemble(&segments);
        assert!(matches!(
            course.issues[0],
            AssemblyIssue::DuplicateHead { role: ChainRole::Primary, .. }
        ));
        assert_eq!(
            course.primary.expect("chain").ids(),
            vec![SegmentId(0), SegmentId(1), SegmentId(2)]
        );
    }

    #[test]
    fn elevation_does_not_affect_linking() {
        let mut segments = forward_course(2, 0, KnotFlags::empty());
        segments[1].start.elevation = Vec2::new(3.0, 3.0);
        let course = assemble(&segments);
        assert!(course.is_well_formed());
    }
}
