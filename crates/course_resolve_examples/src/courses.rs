use course_resolve::prelude::{Knot, KnotFlags, PathSegment, SegmentId};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Straight course along `x` whose knots sit at the given heights.
///
/// `heights` holds one value per knot, so `heights.len() - 1` segments are built,
/// each `spacing` long. Ids start at `first_id`.
pub fn course_from_heights(heights: &[f32], spacing: f32, first_id: u32) -> Vec<PathSegment> {
    build(heights, spacing, 0.0, first_id, KnotFlags::empty())
        .into_iter()
        .map(|(id, start, end)| PathSegment::straight(id, start, end))
        .collect()
}

/// Parallel course offset by `lateral` along `z`, drawn against the primary
/// direction: every segment runs from its far knot back to its near one, and the
/// head carries the first-knot flag on its end.
pub fn parallel_course_from_heights(
    heights: &[f32],
    spacing: f32,
    lateral: f32,
    first_id: u32,
) -> Vec<PathSegment> {
    build(heights, spacing, lateral, first_id, KnotFlags::IS_PARALLEL)
        .into_iter()
        .map(|(id, near, far)| PathSegment::straight(id, far, near))
        .collect()
}

fn build(
    heights: &[f32],
    spacing: f32,
    lateral: f32,
    first_id: u32,
    flags: KnotFlags,
) -> Vec<(SegmentId, Knot, Knot)> {
    let count = heights.len().saturating_sub(1);
    (0..count)
        .map(|i| {
            let knot = |k: usize| {
                Knot::new(Vec3::new(k as f32 * spacing, heights[k], lateral)).with_flags(flags)
            };
            let mut near = knot(i);
            let mut far = knot(i + 1);
            if i == 0 {
                near.flags.insert(KnotFlags::IS_FIRST);
            }
            if i + 1 == count {
                far.flags.insert(KnotFlags::IS_LAST);
            }
            (SegmentId(first_id + i as u32), near, far)
        })
        .collect()
}

/// Seeded Fisher–Yates shuffle so demos show the assembler at work.
pub fn shuffle<T>(items: &mut [T], seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut n = items.len();
    while n > 1 {
        let k = (rng.next_u32() as usize) % n;
        n -= 1;
        items.swap(n, k);
    }
}
