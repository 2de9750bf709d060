use std::time::Duration;

use course_resolve::prelude::{Knot, KnotFlags, PathSegment, SegmentId};
use criterion::{Criterion, Throughput};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const SAMPLE_SIZE: usize = 20;
pub const WARM_UP: Duration = Duration::from_secs(1);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(2);

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

pub fn elements_throughput(elements: usize) -> Throughput {
    Throughput::Elements(elements.max(1) as u64)
}

/// Straight course of `count` segments along `x`, climbing to `rise` at the tail,
/// returned in a seeded random order.
pub fn shuffled_course(count: usize, rise: f32, seed: u64) -> Vec<PathSegment> {
    let mut segments: Vec<PathSegment> = (0..count)
        .map(|i| {
            let mut start = Knot::new(Vec3::new(i as f32 * 8.0, 0.0, 0.0));
            let mut end = Knot::new(Vec3::new((i + 1) as f32 * 8.0, 0.0, 0.0));
            if i == 0 {
                start.flags.insert(KnotFlags::IS_FIRST);
            }
            if i + 1 == count {
                end.flags.insert(KnotFlags::IS_LAST);
                end.position.y = rise;
            }
            PathSegment::straight(SegmentId(i as u32), start, end)
        })
        .collect();

    let mut rng = StdRng::seed_from_u64(seed);
    for i in (1..segments.len()).rev() {
        let j = (rng.next_u32() as usize) % (i + 1);
        segments.swap(i, j);
    }
    segments
}
