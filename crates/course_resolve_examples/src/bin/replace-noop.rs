use std::collections::HashMap;

use course_resolve::prelude::*;
use course_resolve_examples::{course_from_heights, init_tracing};
use glam::Vec2;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let segments = course_from_heights(&[0.0, 0.0, 0.0, 0.0], 10.0, 0);

    // Segment 0 is already elevated, segment 1 is a quay on the left, segment 2 is bare.
    let existing: HashMap<SegmentId, ExistingComposition> = [
        (
            SegmentId(0),
            ExistingComposition::new(
                CompositionFlags::new(GeneralFlags::ELEVATED, SideFlags::empty(), SideFlags::empty()),
                Vec2::splat(12.0),
            ),
        ),
        (
            SegmentId(1),
            ExistingComposition::new(
                CompositionFlags::new(GeneralFlags::empty(), SideFlags::RAISED, SideFlags::empty()),
                Vec2::new(4.0, 0.0),
            ),
        ),
        (
            SegmentId(2),
            ExistingComposition::new(CompositionFlags::default(), Vec2::ZERO),
        ),
    ]
    .into();

    let engine = CourseEngine::default();
    let requests = [
        (
            "elevated",
            CompositionRequest::builder()
                .placement(Placement::Elevated)
                .build(),
        ),
        (
            "left quay",
            CompositionRequest::builder()
                .left(SideUpgrades::QUAY)
                .replace_targets(ReplaceTargets {
                    general: false,
                    left: true,
                    right: false,
                })
                .build(),
        ),
    ];

    for (label, request) in requests {
        let frame = Frame::new(segments.clone(), request)
            .with_mode(DrawMode::Replace)
            .with_tool_elevation(2.0);
        let result = engine.resolve(&frame, &existing);

        println!("{label}: {} of {} segment(s) change", result.changed_count(), result.len());
        for r in result.iter() {
            println!(
                "  {:?}: {:?}, elevation {:?}, flags {:?}",
                r.segment.id,
                r.output.state,
                r.output.elevation,
                r.output.composition
            );
        }
    }

    Ok(())
}
