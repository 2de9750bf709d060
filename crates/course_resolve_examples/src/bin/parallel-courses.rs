use course_resolve::prelude::*;
use course_resolve_examples::{
    course_from_heights, init_tracing, parallel_course_from_heights, render_profile_to_png,
    shuffle, ProfileConfig, ProfileLine,
};

fn main() -> anyhow::Result<()> {
    init_tracing();

    let mut segments = course_from_heights(&[0.0, 2.0, 1.0, 5.0, 9.0], 25.0, 0);
    segments.extend(parallel_course_from_heights(
        &[0.0, -1.0, 3.0, 2.0, 9.0],
        25.0,
        8.0,
        100,
    ));
    // Nudge the last parallel segment so it no longer meets its neighbour.
    if let Some(segment) = segments.iter_mut().find(|s| s.id == SegmentId(103)) {
        segment.end.position.x += 0.25;
    }
    shuffle(&mut segments, 42);

    let request = CompositionRequest::builder()
        .general(GeneralSelection::CONSTANT_SLOPE | GeneralSelection::LIGHTING)
        .both_sides(SideUpgrades::TREES)
        .build();
    let frame = Frame::new(segments, request);

    let mut sink = FnSink::new(|event: EngineEvent| match event {
        EngineEvent::ChainAssembled { role, len, gaps } => {
            println!("{role:?}: {len} slot(s), {gaps} gap(s)");
        }
        EngineEvent::GradeApplied { role, grade, .. } => {
            println!("{role:?}: grade {grade:.4}");
        }
        EngineEvent::Warning { context, message } => {
            println!("warning [{context}]: {message}");
        }
        _ => {}
    });
    let result = CourseEngine::default().resolve_with_events(&frame, &(), &mut sink);

    let colors = [[40, 120, 240], [60, 170, 90]];
    let lines: Vec<ProfileLine> = result
        .primary
        .iter()
        .chain(result.parallel.iter())
        .zip(colors)
        .map(|(chain, color)| ProfileLine::from_chain(format!("{:?}", chain.role), color, chain))
        .collect();

    for unplaced in &result.unplaced {
        println!("unplaced {:?}: {:?}", unplaced.segment.id, unplaced.output.state);
    }

    render_profile_to_png(&lines, &ProfileConfig::default(), "parallel-courses.png")?;
    Ok(())
}
