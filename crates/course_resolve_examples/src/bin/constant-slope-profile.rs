use course_resolve::prelude::*;
use course_resolve_examples::{
    course_from_heights, init_tracing, render_profile_to_png, shuffle, ProfileConfig,
    ProfileLine,
};

fn main() -> anyhow::Result<()> {
    init_tracing();

    // A bumpy course handed over out of order
    let heights = [0.0, 3.0, -2.0, 8.0, 4.0, 6.0, 12.0];
    let mut segments = course_from_heights(&heights, 20.0, 0);
    shuffle(&mut segments, 7);

    let engine = CourseEngine::try_new(EngineConfig::default())?;

    // Grid mode orders and classifies without touching the geometry
    let drawn = engine.resolve(
        &Frame::new(segments.clone(), CompositionRequest::default()).with_mode(DrawMode::Grid),
        &(),
    );
    let request = CompositionRequest::builder()
        .general(GeneralSelection::CONSTANT_SLOPE)
        .build();
    let levelled = engine.resolve(&Frame::new(segments, request), &());

    let (Some(before), Some(after)) = (drawn.primary.as_ref(), levelled.primary.as_ref()) else {
        anyhow::bail!("course has no primary chain");
    };
    if let Some(grade) = after.grade {
        println!("constant grade: {grade:.4}");
    }
    for result in &after.segments {
        println!(
            "{:?}: end height {:.2}, elevation {:?}",
            result.segment.id, result.segment.end.position.y, result.output.elevation
        );
    }

    render_profile_to_png(
        &[
            ProfileLine::from_chain("drawn", [200, 90, 60], before),
            ProfileLine::from_chain("levelled", [40, 120, 240], after),
        ],
        &ProfileConfig::new((1000, 400)),
        "constant-slope-profile.png",
    )?;

    Ok(())
}
