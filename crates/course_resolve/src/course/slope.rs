//! Constant-grade propagation along an ordered chain.
//!
//! [`compute_grade`] derives a single grade from the chain's outer endpoints and
//! total length; [`apply_grade`] walks the chain in geometric order and re-levels
//! every interior knot and curve so the whole course follows that grade. Knot
//! elevation ranges are shifted by the same amount as the vertical position, which
//! keeps the height above terrain in step with the moved geometry.
use glam::Vec2;
use tracing::debug;

use crate::course::Chain;
use crate::geometry::{CubicCurve, KnotFlags, PathSegment};

/// Grade of a chain, or `None` when fewer than two segments are present or the
/// total length is not positive.
pub fn compute_grade(chain: &Chain) -> Option<f32> {
    let present: Vec<&PathSegment> = chain.iter_geometric().flatten().collect();
    if present.len() < 2 {
        return None;
    }

    let total_length: f32 = present.iter().map(|s| s.length).sum();
    if !(total_length.is_finite() && total_length > 0.0) {
        debug!("Chain length {total_length} cannot carry a grade.");
        return None;
    }

    let head = present[0].start.vertical();
    let tail = present[present.len() - 1].end.vertical();
    let grade = (tail - head) / total_length;
    debug!("Grade {grade} over {total_length} (from {head} to {tail}).");
    Some(grade)
}

/// Rewrites the chain so every segment follows `grade`. Empty slots are skipped;
/// a segment in front of a gap is still levelled, only the copy onto its missing
/// successor is dropped. The last present segment keeps its end knot.
pub fn apply_grade(chain: &mut Chain, grade: f32) {
    if chain.segments().count() < 2 {
        return;
    }

    let order = chain.geometric_indices();
    let Some(last) = order.iter().copied().rfind(|&i| chain.slots[i].is_some()) else {
        return;
    };

    for pair in order.windows(2) {
        let (i, j) = (pair[0], pair[1]);
        if i == last {
            break;
        }
        let next_start = chain.slots[j].map(|s| s.start);
        let Some(segment) = chain.slots[i].as_mut() else {
            continue;
        };

        let end_y = segment.start.position.y + grade * segment.length;
        let old_end_y = next_start.map_or(segment.end.position.y, |k| k.position.y);
        segment.end.position.y = end_y;
        segment.end.elevation += Vec2::splat(end_y - old_end_y);
        segment.end.flags.insert(KnotFlags::FREE_HEIGHT);
        segment.elevation = (segment.start.elevation + segment.end.elevation) * 0.5;
        relevel_curve(&mut segment.curve, segment.start.position.y, end_y, grade);

        let (end_position, end_elevation) = (segment.end.position, segment.end.elevation);
        if let Some(next) = chain.slots[j].as_mut() {
            next.start.position.y = end_position.y;
            next.start.elevation = end_elevation;
            next.curve.a.y = end_position.y;
        }
    }

    if let Some(segment) = chain.slots[last].as_mut() {
        let (start_y, end_y) = (segment.start.position.y, segment.end.position.y);
        // Behind a gap the start was never moved, so follow the segment's own rise.
        let local = if segment.length > 0.0 {
            (end_y - start_y) / segment.length
        } else {
            grade
        };
        relevel_curve(&mut segment.curve, start_y, end_y, local);
        segment.elevation = (segment.start.elevation + segment.end.elevation) * 0.5;
    }
}

/// Keeps the horizontal shape of `curve` and lifts its inner control points onto
/// the grade line through `start_y`.
fn relevel_curve(curve: &mut CubicCurve, start_y: f32, end_y: f32, grade: f32) {
    let b_offset = curve.horizontal_offset(curve.b);
    let c_offset = curve.horizontal_offset(curve.c);
    curve.a.y = start_y;
    curve.b.y = start_y + grade * b_offset;
    curve.c.y = start_y + grade * c_offset;
    curve.d.y = end_y;
}
