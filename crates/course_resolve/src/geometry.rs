//! Course geometry handed over by the host each frame.
//!
//! A [`PathSegment`] is one drawn course piece: two [`Knot`]s, the cubic
//! [`CubicCurve`] between them, its length and its own elevation range.
//! The vertical axis is `y`; horizontal distances are measured on the `xz` plane.
//! Elevation vectors hold `(left, right)` offsets above the terrain.
use glam::{Vec2, Vec3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::flags::bit_set;

bit_set! {
    /// Adjacency flags carried by a course knot.
    pub struct KnotFlags: u8 {
        /// The knot is the first point of the drawn course.
        const IS_FIRST = 1 << 0;
        /// The knot is the last point of the drawn course.
        const IS_LAST = 1 << 1;
        /// The segment belongs to the parallel companion course.
        const IS_PARALLEL = 1 << 2;
        /// The vertical position of the knot may be rewritten.
        const FREE_HEIGHT = 1 << 3;
    }
}

/// Host-side identifier of a segment, used to map results back to storage.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentId(pub u32);

/// One endpoint of a course segment.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Knot {
    /// World position of the knot.
    pub position: Vec3,
    /// Elevation above terrain, `(left, right)`.
    pub elevation: Vec2,
    /// Adjacency flags.
    pub flags: KnotFlags,
}

impl Knot {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            elevation: Vec2::ZERO,
            flags: KnotFlags::empty(),
        }
    }

    pub fn with_elevation(mut self, elevation: Vec2) -> Self {
        self.elevation = elevation;
        self
    }

    pub fn with_flags(mut self, flags: KnotFlags) -> Self {
        self.flags = flags;
        self
    }

    #[inline]
    pub fn vertical(&self) -> f32 {
        self.position.y
    }

    #[inline]
    pub fn has(&self, flags: KnotFlags) -> bool {
        self.flags.contains(flags)
    }
}

/// Cubic Bezier curve with control points `a`, `b`, `c`, `d`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CubicCurve {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
    pub d: Vec3,
}

impl CubicCurve {
    pub fn new(a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> Self {
        Self { a, b, c, d }
    }

    /// Straight curve with inner control points at one and two thirds.
    pub fn straight(start: Vec3, end: Vec3) -> Self {
        Self {
            a: start,
            b: start.lerp(end, 1.0 / 3.0),
            c: start.lerp(end, 2.0 / 3.0),
            d: end,
        }
    }

    /// B(t) = (1-t)³·A + 3(1-t)²t·B + 3(1-t)t²·C + t³·D
    pub fn evaluate(&self, t: f32) -> Vec3 {
        let mt = 1.0 - t;
        let mt2 = mt * mt;
        let t2 = t * t;
        self.a * (mt2 * mt) + self.b * (3.0 * mt2 * t) + self.c * (3.0 * mt * t2) + self.d * (t2 * t)
    }

    /// Distance of `point` from the curve start, ignoring the vertical axis.
    #[inline]
    pub fn horizontal_offset(&self, point: Vec3) -> f32 {
        horizontal_distance(self.a, point)
    }

    /// Polyline approximation of the horizontal curve length.
    pub fn horizontal_length(&self, samples: usize) -> f32 {
        let samples = samples.max(1);
        let mut length = 0.0;
        let mut prev = self.a;
        for i in 1..=samples {
            let p = self.evaluate(i as f32 / samples as f32);
            length += horizontal_distance(prev, p);
            prev = p;
        }
        length
    }
}

/// Distance between two points on the `xz` plane.
#[inline]
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    Vec2::new(b.x - a.x, b.z - a.z).length()
}

/// One drawn course piece.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PathSegment {
    pub id: SegmentId,
    pub start: Knot,
    pub end: Knot,
    pub curve: CubicCurve,
    /// Course length along the curve.
    pub length: f32,
    /// The segment's own elevation range, independent of its knots.
    pub elevation: Vec2,
}

impl PathSegment {
    /// Creates a segment; its elevation range is the mean of the knot elevations.
    pub fn new(id: SegmentId, start: Knot, end: Knot, curve: CubicCurve, length: f32) -> Self {
        Self {
            id,
            start,
            end,
            curve,
            length,
            elevation: (start.elevation + end.elevation) * 0.5,
        }
    }

    /// Creates a straight segment between two knots.
    pub fn straight(id: SegmentId, start: Knot, end: Knot) -> Self {
        let curve = CubicCurve::straight(start.position, end.position);
        Self::new(id, start, end, curve, start.position.distance(end.position))
    }

    pub fn with_elevation(mut self, elevation: Vec2) -> Self {
        self.elevation = elevation;
        self
    }

    /// Overrides the length reported by the host, e.g. an arc length.
    pub fn with_length(mut self, length: f32) -> Self {
        self.length = length;
        self
    }

    /// Returns `true` if either knot belongs to the parallel course.
    pub fn is_parallel(&self) -> bool {
        self.start.has(KnotFlags::IS_PARALLEL) || self.end.has(KnotFlags::IS_PARALLEL)
    }
}
