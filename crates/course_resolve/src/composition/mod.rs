//! Composition flags, requests, band classification and flag resolution.
use glam::Vec2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::flags::bit_set;

pub mod classify;
pub mod request;
pub mod resolver;

pub use classify::{classify, Classification, GeneralBand, SideBand};
pub use request::{
    CompositionRequest, CompositionRequestBuilder, DrawMode, GeneralSelection, Placement,
    ReplaceTargets, SideUpgrades,
};
pub use resolver::{resolve, ResolutionState, ResolveInput, ResolvedOutput};

bit_set! {
    /// Composition flags shared by both sides of a segment.
    pub struct GeneralFlags: u32 {
        const ELEVATED = 1 << 0;
        const TUNNEL = 1 << 1;
        const WIDE_MEDIAN = 1 << 2;
        const LIGHTING = 1 << 3;
        const MEDIAN_TREES = 1 << 4;
        const MEDIAN_GRASS = 1 << 5;
    }
}

bit_set! {
    /// Composition flags of one side of a segment.
    pub struct SideFlags: u32 {
        /// Quay.
        const RAISED = 1 << 0;
        /// Retaining wall.
        const LOWERED = 1 << 1;
        const TREES = 1 << 2;
        const GRASS_STRIP = 1 << 3;
        const WIDE_SIDEWALK = 1 << 4;
        const SOUND_BARRIER = 1 << 5;
        const PRIMARY_TRACK = 1 << 6;
        const SECONDARY_TRACK = 1 << 7;
        const PRIMARY_LANE = 1 << 8;
        const SECONDARY_LANE = 1 << 9;
    }
}

impl GeneralFlags {
    /// Bits that encode the vertical placement band.
    pub const BAND: Self = Self::ELEVATED.union(Self::TUNNEL);
}

impl SideFlags {
    /// Bits that encode the vertical side band.
    pub const BAND: Self = Self::RAISED.union(Self::LOWERED);
    /// Transit markers the composition request never exposes; kept on replace.
    pub const CARRY_OVER: Self = Self::PRIMARY_TRACK
        .union(Self::SECONDARY_TRACK)
        .union(Self::PRIMARY_LANE)
        .union(Self::SECONDARY_LANE);
}

/// Left or right side of a segment, in its own start-to-end direction.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    /// Component of an elevation vector belonging to this side.
    #[inline]
    pub fn of(self, elevation: Vec2) -> f32 {
        match self {
            Side::Left => elevation.x,
            Side::Right => elevation.y,
        }
    }

    #[inline]
    pub fn set(self, elevation: &mut Vec2, value: f32) {
        match self {
            Side::Left => elevation.x = value,
            Side::Right => elevation.y = value,
        }
    }
}

/// Full set of composition flags written to a segment.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CompositionFlags {
    pub general: GeneralFlags,
    pub left: SideFlags,
    pub right: SideFlags,
}

impl CompositionFlags {
    pub fn new(general: GeneralFlags, left: SideFlags, right: SideFlags) -> Self {
        Self {
            general,
            left,
            right,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.general.is_empty() && self.left.is_empty() && self.right.is_empty()
    }

    pub fn side(&self, side: Side) -> SideFlags {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub fn side_mut(&mut self, side: Side) -> &mut SideFlags {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

/// Composition read from an existing segment before it is replaced.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ExistingComposition {
    pub flags: CompositionFlags,
    /// Elevation range `(left, right)`.
    pub elevation: Vec2,
}

impl ExistingComposition {
    pub fn new(flags: CompositionFlags, elevation: Vec2) -> Self {
        Self { flags, elevation }
    }
}
