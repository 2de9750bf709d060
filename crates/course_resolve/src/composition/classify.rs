//! Threshold classifier: which vertical band an elevation (and its flags) represents.
//!
//! Precedence, first match wins:
//! 1. tunnel: either side at or below the tunnel threshold, or the tunnel flag;
//! 2. elevated: both sides at or above the elevated threshold, or the elevated flag;
//! 3. per side, retaining wall: strictly below zero and above the tunnel threshold,
//!    or the lowered flag;
//! 4. per side, quay: strictly between zero and the elevated threshold, or the
//!    raised flag;
//! 5. ground.
//!
//! Sides are only classified when the general band is ground.
use glam::Vec2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::composition::{CompositionFlags, GeneralFlags, Placement, Side, SideFlags};
use crate::thresholds::ThresholdTable;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GeneralBand {
    #[default]
    Ground,
    Tunnel,
    Elevated,
}

impl From<Placement> for GeneralBand {
    fn from(placement: Placement) -> Self {
        match placement {
            Placement::Ground => GeneralBand::Ground,
            Placement::Tunnel => GeneralBand::Tunnel,
            Placement::Elevated => GeneralBand::Elevated,
        }
    }
}

impl GeneralBand {
    /// Flags encoding this band.
    pub fn flags(self) -> GeneralFlags {
        match self {
            GeneralBand::Ground => GeneralFlags::empty(),
            GeneralBand::Tunnel => GeneralFlags::TUNNEL,
            GeneralBand::Elevated => GeneralFlags::ELEVATED,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SideBand {
    #[default]
    Ground,
    RetainingWall,
    Quay,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Classification {
    pub general: GeneralBand,
    pub left: SideBand,
    pub right: SideBand,
}

impl Classification {
    pub fn side(&self, side: Side) -> SideBand {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }
}

/// Classifies `elevation` (`(left, right)`) together with any existing flags.
pub fn classify(
    elevation: Vec2,
    flags: &CompositionFlags,
    thresholds: &ThresholdTable,
) -> Classification {
    let general = general_band(elevation, flags.general, thresholds);
    if general != GeneralBand::Ground {
        return Classification {
            general,
            ..Default::default()
        };
    }

    Classification {
        general,
        left: side_band(Side::Left.of(elevation), flags.left, thresholds),
        right: side_band(Side::Right.of(elevation), flags.right, thresholds),
    }
}

fn general_band(elevation: Vec2, flags: GeneralFlags, thresholds: &ThresholdTable) -> GeneralBand {
    if elevation.min_element() <= thresholds.tunnel || flags.contains(GeneralFlags::TUNNEL) {
        GeneralBand::Tunnel
    } else if elevation.min_element() >= thresholds.elevated
        || flags.contains(GeneralFlags::ELEVATED)
    {
        GeneralBand::Elevated
    } else {
        GeneralBand::Ground
    }
}

fn side_band(value: f32, flags: SideFlags, thresholds: &ThresholdTable) -> SideBand {
    if (value < 0.0 && value > thresholds.tunnel) || flags.contains(SideFlags::LOWERED) {
        SideBand::RetainingWall
    } else if (value > 0.0 && value < thresholds.elevated) || flags.contains(SideFlags::RAISED) {
        SideBand::Quay
    } else {
        SideBand::Ground
    }
}
