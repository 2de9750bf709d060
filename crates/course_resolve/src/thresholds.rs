//! Vertical placement bands expressed as elevation thresholds.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// At or below this elevation a point counts as tunnel.
pub const DEFAULT_TUNNEL_THRESHOLD: f32 = -25.0;
/// Retaining walls pull a side down to at least this elevation.
pub const DEFAULT_RETAINING_WALL_THRESHOLD: f32 = -4.0;
/// Quays lift a side up to at least this elevation.
pub const DEFAULT_QUAY_THRESHOLD: f32 = 4.0;
/// At or above this elevation (both sides) a point counts as elevated.
pub const DEFAULT_ELEVATED_THRESHOLD: f32 = 10.0;
/// Elevation written when ground placement is forced.
pub const DEFAULT_FORCE_GROUND_ELEVATION: f32 = 0.0;

/// Named thresholds classifying vertical placement.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThresholdTable {
    pub tunnel: f32,
    pub retaining_wall: f32,
    pub quay: f32,
    pub elevated: f32,
    pub force_ground: f32,
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self {
            tunnel: DEFAULT_TUNNEL_THRESHOLD,
            retaining_wall: DEFAULT_RETAINING_WALL_THRESHOLD,
            quay: DEFAULT_QUAY_THRESHOLD,
            elevated: DEFAULT_ELEVATED_THRESHOLD,
            force_ground: DEFAULT_FORCE_GROUND_ELEVATION,
        }
    }
}

impl ThresholdTable {
    pub fn with_tunnel(mut self, tunnel: f32) -> Self {
        self.tunnel = tunnel;
        self
    }

    pub fn with_retaining_wall(mut self, retaining_wall: f32) -> Self {
        self.retaining_wall = retaining_wall;
        self
    }

    pub fn with_quay(mut self, quay: f32) -> Self {
        self.quay = quay;
        self
    }

    pub fn with_elevated(mut self, elevated: f32) -> Self {
        self.elevated = elevated;
        self
    }

    pub fn with_force_ground(mut self, force_ground: f32) -> Self {
        self.force_ground = force_ground;
        self
    }

    /// Validates the table, returning an error if the bands are not ordered
    /// `tunnel < retaining_wall < force_ground < quay < elevated`.
    pub fn validate(&self) -> Result<()> {
        let named = [
            ("tunnel", self.tunnel),
            ("retaining_wall", self.retaining_wall),
            ("force_ground", self.force_ground),
            ("quay", self.quay),
            ("elevated", self.elevated),
        ];

        for (name, value) in named {
            if !value.is_finite() {
                return Err(Error::InvalidThreshold {
                    name,
                    reason: format!("must be finite, got {value}"),
                });
            }
        }

        for pair in named.windows(2) {
            let (lower_name, lower) = pair[0];
            let (name, value) = pair[1];
            if value <= lower {
                return Err(Error::InvalidThreshold {
                    name,
                    reason: format!("must be greater than {lower_name} ({lower}), got {value}"),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let table = ThresholdTable::default();
        table.validate().expect("defaults validate");
        assert_eq!(table.tunnel, -25.0);
        assert_eq!(table.retaining_wall, -4.0);
        assert_eq!(table.quay, 4.0);
        assert_eq!(table.elevated, 10.0);
        assert_eq!(table.force_ground, 0.0);
    }

    #[test]
    fn validate_rejects_unordered_bands() {
        let table = ThresholdTable::default().with_quay(12.0);
        let err = table.validate().expect_err("quay above elevated");
        assert!(matches!(
            err,
            Error::InvalidThreshold {
                name: "elevated",
                ..
            }
        ));
    }

    #[test]
    fn validate_rejects_non_finite_values() {
        let table = ThresholdTable::default().with_tunnel(f32::NEG_INFINITY);
        assert!(matches!(
            table.validate(),
            Err(Error::InvalidThreshold { name: "tunnel", .. })
        ));
    }

    #[test]
    fn force_ground_must_sit_between_wall_and_quay() {
        let table = ThresholdTable::default().with_force_ground(5.0);
        assert!(matches!(
            table.validate(),
            Err(Error::InvalidThreshold { name: "quay", .. })
        ));
    }
}
