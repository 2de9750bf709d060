//! Engine configuration.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::thresholds::ThresholdTable;

/// Gap kept between the highest quay elevation and the elevated band.
pub const DEFAULT_QUAY_EPSILON: f32 = 0.01;

/// Configuration for resolving course frames.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Band thresholds shared by the classifier and the resolver.
    pub thresholds: ThresholdTable,
    /// Quays are clamped to `elevated - quay_epsilon` at most.
    pub quay_epsilon: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            thresholds: ThresholdTable::default(),
            quay_epsilon: DEFAULT_QUAY_EPSILON,
        }
    }
}

impl EngineConfig {
    pub fn new(thresholds: ThresholdTable) -> Self {
        Self {
            thresholds,
            ..Default::default()
        }
    }

    /// Sets the threshold table.
    pub fn with_thresholds(mut self, thresholds: ThresholdTable) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Sets the quay epsilon.
    pub fn with_quay_epsilon(mut self, quay_epsilon: f32) -> Self {
        self.quay_epsilon = quay_epsilon;
        self
    }

    /// Highest elevation a quay side may reach.
    #[inline]
    pub fn quay_ceiling(&self) -> f32 {
        self.thresholds.elevated - self.quay_epsilon
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate()?;

        if !(self.quay_epsilon.is_finite() && self.quay_epsilon > 0.0) {
            return Err(Error::InvalidConfig("quay_epsilon must be > 0".into()));
        }
        if self.quay_ceiling() <= self.thresholds.quay {
            return Err(Error::InvalidConfig(
                "quay_epsilon must be smaller than the gap between quay and elevated".into(),
            ));
        }

        Ok(())
    }
}
