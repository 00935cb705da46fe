//! Constant-confidence ray measurement model.

use serde::{Deserialize, Serialize};

use super::{MeasurementModel, log_odds_from_probability};
use crate::config::validate::{require_gt, require_lt};
use crate::config::{ConfigError, ParamMap, ValidatedConfig};

/// Update magnitudes for [`ConstantRay`].
///
/// Defaults correspond to P(occupied) ≈ 0.40 for traversed cells and
/// P(occupied) ≈ 0.70 for the return cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConstantRayConfig {
    /// Log-odds added to cells the ray passed through (must be < 0).
    pub log_odds_free: f32,
    /// Log-odds added to the cell containing the return (must be > 0).
    pub log_odds_occupied: f32,
}

impl Default for ConstantRayConfig {
    fn default() -> Self {
        Self {
            log_odds_free: -0.4,
            log_odds_occupied: 0.85,
        }
    }
}

impl ConstantRayConfig {
    /// Build from occupancy probabilities instead of log-odds.
    pub fn from_probabilities(probability_free: f32, probability_occupied: f32) -> Self {
        Self {
            log_odds_free: log_odds_from_probability(probability_free),
            log_odds_occupied: log_odds_from_probability(probability_occupied),
        }
    }
}

impl ValidatedConfig for ConstantRayConfig {
    const NAME: &'static str = "ConstantRayConfig";

    fn validation_errors(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        require_lt(&mut errors, "log_odds_free", self.log_odds_free, 0.0);
        require_gt(&mut errors, "log_odds_occupied", self.log_odds_occupied, 0.0);
        errors
    }

    fn parse_params(params: &ParamMap) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            log_odds_free: params.get_f32("log_odds_free", defaults.log_odds_free)?,
            log_odds_occupied: params.get_f32("log_odds_occupied", defaults.log_odds_occupied)?,
        })
    }
}

/// Every cell before the surface is free with constant confidence; the cell
/// holding the return is occupied with constant confidence.
///
/// The terminal cell is recognised by comparing distances, not by its
/// position in the traversal, so rays of any length are handled the same way.
/// Only the step reported at the full ray length counts as terminal; interior
/// cells entered arbitrarily close to the return stay free.
#[derive(Clone, Debug)]
pub struct ConstantRay {
    config: ConstantRayConfig,
}

impl ConstantRay {
    /// Create the model from a config, rejecting invalid magnitudes.
    pub fn new(config: ConstantRayConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            config: config.check_valid()?,
        })
    }

    /// Model configuration
    pub fn config(&self) -> &ConstantRayConfig {
        &self.config
    }
}

impl Default for ConstantRay {
    fn default() -> Self {
        Self {
            config: ConstantRayConfig::default(),
        }
    }
}

impl MeasurementModel for ConstantRay {
    #[inline]
    fn update_at(&self, distance: f32, ray_length: f32) -> f32 {
        if ray_length.is_finite() && distance >= ray_length {
            self.occupied_update()
        } else {
            self.free_update()
        }
    }

    #[inline]
    fn free_update(&self) -> f32 {
        self.config.log_odds_free
    }

    #[inline]
    fn occupied_update(&self) -> f32 {
        self.config.log_odds_occupied
    }
}
