//! Per-cell fusion rule.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// How an update combines with a cell's current value.
///
/// `Unbounded` addition is associative and commutative. `Saturating` clamps
/// after every addition, so the result depends on update order only for
/// sequences that reach a bound.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CellFusion {
    /// `value + update`
    #[default]
    Unbounded,
    /// `clamp(value + update, min, max)`
    Saturating {
        /// Lower log-odds bound (< 0)
        min: f32,
        /// Upper log-odds bound (> 0)
        max: f32,
    },
}

impl CellFusion {
    /// Default lower saturation bound (P ≈ 0.12).
    pub const DEFAULT_SATURATION_MIN: f32 = -2.0;
    /// Default upper saturation bound (P ≈ 0.97).
    pub const DEFAULT_SATURATION_MAX: f32 = 3.5;
    /// Saturation with the default bounds.
    pub const DEFAULT_SATURATION: CellFusion = CellFusion::Saturating {
        min: Self::DEFAULT_SATURATION_MIN,
        max: Self::DEFAULT_SATURATION_MAX,
    };

    /// Fuse an update into a current value.
    #[inline]
    pub fn fuse(&self, current: f32, update: f32) -> f32 {
        self.clamp(current + update)
    }

    /// Clamp a value to this rule's bounds.
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        match *self {
            CellFusion::Unbounded => value,
            CellFusion::Saturating { min, max } => value.clamp(min, max),
        }
    }

    pub(crate) fn validation_errors(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if let CellFusion::Saturating { min, max } = *self {
            if !(min < 0.0) {
                errors.push(ConfigError::invalid(
                    "fusion.min",
                    format!("must be less than 0, got {min}"),
                ));
            }
            if !(max > 0.0) {
                errors.push(ConfigError::invalid(
                    "fusion.max",
                    format!("must be greater than 0, got {max}"),
                ));
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded_is_plain_addition() {
        let fusion = CellFusion::Unbounded;
        assert_eq!(fusion.fuse(1.0, 0.5), 1.5);
        assert_eq!(fusion.fuse(-10.0, -0.4), -10.4);
    }

    #[test]
    fn test_saturation_clamps() {
        let fusion = CellFusion::DEFAULT_SATURATION;
        assert_eq!(fusion.fuse(3.0, 0.85), 3.5);
        assert_eq!(fusion.fuse(-1.8, -0.4), -2.0);
        assert_eq!(fusion.fuse(0.0, 0.85), 0.85);
    }

    #[test]
    fn test_invalid_bounds() {
        let fusion = CellFusion::Saturating { min: 0.5, max: 3.5 };
        assert_eq!(fusion.validation_errors().len(), 1);
        assert!(CellFusion::Unbounded.validation_errors().is_empty());
    }
}
