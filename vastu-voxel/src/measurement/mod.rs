//! Measurement models: what a single range measurement says about each cell
//! its ray traverses.
//!
//! ## Log-Odds Model
//!
//! Updates are additive log-odds contributions:
//!
//! ```text
//! L(x) = log(P(x) / (1 - P(x)))
//! L_new = L_old + L_observation
//! ```
//!
//! Because the fusion rule is a sum, updates from different rays and scans
//! commute; the map may apply them in any order.
//!
//! ## Models
//!
//! - [`ConstantRay`]: fixed "free" update before the surface, fixed
//!   "occupied" update on the cell containing the return.

mod constant_ray;

pub use constant_ray::{ConstantRay, ConstantRayConfig};

/// Occupancy update along a ray.
pub trait MeasurementModel: Send + Sync {
    /// Update for the cell reached at `distance` along a ray whose surface
    /// return lies at `ray_length`.
    ///
    /// `ray_length` is `f32::INFINITY` when no surface was observed within
    /// the sensor's trusted range; every cell is then free space.
    fn update_at(&self, distance: f32, ray_length: f32) -> f32;

    /// Update applied to cells observed as free space.
    fn free_update(&self) -> f32;

    /// Update applied to the cell holding an observed surface.
    fn occupied_update(&self) -> f32;
}

/// Convert a probability in `(0, 1)` to log-odds.
#[inline]
pub fn log_odds_from_probability(probability: f32) -> f32 {
    (probability / (1.0 - probability)).ln()
}

/// Convert log-odds to a probability in `(0, 1)`.
#[inline]
pub fn probability_from_log_odds(log_odds: f32) -> f32 {
    1.0 / (1.0 + (-log_odds).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_log_odds_probability_conversion() {
        assert_relative_eq!(log_odds_from_probability(0.5), 0.0);
        assert_relative_eq!(probability_from_log_odds(0.0), 0.5);
        for p in [0.1f32, 0.3, 0.7, 0.95] {
            assert_relative_eq!(
                probability_from_log_odds(log_odds_from_probability(p)),
                p,
                epsilon = 1e-5
            );
        }
    }
}
