//! Validate-once configuration objects.

use super::error::ConfigError;
use super::param::ParamMap;

/// A configuration bundle whose invariants are checked once, at construction.
///
/// Implementors list their violated invariants in
/// [`validation_errors`](Self::validation_errors); everything else is
/// provided.
pub trait ValidatedConfig: Sized {
    /// Human-readable name used in log messages.
    const NAME: &'static str;

    /// Every violated invariant, in declaration order.
    fn validation_errors(&self) -> Vec<ConfigError>;

    /// Parse from a parameter map, using defaults for missing keys.
    ///
    /// The result is not validated; use [`from_params`](Self::from_params).
    fn parse_params(params: &ParamMap) -> Result<Self, ConfigError>;

    /// Check all invariants, logging each failure if `verbose`.
    fn is_valid(&self, verbose: bool) -> bool {
        let errors = self.validation_errors();
        if verbose {
            for error in &errors {
                log::warn!("{}: {}", Self::NAME, error);
            }
        }
        errors.is_empty()
    }

    /// Consume the config, returning it only if every invariant holds.
    fn check_valid(self) -> Result<Self, ConfigError> {
        match self.validation_errors().into_iter().next() {
            None => Ok(self),
            Some(error) => {
                self.is_valid(true);
                Err(error)
            }
        }
    }

    /// Parse and validate.
    fn from_params(params: &ParamMap) -> Result<Self, ConfigError> {
        Self::parse_params(params)?.check_valid()
    }
}

/// Record an error unless `value > bound`.
pub(crate) fn require_gt(errors: &mut Vec<ConfigError>, name: &str, value: f32, bound: f32) {
    if !(value > bound) {
        errors.push(ConfigError::invalid(
            name,
            format!("must be greater than {bound}, got {value}"),
        ));
    }
}

/// Record an error unless `value < bound`.
pub(crate) fn require_lt(errors: &mut Vec<ConfigError>, name: &str, value: f32, bound: f32) {
    if !(value < bound) {
        errors.push(ConfigError::invalid(
            name,
            format!("must be less than {bound}, got {value}"),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct RangeConfig {
        low: f32,
        high: f32,
    }

    impl ValidatedConfig for RangeConfig {
        const NAME: &'static str = "RangeConfig";

        fn validation_errors(&self) -> Vec<ConfigError> {
            let mut errors = Vec::new();
            require_gt(&mut errors, "low", self.low, 0.0);
            require_lt(&mut errors, "low", self.low, self.high);
            errors
        }

        fn parse_params(params: &ParamMap) -> Result<Self, ConfigError> {
            Ok(Self {
                low: params.get_f32("low", 1.0)?,
                high: params.get_f32("high", 2.0)?,
            })
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = RangeConfig::from_params(&ParamMap::new()).unwrap();
        assert_eq!(config.low, 1.0);
        assert!(config.is_valid(false));
    }

    #[test]
    fn test_all_failures_collected() {
        let config = RangeConfig { low: -3.0, high: -4.0 };
        assert_eq!(config.validation_errors().len(), 2);
        assert!(!config.is_valid(true));
    }

    #[test]
    fn test_nan_is_rejected() {
        let params = ParamMap::new().with("low", f32::NAN);
        assert!(RangeConfig::from_params(&params).is_err());
    }
}
