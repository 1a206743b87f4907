//! Scenario configuration.
#[cfg(feature = "ron")]
use std::path::Path;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::rng::DEFAULT_BASE_SEED;

/// How many iterations a scenario runs and how long each one lasts.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioConfig {
    /// Base seed every iteration seed is derived from. Must be non-zero.
    pub random_seed: u32,
    /// Number of iterations to run.
    pub total_iterations: u32,
    /// Frames stepped per iteration. Must be at least 1.
    pub frames_per_iteration: u32,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            random_seed: DEFAULT_BASE_SEED,
            total_iterations: 100,
            frames_per_iteration: 1,
        }
    }
}

impl ScenarioConfig {
    /// Creates a configuration running `total_iterations` single-frame iterations.
    pub fn new(total_iterations: u32) -> Self {
        Self {
            total_iterations,
            ..Default::default()
        }
    }

    /// Sets the base random seed.
    pub fn with_random_seed(mut self, random_seed: u32) -> Self {
        self.random_seed = random_seed;
        self
    }

    /// Sets the number of iterations.
    pub fn with_total_iterations(mut self, total_iterations: u32) -> Self {
        self.total_iterations = total_iterations;
        self
    }

    /// Sets the number of frames per iteration.
    pub fn with_frames_per_iteration(mut self, frames_per_iteration: u32) -> Self {
        self.frames_per_iteration = frames_per_iteration;
        self
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.random_seed == 0 {
            return Err(Error::InvalidConfig("random_seed cannot be 0".into()));
        }
        if self.frames_per_iteration == 0 {
            return Err(Error::InvalidConfig(
                "frames_per_iteration must be >= 1".into(),
            ));
        }
        Ok(())
    }

    /// Parses and validates a RON document.
    #[cfg(feature = "ron")]
    pub fn from_ron_str(text: &str) -> Result<Self> {
        let config: Self = ron::from_str(text)
            .map_err(|e| Error::InvalidConfig(format!("malformed scenario config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a RON scenario configuration file.
    #[cfg(feature = "ron")]
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_ron_str(&text)?;
        tracing::info!(path = %path.display(), "loaded scenario configuration");
        Ok(config)
    }

    /// Serializes to pretty-printed RON.
    #[cfg(feature = "ron")]
    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| Error::Other(format!("failed to serialize scenario config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ScenarioConfig::default();
        assert_eq!(config.random_seed, DEFAULT_BASE_SEED);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builders_set_fields() {
        let config = ScenarioConfig::new(5)
            .with_random_seed(42)
            .with_frames_per_iteration(3);
        assert_eq!(config.total_iterations, 5);
        assert_eq!(config.random_seed, 42);
        assert_eq!(config.frames_per_iteration, 3);
        assert_eq!(config.with_total_iterations(7).total_iterations, 7);
    }

    #[test]
    fn zero_seed_or_zero_frames_are_rejected() {
        assert!(matches!(
            ScenarioConfig::default().with_random_seed(0).validate(),
            Err(Error::InvalidConfig(_))
        ));
        assert!(ScenarioConfig::default()
            .with_frames_per_iteration(0)
            .validate()
            .is_err());
    }

    #[cfg(feature = "ron")]
    #[test]
    fn ron_documents_round_trip_and_fill_defaults() {
        let config = ScenarioConfig::new(12).with_random_seed(99);
        let text = config.to_ron_string().unwrap();
        assert_eq!(ScenarioConfig::from_ron_str(&text).unwrap(), config);

        let partial = ScenarioConfig::from_ron_str("(total_iterations: 3)").unwrap();
        assert_eq!(partial.total_iterations, 3);
        assert_eq!(partial.random_seed, DEFAULT_BASE_SEED);

        assert!(ScenarioConfig::from_ron_str("(random_seed: 0)").is_err());
        assert!(ScenarioConfig::from_ron_str("not ron").is_err());
    }
}
