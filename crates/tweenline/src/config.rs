// SPDX-License-Identifier: MIT OR Apache-2.0
//! Animator configuration.
//!
//! Settings are plain serde structs stored as RON, e.g.
//!
//! ```ron
//! (
//!     looping: false,
//!     delay: 100.0,
//!     easing: Some("cubicOut"),
//!     min_duration: Some(300.0),
//! )
//! ```

use crate::easing::{Easing, EasingError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or resolving a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// RON text could not be parsed
    #[error("failed to parse animator config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    /// Configured easing is unknown or malformed
    #[error(transparent)]
    Easing(#[from] EasingError),
    /// Delay is negative or not a number
    #[error("delay must be a non-negative number of milliseconds, got {0}")]
    InvalidDelay(f64),
    /// Minimum duration is negative or not a number
    #[error("minimum duration must be a non-negative number of milliseconds, got {0}")]
    InvalidMinDuration(f64),
}

/// Settings applied to an animator at construction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimatorConfig {
    /// Restart from the beginning when the end is reached
    pub looping: bool,
    /// Delay before the first frame, in milliseconds
    pub delay: f64,
    /// Step non-interpolable tracks every frame instead of writing their
    /// final value once at start
    pub allow_discrete: bool,
    /// Default clip easing used when `start` is given none
    pub easing: Option<String>,
    /// Default minimum duration used when `start` is given none
    pub min_duration: Option<f64>,
}

impl AnimatorConfig {
    /// Parse a configuration from RON text and validate it
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty RON
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// Check value ranges and that the easing resolves
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.delay.is_nan() || self.delay < 0.0 {
            return Err(ConfigError::InvalidDelay(self.delay));
        }
        if let Some(min) = self.min_duration {
            if min.is_nan() || min < 0.0 {
                return Err(ConfigError::InvalidMinDuration(min));
            }
        }
        self.resolve_easing()?;
        Ok(())
    }

    /// Resolve the configured easing name
    pub fn resolve_easing(&self) -> Result<Option<Easing>, ConfigError> {
        match &self.easing {
            Some(name) => Ok(Some(Easing::parse(name)?)),
            None => Ok(None),
        }
    }
}
