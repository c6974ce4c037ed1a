use serde::{Deserialize, Serialize};

use crate::ConfigError;

fn default_min_interval_hours() -> u32 {
    24
}

fn default_growth_factor() -> f64 {
    2.5
}

fn default_max_interval_days() -> u32 {
    180
}

fn default_session_size() -> usize {
    20
}

/// Review interval tuning
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct StudyConfig {
    #[serde(default = "default_min_interval_hours")]
    pub min_interval_hours: u32,
    #[serde(default = "default_growth_factor")]
    pub growth_factor: f64,
    #[serde(default = "default_max_interval_days")]
    pub max_interval_days: u32,
    /// How many due words the UI asks for per session
    #[serde(default = "default_session_size")]
    pub session_size: usize,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            min_interval_hours: default_min_interval_hours(),
            growth_factor: default_growth_factor(),
            max_interval_days: default_max_interval_days(),
            session_size: default_session_size(),
        }
    }
}

impl StudyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_interval_hours == 0 {
            return Err(ConfigError::Invalid(
                "minIntervalHours must be greater than zero".to_string(),
            ));
        }
        if !(self.growth_factor > 1.0) {
            return Err(ConfigError::Invalid(
                "growthFactor must be greater than 1.0".to_string(),
            ));
        }
        if u64::from(self.max_interval_days) * 24 < u64::from(self.min_interval_hours) {
            return Err(ConfigError::Invalid(
                "maxIntervalDays must not be shorter than minIntervalHours".to_string(),
            ));
        }
        Ok(())
    }
}
