use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Settings of the periodic driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Time between two ticks, in milliseconds.
    pub period_ms: u64,
    /// Stop the driver after the first tick in which a pass failed.
    pub stop_on_error: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            period_ms: 1000,
            stop_on_error: false,
        }
    }
}

impl SchedulerConfig {
    /// Reads `NAGARE_TICK_MS` and `NAGARE_STOP_ON_ERROR`, falling back to the
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let period_ms = env::var("NAGARE_TICK_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(defaults.period_ms);

        let stop_on_error = env::var("NAGARE_STOP_ON_ERROR")
            .map(|s| s.to_lowercase() == "true" || s == "1")
            .unwrap_or(defaults.stop_on_error);

        Self {
            period_ms,
            stop_on_error,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period_ms = period.as_millis() as u64;
        self
    }

    pub fn with_stop_on_error(mut self, stop_on_error: bool) -> Self {
        self.stop_on_error = stop_on_error;
        self
    }

    /// The tick period, never shorter than one millisecond.
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms.max(1))
    }
}
