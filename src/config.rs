//! Round tunables. Defaults reproduce the standard 30 second benchmark.

use serde::Deserialize;

use crate::error::ConfigError;
use crate::round::placement::SpawnPattern;

pub const ROUND_DURATION_SECS: f64 = 30.0;
pub const SCORE_HIT: i64 = 10;
pub const SCORE_MISS: i64 = -2;
pub const SIZE_START: f64 = 80.0;
pub const SIZE_END: f64 = 42.0;
pub const MARGIN: f64 = 20.0;
/// `setInterval` takes a signed 32-bit timeout.
pub const MAX_INTERVAL_MS: u32 = i32::MAX as u32;

/// How the host drives `advance_time`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum TickSource {
    /// Re-armed `requestAnimationFrame` callback.
    #[default]
    AnimationFrame,
    /// Fixed `setInterval` polling.
    Interval { ms: u32 },
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RoundConfig {
    pub duration_secs: f64,
    pub hit_score: i64,
    pub miss_score: i64,
    pub size_start: f64,
    pub size_end: f64,
    pub margin: f64,
    /// Record time-to-hit per target and report the average in the summary.
    pub track_reaction: bool,
    pub spawn: SpawnPattern,
    pub tick: TickSource,
    /// Post the summary of non-practice rounds to the embedding frame.
    pub broadcast_summary: bool,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            duration_secs: ROUND_DURATION_SECS,
            hit_score: SCORE_HIT,
            miss_score: SCORE_MISS,
            size_start: SIZE_START,
            size_end: SIZE_END,
            margin: MARGIN,
            track_reaction: true,
            spawn: SpawnPattern::Uniform,
            tick: TickSource::AnimationFrame,
            broadcast_summary: true,
        }
    }
}

impl RoundConfig {
    /// Parse a (possibly partial) JSON object; missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: RoundConfig = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.duration_secs > 0.0) {
            return Err(ConfigError::NonPositiveDuration(self.duration_secs));
        }
        if !(self.size_end > 0.0) || self.size_end > self.size_start {
            return Err(ConfigError::SizeRange {
                start: self.size_start,
                end: self.size_end,
            });
        }
        if !(self.margin >= 0.0) {
            return Err(ConfigError::NegativeMargin(self.margin));
        }
        if let TickSource::Interval { ms } = self.tick {
            if ms == 0 {
                return Err(ConfigError::ZeroInterval);
            }
            if ms > MAX_INTERVAL_MS {
                return Err(ConfigError::IntervalTooLong(ms));
            }
        }
        Ok(())
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration_secs * 1000.0
    }
}
