use crate::error::{Error, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How sample timestamps are produced when the caller does not supply them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timebase {
    /// `sample_index / frequency`, exact for a driver running at its nominal rate.
    Ticks,
    /// Seconds elapsed on a monotonic clock since the first sample.
    Monotonic,
}

/// Quadratic mapping from the averaged red/IR cross-ratio to SpO2 percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationCurve {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl CalibrationCurve {
    /// Evaluates `a·r² + b·r + c`.
    pub fn evaluate(&self, ratio: f64) -> f64 {
        self.a * ratio * ratio + self.b * ratio + self.c
    }
}

impl Default for CalibrationCurve {
    fn default() -> Self {
        // -45.060·r²/10000 + 30.054·r/100 + 94.845
        Self {
            a: -45.060e-4,
            b: 30.054e-2,
            c: 94.845,
        }
    }
}

/// Tunable parameters shared by the heart-rate and SpO2 pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Length of the retained sample history (seconds).
    pub window_seconds: f64,
    /// Number of taps for every short moving average (smoothing, baselines, interval mean).
    pub moving_average_window: usize,
    /// Smoothed IR deviation above which a finger is considered present (raw ADC units).
    pub presence_threshold: f64,
    /// Fraction of the recent mean interval used as the minimum peak separation.
    pub adaptive_factor: f64,
    /// Minimum peak separation before enough intervals exist (seconds).
    pub default_min_interval_s: f64,
    /// Position of the peak threshold between window minimum and maximum.
    pub threshold_fraction: f64,
    pub timebase: Timebase,
    pub calibration: CalibrationCurve,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            window_seconds: 1.0,
            moving_average_window: 5,
            presence_threshold: 11.0,
            adaptive_factor: 0.8,
            default_min_interval_s: 0.3,
            threshold_fraction: 0.5,
            timebase: Timebase::Ticks,
            calibration: CalibrationCurve::default(),
        }
    }
}

impl ProcessorConfig {
    /// Rejects values that would leave a window empty or a threshold meaningless.
    pub fn validate(&self) -> Result<()> {
        if !(self.window_seconds > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "window_seconds must be positive, got {}",
                self.window_seconds
            )));
        }
        if self.moving_average_window == 0 {
            return Err(Error::InvalidConfig(
                "moving_average_window must be at least 1".into(),
            ));
        }
        if !(self.presence_threshold >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "presence_threshold must be non-negative, got {}",
                self.presence_threshold
            )));
        }
        if !(self.adaptive_factor > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "adaptive_factor must be positive, got {}",
                self.adaptive_factor
            )));
        }
        if !(self.default_min_interval_s >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "default_min_interval_s must be non-negative, got {}",
                self.default_min_interval_s
            )));
        }
        if !(0.0..=1.0).contains(&self.threshold_fraction) {
            return Err(Error::InvalidConfig(format!(
                "threshold_fraction must lie in [0, 1], got {}",
                self.threshold_fraction
            )));
        }
        Ok(())
    }

    /// Number of samples retained per channel at `frequency` Hz.
    pub fn window_capacity(&self, frequency: u32) -> usize {
        ((frequency as f64 * self.window_seconds).round() as usize).max(1)
    }

    /// Parses a TOML document; missing keys take their default values.
    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        let cfg: Self = toml::from_str(text).context("parsing processor config")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reads and validates a TOML configuration file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("in {}", path.display()))
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        toml::to_string(self).context("serializing processor config")
    }
}
