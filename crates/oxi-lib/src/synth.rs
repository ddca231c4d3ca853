//! Deterministic synthetic PPG streams for tests, demos and replay checks.
use crate::signal::{RecordedSample, Recording};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Largest value an 18-bit ADC sample can take.
pub const ADC_MAX: u32 = (1 << 18) - 1;

/// Sinusoidal pulse on top of a constant baseline for each channel.
///
/// Channel `x` is `x_dc · (1 + x_ac_ratio · sin(2π · bpm/60 · t))`, plus
/// uniform noise in `[-noise, noise]` when `noise > 0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticPpg {
    pub frequency: u32,
    pub bpm: f64,
    pub ir_dc: f64,
    pub ir_ac_ratio: f64,
    pub red_dc: f64,
    pub red_ac_ratio: f64,
    pub noise: f64,
    pub seed: u64,
}

impl SyntheticPpg {
    /// A clean stream: IR 50 000 ± 1000, red 40 000 ± 800.
    pub fn new(frequency: u32, bpm: f64) -> Self {
        Self {
            frequency,
            bpm,
            ir_dc: 50_000.0,
            ir_ac_ratio: 0.02,
            red_dc: 40_000.0,
            red_ac_ratio: 0.02,
            noise: 0.0,
            seed: 0,
        }
    }

    /// `(ir, red)` pairs covering `seconds` of signal.
    pub fn samples(&self, seconds: f64) -> Vec<(u32, u32)> {
        let fs = self.frequency.max(1) as f64;
        let count = (seconds * fs).round().max(0.0) as usize;
        let beat_hz = self.bpm / 60.0;
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut out = Vec::with_capacity(count);
        for i in 0..count {
            let phase = (2.0 * PI * beat_hz * i as f64 / fs).sin();
            let ir = self.ir_dc * (1.0 + self.ir_ac_ratio * phase) + jitter(&mut rng, self.noise);
            let red = self.red_dc * (1.0 + self.red_ac_ratio * phase) + jitter(&mut rng, self.noise);
            out.push((to_adc(ir), to_adc(red)));
        }
        out
    }

    /// Same stream as [`samples`](Self::samples), stamped on the tick timebase.
    pub fn recording(&self, seconds: f64) -> Recording {
        let fs = self.frequency.max(1) as f64;
        let samples = self
            .samples(seconds)
            .into_iter()
            .enumerate()
            .map(|(i, (ir, red))| RecordedSample {
                timestamp: Some(i as f64 / fs),
                ir,
                red,
            })
            .collect();
        Recording {
            fs: self.frequency,
            samples,
        }
    }
}

fn jitter(rng: &mut StdRng, noise: f64) -> f64 {
    if noise > 0.0 {
        rng.gen_range(-noise..=noise)
    } else {
        0.0
    }
}

fn to_adc(value: f64) -> u32 {
    value.round().clamp(0.0, ADC_MAX as f64) as u32
}
