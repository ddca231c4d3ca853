use crate::{
    config::ProcessorConfig,
    error::Result,
    metrics::{HeartRateEstimator, SpO2Estimator},
    signal::RecordedSample,
};
use serde::{Deserialize, Serialize};

/// Snapshot of both vitals. Values are `None` while unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Timestamp of the most recent sample (seconds)
    pub timestamp: f64,
    pub present: bool,
    pub heart_rate: Option<u32>,
    pub spo2: Option<u32>,
}

/// Feeds one sample stream into an independent heart-rate and SpO2 estimator.
#[derive(Debug, Clone)]
pub struct VitalsMonitor {
    heart_rate: HeartRateEstimator,
    spo2: SpO2Estimator,
    samples: u64,
}

impl VitalsMonitor {
    pub fn new(frequency: u32) -> Result<Self> {
        Self::with_config(frequency, ProcessorConfig::default())
    }

    pub fn with_config(frequency: u32, config: ProcessorConfig) -> Result<Self> {
        Ok(Self {
            heart_rate: HeartRateEstimator::with_config(frequency, config)?,
            spo2: SpO2Estimator::with_config(frequency, config)?,
            samples: 0,
        })
    }

    pub fn add_sample(&mut self, ir: u32, red: u32) {
        self.heart_rate.add_sample(ir);
        self.spo2.add_sample(ir, red);
        self.samples += 1;
    }

    pub fn add_sample_at(&mut self, timestamp: f64, ir: u32, red: u32) {
        self.heart_rate.add_sample_at(timestamp, ir);
        self.spo2.add_sample_at(timestamp, ir, red);
        self.samples += 1;
    }

    /// Adds a recorded sample, using its timestamp when it carries one.
    pub fn add_recorded(&mut self, sample: &RecordedSample) {
        match sample.timestamp {
            Some(t) => self.add_sample_at(t, sample.ir, sample.red),
            None => self.add_sample(sample.ir, sample.red),
        }
    }

    /// Heart rate in bpm or `-1`.
    pub fn get_heart_rate(&self) -> i32 {
        self.heart_rate.get()
    }

    /// SpO2 in percent or `-1`.
    pub fn get_spo2(&self) -> i32 {
        self.spo2.get()
    }

    pub fn reading(&self) -> Reading {
        let present = self.heart_rate.is_present();
        Reading {
            timestamp: self
                .heart_rate
                .processor()
                .latest()
                .map(|s| s.timestamp)
                .unwrap_or(0.0),
            present,
            heart_rate: u32::try_from(self.get_heart_rate()).ok(),
            spo2: u32::try_from(self.get_spo2()).ok(),
        }
    }

    /// Number of samples ingested so far.
    pub fn samples(&self) -> u64 {
        self.samples
    }

    pub fn heart_rate(&self) -> &HeartRateEstimator {
        &self.heart_rate
    }

    pub fn spo2(&self) -> &SpO2Estimator {
        &self.spo2
    }
}
