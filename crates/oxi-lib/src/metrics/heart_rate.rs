use super::gated;
use crate::{config::ProcessorConfig, error::Result, processor::Processor, signal::Channels};
use log::debug;

/// Heart rate in beats per minute from the spacing of IR pulse peaks.
///
/// The last good estimate is kept while new samples fail to produce one;
/// [`get`](Self::get) hides it whenever no finger is in contact.
#[derive(Debug, Clone)]
pub struct HeartRateEstimator {
    processor: Processor,
    heart_rate: Option<u32>,
}

impl HeartRateEstimator {
    pub fn new(frequency: u32) -> Result<Self> {
        Self::with_config(frequency, ProcessorConfig::default())
    }

    pub fn with_config(frequency: u32, config: ProcessorConfig) -> Result<Self> {
        Ok(Self {
            processor: Processor::new(frequency, config, Channels::Ir)?,
            heart_rate: None,
        })
    }

    /// Adds one IR sample stamped on the configured timebase.
    pub fn add_sample(&mut self, ir: u32) {
        self.processor.ingest(ir, 0);
        self.update();
    }

    /// Adds one IR sample taken at `timestamp` seconds.
    pub fn add_sample_at(&mut self, timestamp: f64, ir: u32) {
        self.processor.ingest_at(timestamp, ir, 0);
        self.update();
    }

    /// Heart rate in bpm, or [`super::NO_READING`] when unavailable.
    pub fn get(&self) -> i32 {
        gated(self.processor.is_present(), self.heart_rate)
    }

    /// Last computed heart rate regardless of finger presence.
    pub fn estimate(&self) -> Option<u32> {
        self.heart_rate
    }

    pub fn is_present(&self) -> bool {
        self.processor.is_present()
    }

    pub fn processor(&self) -> &Processor {
        &self.processor
    }

    fn update(&mut self) {
        let peaks = self.processor.find_peaks();
        if peaks.len() < 2 {
            return;
        }
        self.processor.record_intervals(&peaks);
        if self.processor.intervals().len() < 2 {
            return;
        }
        let Some(interval) = self.processor.mean_recent_interval() else {
            return;
        };
        if interval <= 0.0 {
            return;
        }
        let bpm = (60.0 / interval) as u32;
        if self.heart_rate != Some(bpm) {
            debug!("heart rate {:?} -> {} bpm", self.heart_rate, bpm);
        }
        self.heart_rate = Some(bpm);
    }
}
