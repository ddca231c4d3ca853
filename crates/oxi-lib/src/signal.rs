use serde::{Deserialize, Serialize};

/// One raw sample pair as stamped by a [`crate::Processor`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Seconds on the processor's timebase
    pub timestamp: f64,
    pub ir: u32,
    pub red: u32,
}

/// A sample pair read from a recording; the timestamp is optional.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecordedSample {
    pub timestamp: Option<f64>,
    pub ir: u32,
    pub red: u32,
}

impl RecordedSample {
    pub fn new(ir: u32, red: u32) -> Self {
        Self {
            timestamp: None,
            ir,
            red,
        }
    }
}

/// A recorded stream at a fixed acquisition frequency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recording {
    /// Acquisition frequency in Hz
    pub fs: u32,
    pub samples: Vec<RecordedSample>,
}

impl Recording {
    pub fn len(&self) -> usize {
        self.samples.len()
    }
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
    pub fn duration(&self) -> f64 {
        if self.fs == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.fs as f64
    }
}

/// Optical channels a processor tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Channels {
    /// Infrared only (heart rate)
    Ir,
    /// Infrared and red (SpO2)
    IrRed,
}
