//! Streaming heart-rate and SpO2 estimation from paired infrared/red PPG samples.
//!
//! Samples are pushed one tick at a time into a [`HeartRateEstimator`], a
//! [`SpO2Estimator`] or a [`VitalsMonitor`] that owns both. Each estimator owns
//! its own [`Processor`] (smoothing, presence, peak detection) and reports
//! `-1` whenever no finger is in contact with the sensor.
pub mod config;
pub mod detectors;
pub mod error;
pub mod filter;
pub mod io;
pub mod metrics;
pub mod monitor;
pub mod processor;
pub mod signal;
pub mod synth;
pub mod window;

pub use config::*;
pub use detectors::*;
pub use error::{Error, Result};
pub use metrics::*;
pub use monitor::*;
pub use processor::*;
pub use signal::*;
