use crate::{
    config::{ProcessorConfig, Timebase},
    detectors::{Peak, PeakDetector, PresenceDetector},
    error::{Error, Result},
    filter::SmoothingFilter,
    signal::{Channels, Sample},
    window::SlidingWindow,
};
use log::{debug, trace};
use std::time::Instant;

#[derive(Debug, Clone)]
enum SampleClock {
    Ticks { frequency: f64, count: u64 },
    Monotonic { origin: Option<Instant> },
}

impl SampleClock {
    fn new(timebase: Timebase, frequency: u32) -> Self {
        match timebase {
            Timebase::Ticks => SampleClock::Ticks {
                frequency: frequency as f64,
                count: 0,
            },
            Timebase::Monotonic => SampleClock::Monotonic { origin: None },
        }
    }

    fn next(&mut self) -> f64 {
        match self {
            SampleClock::Ticks { frequency, count } => {
                let t = *count as f64 / *frequency;
                *count += 1;
                t
            }
            SampleClock::Monotonic { origin } => {
                let start = *origin.get_or_insert_with(Instant::now);
                start.elapsed().as_secs_f64()
            }
        }
    }
}

/// Per-estimator signal front end: smoothing, presence and peak detection.
///
/// Every window here advances by exactly one entry per ingested sample, so a
/// logical index refers to the same tick in the timestamp window and in both
/// smoothed channel windows.
#[derive(Debug, Clone)]
pub struct Processor {
    frequency: u32,
    config: ProcessorConfig,
    clock: SampleClock,
    timestamps: SlidingWindow<f64>,
    ir: SmoothingFilter,
    red: Option<SmoothingFilter>,
    presence: PresenceDetector,
    detector: PeakDetector,
    intervals: SlidingWindow<f64>,
    latest: Option<Sample>,
}

impl Processor {
    pub fn new(frequency: u32, config: ProcessorConfig, channels: Channels) -> Result<Self> {
        if frequency == 0 {
            return Err(Error::InvalidFrequency(frequency));
        }
        config.validate()?;

        let window = config.window_capacity(frequency);
        let history = frequency as usize;
        let taps = config.moving_average_window;
        debug!(
            "processor at {} Hz: {} sample window, {} entry histories, {:?}",
            frequency, window, history, channels
        );

        Ok(Self {
            frequency,
            config,
            clock: SampleClock::new(config.timebase, frequency),
            timestamps: SlidingWindow::new(window),
            ir: SmoothingFilter::new(taps, window),
            red: match channels {
                Channels::Ir => None,
                Channels::IrRed => Some(SmoothingFilter::new(taps, window)),
            },
            presence: PresenceDetector::new(taps, config.presence_threshold, history),
            detector: PeakDetector::from_config(&config),
            intervals: SlidingWindow::new(history),
            latest: None,
        })
    }

    /// Ingests a sample pair stamped on the configured timebase.
    pub fn ingest(&mut self, ir: u32, red: u32) -> Sample {
        let timestamp = self.clock.next();
        self.ingest_at(timestamp, ir, red)
    }

    /// Ingests a sample pair with a caller-supplied timestamp in seconds.
    ///
    /// Timestamps must increase monotonically. The red value is ignored when
    /// the processor only tracks the IR channel.
    pub fn ingest_at(&mut self, timestamp: f64, ir: u32, red: u32) -> Sample {
        self.timestamps.push(timestamp);
        self.ir.ingest(ir);
        if let Some(red_filter) = self.red.as_mut() {
            red_filter.ingest(red);
        }
        self.presence.update(self.ir.smoothed());
        let sample = Sample { timestamp, ir, red };
        self.latest = Some(sample);
        sample
    }

    pub fn is_present(&self) -> bool {
        self.presence.is_present()
    }

    /// Peaks of the smoothed IR channel over the current window, recomputed from scratch.
    pub fn find_peaks(&self) -> Vec<Peak> {
        let peaks = self
            .detector
            .find_peaks(&self.timestamps, self.ir.smoothed(), &self.intervals);
        trace!("{} peak(s) in {} samples", peaks.len(), self.timestamps.len());
        peaks
    }

    /// Appends the spacing of consecutive peaks to the interval history.
    /// Returns the number of intervals recorded.
    pub fn record_intervals(&mut self, peaks: &[Peak]) -> usize {
        let mut recorded = 0;
        for pair in peaks.windows(2) {
            self.intervals.push(pair[1].timestamp - pair[0].timestamp);
            recorded += 1;
        }
        recorded
    }

    /// Mean of the most recent intervals (all of them while fewer than the
    /// moving-average length exist).
    pub fn mean_recent_interval(&self) -> Option<f64> {
        self.intervals.mean_last(self.config.moving_average_window)
    }

    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    pub fn timestamps(&self) -> &SlidingWindow<f64> {
        &self.timestamps
    }

    pub fn smoothed_ir(&self) -> &SlidingWindow<f64> {
        self.ir.smoothed()
    }

    /// Smoothed red history, present only for [`Channels::IrRed`] processors.
    pub fn smoothed_red(&self) -> Option<&SlidingWindow<f64>> {
        self.red.as_ref().map(SmoothingFilter::smoothed)
    }

    pub fn intervals(&self) -> &SlidingWindow<f64> {
        &self.intervals
    }

    pub fn presence(&self) -> &PresenceDetector {
        &self.presence
    }

    pub fn latest(&self) -> Option<Sample> {
        self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_frequency() {
        let err = Processor::new(0, ProcessorConfig::default(), Channels::Ir).unwrap_err();
        assert_eq!(err, Error::InvalidFrequency(0));
    }

    #[test]
    fn rejects_invalid_config() {
        let cfg = ProcessorConfig {
            adaptive_factor: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            Processor::new(50, cfg, Channels::Ir),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn tick_timestamps_follow_frequency() {
        let mut processor = Processor::new(50, ProcessorConfig::default(), Channels::Ir).unwrap();
        assert_eq!(processor.frequency(), 50);
        let stamps: Vec<f64> = (0..3).map(|_| processor.ingest(1, 1).timestamp).collect();
        assert_eq!(stamps, vec![0.0, 0.02, 0.04]);
    }

    #[test]
    fn monotonic_timestamps_do_not_decrease() {
        let cfg = ProcessorConfig {
            timebase: Timebase::Monotonic,
            ..Default::default()
        };
        let mut processor = Processor::new(50, cfg, Channels::Ir).unwrap();
        let first = processor.ingest(1, 1).timestamp;
        let second = processor.ingest(1, 1).timestamp;
        assert!(second >= first);
    }

    #[test]
    fn windows_stay_aligned_and_bounded() {
        let mut processor = Processor::new(20, ProcessorConfig::default(), Channels::IrRed).unwrap();
        for i in 0..75u32 {
            processor.ingest(1000 + i, 2000 + i);
        }
        assert_eq!(processor.timestamps().len(), 20);
        assert_eq!(processor.smoothed_ir().len(), 20);
        assert_eq!(processor.smoothed_red().map(|w| w.len()), Some(20));
        assert_eq!(processor.latest().map(|s| s.red), Some(2074));
        // a one-unit ramp deviates by 2 from its 5-sample mean
        assert_eq!(processor.presence().level(), Some(2.0));
        assert!(!processor.is_present());
    }

    #[test]
    fn ir_only_processor_has_no_red_history() {
        let mut processor = Processor::new(20, ProcessorConfig::default(), Channels::Ir).unwrap();
        processor.ingest(1, 2);
        assert!(processor.smoothed_red().is_none());
    }

    #[test]
    fn interval_history_is_capped_at_frequency() {
        let mut processor = Processor::new(10, ProcessorConfig::default(), Channels::Ir).unwrap();
        let peaks: Vec<Peak> = (0..30)
            .map(|i| Peak {
                index: i,
                timestamp: i as f64 * 0.5,
                amplitude: 1.0,
            })
            .collect();
        assert_eq!(processor.record_intervals(&peaks), 29);
        assert_eq!(processor.intervals().len(), 10);
        assert_eq!(processor.mean_recent_interval(), Some(0.5));
    }
}
