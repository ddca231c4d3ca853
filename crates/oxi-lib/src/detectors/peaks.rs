use crate::{config::ProcessorConfig, window::SlidingWindow};
use serde::{Deserialize, Serialize};

/// A local maximum of the smoothed IR channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    /// Logical position in the window the peak was found in (0 = oldest).
    pub index: usize,
    pub timestamp: f64,
    pub amplitude: f64,
}

/// Adaptive local-maximum scan over the retained smoothed IR window.
///
/// The amplitude threshold is the midline of the current window and the
/// minimum separation follows the recent beat-to-beat interval, so the
/// detector tracks both baseline drift and the subject's own pulse cadence.
#[derive(Debug, Clone, Copy)]
pub struct PeakDetector {
    taps: usize,
    adaptive_factor: f64,
    default_min_interval: f64,
    threshold_fraction: f64,
}

impl PeakDetector {
    pub fn from_config(cfg: &ProcessorConfig) -> Self {
        Self {
            taps: cfg.moving_average_window.max(1),
            adaptive_factor: cfg.adaptive_factor,
            default_min_interval: cfg.default_min_interval_s,
            threshold_fraction: cfg.threshold_fraction,
        }
    }

    /// Minimum separation between accepted peaks (seconds).
    pub fn min_interval(&self, intervals: &SlidingWindow<f64>) -> f64 {
        if intervals.len() >= self.taps {
            intervals
                .mean_last(self.taps)
                .map(|avg| avg * self.adaptive_factor)
                .unwrap_or(self.default_min_interval)
        } else {
            self.default_min_interval
        }
    }

    /// Amplitude a candidate must exceed, placed between window min and max.
    pub fn threshold(&self, values: &SlidingWindow<f64>) -> Option<f64> {
        values
            .min_max()
            .map(|(lo, hi)| lo + (hi - lo) * self.threshold_fraction)
    }

    /// Finds peaks in `values`, whose entries are stamped by the parallel `timestamps` window.
    ///
    /// Returns peaks in increasing timestamp order. A candidate closer than
    /// the minimum interval to the previously accepted peak replaces it when
    /// larger and is dropped otherwise.
    pub fn find_peaks(
        &self,
        timestamps: &SlidingWindow<f64>,
        values: &SlidingWindow<f64>,
        intervals: &SlidingWindow<f64>,
    ) -> Vec<Peak> {
        let n = values.len().min(timestamps.len());
        if n < 3 {
            return Vec::new();
        }
        let Some(threshold) = self.threshold(values) else {
            return Vec::new();
        };
        let min_interval = self.min_interval(intervals);

        let mut peaks: Vec<Peak> = Vec::new();
        let (Some(mut prev), Some(mut curr)) = (values.get(0), values.get(1)) else {
            return peaks;
        };
        for i in 1..n - 1 {
            let Some(next) = values.get(i + 1) else {
                break;
            };
            if curr > prev && curr > next && curr > threshold {
                if let Some(timestamp) = timestamps.get(i) {
                    let candidate = Peak {
                        index: i,
                        timestamp,
                        amplitude: curr,
                    };
                    match peaks.last_mut() {
                        Some(last) if candidate.timestamp - last.timestamp < min_interval => {
                            if last.amplitude < candidate.amplitude {
                                *last = candidate;
                            }
                        }
                        _ => peaks.push(candidate),
                    }
                }
            }
            prev = curr;
            curr = next;
        }
        peaks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn windows(fs: f64, values: &[f64]) -> (SlidingWindow<f64>, SlidingWindow<f64>) {
        let mut ts = SlidingWindow::new(values.len());
        let mut vs = SlidingWindow::new(values.len());
        for (i, &v) in values.iter().enumerate() {
            ts.push(i as f64 / fs);
            vs.push(v);
        }
        (ts, vs)
    }

    fn detector() -> PeakDetector {
        PeakDetector::from_config(&ProcessorConfig::default())
    }

    #[test]
    fn too_few_samples_yield_nothing() {
        let (ts, vs) = windows(50.0, &[1.0, 5.0]);
        assert!(detector()
            .find_peaks(&ts, &vs, &SlidingWindow::new(10))
            .is_empty());
    }

    #[test]
    fn finds_each_beat_of_a_sine() {
        let fs = 50.0;
        let values: Vec<f64> = (0..150)
            .map(|i| 50_000.0 + 1000.0 * (2.0 * PI * 1.2 * i as f64 / fs).sin())
            .collect();
        let (ts, vs) = windows(fs, &values);
        let peaks = detector().find_peaks(&ts, &vs, &SlidingWindow::new(10));
        assert_eq!(peaks.len(), 4);
        for pair in peaks.windows(2) {
            let dt = pair[1].timestamp - pair[0].timestamp;
            assert!((dt - 1.0 / 1.2).abs() < 0.05, "interval {dt}");
        }
    }

    #[test]
    fn close_bumps_merge_into_the_larger() {
        // two local maxima 0.1 s apart, then a clear beat 1 s later
        let mut values = vec![0.0; 80];
        values[10] = 90.0;
        values[15] = 100.0;
        values[60] = 95.0;
        let (ts, vs) = windows(50.0, &values);
        let peaks = detector().find_peaks(&ts, &vs, &SlidingWindow::new(10));
        assert_eq!(peaks.len(), 2);
        assert_eq!(peaks[0].index, 15);
        assert_eq!(peaks[0].amplitude, 100.0);
        assert_eq!(peaks[1].index, 60);
    }

    #[test]
    fn smaller_late_bump_is_dropped() {
        let mut values = vec![0.0; 40];
        values[10] = 100.0;
        values[14] = 80.0;
        let (ts, vs) = windows(50.0, &values);
        let peaks = detector().find_peaks(&ts, &vs, &SlidingWindow::new(10));
        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].index, 10);
    }

    #[test]
    fn sub_threshold_maxima_are_ignored() {
        let mut values = vec![0.0; 60];
        values[10] = 100.0;
        values[40] = 20.0;
        let (ts, vs) = windows(50.0, &values);
        let peaks = detector().find_peaks(&ts, &vs, &SlidingWindow::new(10));
        assert_eq!(peaks.len(), 1);
    }

    #[test]
    fn min_interval_adapts_to_recent_intervals() {
        let detector = detector();
        let mut intervals = SlidingWindow::new(50);
        for _ in 0..4 {
            intervals.push(1.0);
        }
        assert_eq!(detector.min_interval(&intervals), 0.3);
        intervals.push(1.0);
        assert!((detector.min_interval(&intervals) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn adaptive_interval_suppresses_dicrotic_notch() {
        // main beat every second with a secondary bump 0.4 s after each
        let fs = 50.0;
        let mut values = vec![0.0; 200];
        for beat in [10, 60, 110, 160] {
            values[beat] = 100.0;
            values[beat + 20] = 70.0;
        }
        let (ts, vs) = windows(fs, &values);
        let mut intervals = SlidingWindow::new(50);
        for _ in 0..5 {
            intervals.push(1.0);
        }
        let peaks = detector().find_peaks(&ts, &vs, &intervals);
        assert_eq!(
            peaks.iter().map(|p| p.index).collect::<Vec<_>>(),
            vec![10, 60, 110, 160]
        );
    }

    #[test]
    fn peaks_are_ordered_and_separated() {
        let fs = 100.0;
        let values: Vec<f64> = (0..400)
            .map(|i| {
                let t = i as f64 / fs;
                (2.0 * PI * 1.5 * t).sin() + 0.3 * (2.0 * PI * 7.0 * t).sin()
            })
            .collect();
        let (ts, vs) = windows(fs, &values);
        let intervals = SlidingWindow::new(10);
        let detector = detector();
        let min_interval = detector.min_interval(&intervals);
        let peaks = detector.find_peaks(&ts, &vs, &intervals);
        assert!(!peaks.is_empty());
        for pair in peaks.windows(2) {
            assert!(pair[1].timestamp > pair[0].timestamp);
            assert!(pair[1].timestamp - pair[0].timestamp >= min_interval);
        }
    }
}
