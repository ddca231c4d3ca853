use crate::window::SlidingWindow;

/// Finger-contact detector driven by the pulsatile amplitude of the smoothed IR channel.
///
/// Each update measures how far the latest smoothed IR value sits from the
/// mean of the last `taps` smoothed values, and smooths that deviation again
/// over its own history. A resting sensor with no tissue shows only slow
/// drift and stays under the threshold.
#[derive(Debug, Clone)]
pub struct PresenceDetector {
    taps: usize,
    threshold: f64,
    amplitudes: SlidingWindow<f64>,
    level: Option<f64>,
}

impl PresenceDetector {
    pub fn new(taps: usize, threshold: f64, history: usize) -> Self {
        Self {
            taps: taps.max(1),
            threshold,
            amplitudes: SlidingWindow::new(history),
            level: None,
        }
    }

    /// Records the deviation for the newest smoothed IR value and returns the
    /// updated presence decision.
    pub fn update(&mut self, smoothed_ir: &SlidingWindow<f64>) -> bool {
        if smoothed_ir.len() < self.taps {
            self.level = None;
            return false;
        }
        let (Some(latest), Some(baseline)) = (smoothed_ir.last(), smoothed_ir.mean_last(self.taps))
        else {
            self.level = None;
            return false;
        };
        let amplitude = (latest - baseline).abs();
        self.amplitudes.push(amplitude);

        let level = if self.amplitudes.len() >= self.taps {
            self.amplitudes.mean_last(self.taps).unwrap_or(amplitude)
        } else {
            amplitude
        };
        self.level = Some(level);
        self.is_present()
    }

    pub fn is_present(&self) -> bool {
        self.level.is_some_and(|level| level > self.threshold)
    }

    /// Smoothed deviation from the last update, if it could be assessed.
    pub fn level(&self) -> Option<f64> {
        self.level
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}
