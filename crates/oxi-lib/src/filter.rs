use crate::window::SlidingWindow;

/// Short moving-average smoother for one optical channel.
///
/// Keeps the last `taps` raw values and a longer history of smoothed values.
/// Until `taps` raw values have been seen the raw value passes through
/// unchanged.
#[derive(Debug, Clone)]
pub struct SmoothingFilter {
    raw: SlidingWindow<u32>,
    smoothed: SlidingWindow<f64>,
}

impl SmoothingFilter {
    pub fn new(taps: usize, history: usize) -> Self {
        Self {
            raw: SlidingWindow::new(taps),
            smoothed: SlidingWindow::new(history),
        }
    }

    /// Pushes a raw value and returns its smoothed counterpart.
    pub fn ingest(&mut self, raw: u32) -> f64 {
        self.raw.push(raw);
        let value = if self.raw.is_full() {
            self.raw.mean().unwrap_or(raw as f64)
        } else {
            raw as f64
        };
        self.smoothed.push(value);
        value
    }

    /// Smoothed history, oldest first.
    pub fn smoothed(&self) -> &SlidingWindow<f64> {
        &self.smoothed
    }
}
