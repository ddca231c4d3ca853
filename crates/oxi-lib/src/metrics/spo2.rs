use super::gated;
use crate::{
    config::ProcessorConfig,
    detectors::Peak,
    error::Result,
    processor::Processor,
    signal::Channels,
    window::SlidingWindow,
};
use log::{debug, trace};

/// Blood-oxygen saturation from peak-aligned red/IR AC/DC ratios.
///
/// For every IR peak the AC and DC components of both channels are taken over
/// a short neighbourhood of the peak; the cross-ratio
/// `(AC_red / DC_red) / (AC_ir / DC_ir)` is collected into a bounded history
/// whose mean is mapped to a percentage by the configured calibration curve.
#[derive(Debug, Clone)]
pub struct SpO2Estimator {
    processor: Processor,
    ratios: SlidingWindow<f64>,
    spo2: Option<u32>,
}

impl SpO2Estimator {
    pub fn new(frequency: u32) -> Result<Self> {
        Self::with_config(frequency, ProcessorConfig::default())
    }

    pub fn with_config(frequency: u32, config: ProcessorConfig) -> Result<Self> {
        let processor = Processor::new(frequency, config, Channels::IrRed)?;
        Ok(Self {
            ratios: SlidingWindow::new(frequency as usize),
            processor,
            spo2: None,
        })
    }

    /// Adds one sample pair stamped on the configured timebase.
    pub fn add_sample(&mut self, ir: u32, red: u32) {
        self.processor.ingest(ir, red);
        self.update();
    }

    /// Adds one sample pair taken at `timestamp` seconds.
    pub fn add_sample_at(&mut self, timestamp: f64, ir: u32, red: u32) {
        self.processor.ingest_at(timestamp, ir, red);
        self.update();
    }

    /// SpO2 in percent, or [`super::NO_READING`] when unavailable.
    pub fn get(&self) -> i32 {
        gated(self.processor.is_present(), self.spo2)
    }

    /// Last computed SpO2 regardless of finger presence.
    pub fn estimate(&self) -> Option<u32> {
        self.spo2
    }

    pub fn is_present(&self) -> bool {
        self.processor.is_present()
    }

    /// Retained red/IR cross-ratios, oldest first.
    pub fn ratios(&self) -> &SlidingWindow<f64> {
        &self.ratios
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

        let Some(red) = self.processor.smoothed_red() else {
            return;
        };
        let ir = self.processor.smoothed_ir();
        let half_width = self.processor.config().moving_average_window;
        let ratios: Vec<f64> = peaks
            .iter()
            .filter_map(|peak| peak_ratio(ir, red, peak, half_width))
            .collect();
        for ratio in ratios {
            self.ratios.push(ratio);
        }

        if self.ratios.len() < 2 {
            return;
        }
        let Some(mean_ratio) = self.ratios.mean() else {
            return;
        };
        let value = self.processor.config().calibration.evaluate(mean_ratio);
        let spo2 = value.clamp(0.0, 100.0) as u32;
        if self.spo2 != Some(spo2) {
            debug!(
                "SpO2 {:?} -> {}% (mean ratio {:.4} over {})",
                self.spo2,
                spo2,
                mean_ratio,
                self.ratios.len()
            );
        }
        self.spo2 = Some(spo2);
    }
}

/// Cross-ratio at `peak` over `[index - half_width, index + half_width]`, clipped to the window.
///
/// Returns `None` when either DC term is zero or either AC term is not
/// positive (the channel sits at or below its local baseline).
fn peak_ratio(
    ir: &SlidingWindow<f64>,
    red: &SlidingWindow<f64>,
    peak: &Peak,
    half_width: usize,
) -> Option<f64> {
    let len = ir.len().min(red.len());
    if peak.index >= len {
        return None;
    }
    let start = peak.index.saturating_sub(half_width);
    let end = (peak.index + half_width).min(len - 1);

    let (ir_ac, ir_dc) = ac_dc(ir, peak.index, start, end)?;
    let (red_ac, red_dc) = ac_dc(red, peak.index, start, end)?;
    if red_ac <= 0.0 || ir_ac <= 0.0 || red_dc == 0.0 || ir_dc == 0.0 {
        trace!(
            "rejected ratio at t={:.3}: red ac/dc {}/{}, ir ac/dc {}/{}",
            peak.timestamp,
            red_ac,
            red_dc,
            ir_ac,
            ir_dc
        );
        return None;
    }
    Some((red_ac / red_dc) / (ir_ac / ir_dc))
}

fn ac_dc(values: &SlidingWindow<f64>, index: usize, start: usize, end: usize) -> Option<(f64, f64)> {
    let count = end - start + 1;
    let sum: f64 = values.iter().skip(start).take(count).sum();
    let dc = sum / count as f64;
    let ac = values.get(index)? - dc;
    Some((ac, dc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{metrics::NO_READING, synth::SyntheticPpg};

    #[test]
    fn fresh_estimator_reports_no_reading() {
        let estimator = SpO2Estimator::new(50).unwrap();
        assert_eq!(estimator.get(), NO_READING);
        assert!(estimator.ratios().is_empty());
    }

    #[test]
    fn known_ratio_maps_through_calibration() {
        let mut estimator = SpO2Estimator::new(50).unwrap();
        let synth = SyntheticPpg {
            ir_ac_ratio: 0.01,
            red_ac_ratio: 0.02,
            ..SyntheticPpg::new(50, 90.0)
        };
        for (ir, red) in synth.samples(8.0) {
            estimator.add_sample(ir, red);
        }
        let expected = ProcessorConfig::default().calibration.evaluate(2.0) as i32;
        let spo2 = estimator.get();
        assert!((spo2 - expected).abs() <= 1, "got {spo2}, expected {expected}");
        let mean_ratio = estimator.ratios().mean().unwrap();
        assert!((mean_ratio - 2.0).abs() < 0.1, "mean ratio {mean_ratio}");
    }

    #[test]
    fn custom_calibration_is_applied() {
        let cfg = ProcessorConfig {
            calibration: crate::config::CalibrationCurve {
                a: 0.0,
                b: -25.0,
                c: 110.0,
            },
            ..Default::default()
        };
        let mut estimator = SpO2Estimator::with_config(50, cfg).unwrap();
        let synth = SyntheticPpg {
            ir_ac_ratio: 0.02,
            red_ac_ratio: 0.02,
            ..SyntheticPpg::new(50, 80.0)
        };
        for (ir, red) in synth.samples(8.0) {
            estimator.add_sample(ir, red);
        }
        // R close to 1 -> 110 - 25
        let spo2 = estimator.get();
        assert!((84..=86).contains(&spo2), "got {spo2}");
    }

    #[test]
    fn zero_red_channel_never_records_ratios() {
        let mut estimator = SpO2Estimator::new(50).unwrap();
        for (ir, _) in SyntheticPpg::new(50, 90.0).samples(6.0) {
            estimator.add_sample(ir, 0);
        }
        assert!(estimator.is_present());
        assert!(estimator.ratios().is_empty());
        assert_eq!(estimator.estimate(), None);
        assert_eq!(estimator.get(), NO_READING);
        // the interval history still advances
        assert!(!estimator.processor().intervals().is_empty());
    }

    #[test]
    fn ratio_history_is_capped_at_frequency() {
        let mut estimator = SpO2Estimator::new(20).unwrap();
        for (ir, red) in SyntheticPpg::new(20, 100.0).samples(30.0) {
            estimator.add_sample(ir, red);
        }
        assert!(estimator.ratios().len() <= 20);
    }

    #[test]
    fn get_is_idempotent() {
        let mut estimator = SpO2Estimator::new(50).unwrap();
        for (ir, red) in SyntheticPpg::new(50, 90.0).samples(5.0) {
            estimator.add_sample(ir, red);
        }
        let first = estimator.get();
        assert_eq!(estimator.get(), first);
        assert_eq!(estimator.get(), first);
    }

    #[test]
    fn peak_ratio_clips_window_at_edges() {
        let mut ir = SlidingWindow::new(4);
        let mut red = SlidingWindow::new(4);
        for (i, r) in [(100.0, 50.0), (110.0, 60.0), (100.0, 50.0), (100.0, 50.0)] {
            ir.push(i);
            red.push(r);
        }
        let peak = Peak {
            index: 1,
            timestamp: 0.0,
            amplitude: 110.0,
        };
        // window covers every sample: ir dc 102.5 ac 7.5, red dc 52.5 ac 7.5
        let ratio = peak_ratio(&ir, &red, &peak, 5).unwrap();
        let expected = (7.5 / 52.5) / (7.5 / 102.5);
        assert!((ratio - expected).abs() < 1e-12);
    }

    #[test]
    fn peak_ratio_rejects_negative_ac() {
        let mut ir = SlidingWindow::new(3);
        let mut red = SlidingWindow::new(3);
        for (i, r) in [(100.0, 60.0), (110.0, 50.0), (100.0, 60.0)] {
            ir.push(i);
            red.push(r);
        }
        let peak = Peak {
            index: 1,
            timestamp: 0.0,
            amplitude: 110.0,
        };
        assert_eq!(peak_ratio(&ir, &red, &peak, 5), None);
    }
}
