pub mod heart_rate;
pub mod spo2;

pub use heart_rate::HeartRateEstimator;
pub use spo2::SpO2Estimator;

/// Value reported by `get()` while no finger is present or no estimate exists yet.
pub const NO_READING: i32 = -1;

fn gated(present: bool, value: Option<u32>) -> i32 {
    match value {
        Some(v) if present => i32::try_from(v).unwrap_or(i32::MAX),
        _ => NO_READING,
    }
}
