pub mod peaks;
pub mod presence;

pub use peaks::{Peak, PeakDetector};
pub use presence::PresenceDetector;
