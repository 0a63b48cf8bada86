//! Relative positioning against peers and sector momentum classification.

pub mod peers;
pub mod rotation;

pub use peers::{calculate_relative_metrics, interpret_z_score, PeerPosition, RelativeMetric};
pub use rotation::{rotation_signal, sector_rotation_analysis, RotationSignal, SectorMomentum};
