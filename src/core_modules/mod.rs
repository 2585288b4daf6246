// The algorithmic core: value types, the clustering engine, the landmark
// detector, the drive kinematics, and the sequencing contract. Everything
// above this layer is configuration and orchestration.

pub mod color_cluster;
pub mod color_sample;
pub mod landmark_detector;
pub mod mecanum;
pub mod state_machine;
pub mod vector2d;
