// THEORY:
// This file is the main entry point for the `beacon_pilot` library crate. It
// exposes the two algorithmic halves of an autonomous mobile robot's core,
// color-landmark perception and omnidirectional drive kinematics, plus the
// minimal state-sequencing contract control programs are written against.
//
// The crate is consumed by an external control loop that alternates: acquire a
// frame, detect the landmarks, decide an action, convert the chosen motion to
// wheel powers, hand those to the actuators. Camera access, motor drivers, and
// the host runtime all live outside; this crate only computes.

pub mod core_modules;
pub mod error;
pub mod parallel_detector;
pub mod pipeline;

// Re-export the key data structures for the public API.
pub use crate::core_modules::color_sample::ColorSample;
pub use crate::core_modules::landmark_detector::{detect, detect_with_params};
pub use crate::core_modules::mecanum::{Motion, Wheels, motion_to_wheels};
pub use crate::core_modules::state_machine::{State, StateMachine, Transition};
pub use crate::core_modules::vector2d::Vector2d;
pub use crate::error::{ConfigurationError, VisionResult};
pub use crate::parallel_detector::ParallelDetector;
pub use crate::pipeline::{DetectorParams, LandmarkPipeline, PipelineConfig};
