//! Turns raw vision samples into filtered updates for the world model.
//!
//! Producers own a [`StateEstimator`] and emit [`Update`]s; the control thread
//! applies them to its [`kestrel_core::World`].

mod estimator;
mod filter;
mod update;

pub use estimator::{Observation, StateEstimator, TrackedId};
pub use filter::Kalman;
pub use update::{BallUpdate, RobotUpdate, Update};
