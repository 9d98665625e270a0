use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{FieldGeometry, TeamColor};

/// Settings for the state estimator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerSettings {
    /// Process noise diagonal (x, y, angle) for robots.
    pub robot_process_noise: [f64; 3],
    /// Measurement noise diagonal (x, y, angle) for robots.
    pub robot_measurement_noise: [f64; 3],
    /// Process noise diagonal (x, y, angle) for the ball. The angle entry is
    /// unused.
    pub ball_process_noise: [f64; 3],
    /// Measurement noise diagonal (x, y, angle) for the ball.
    pub ball_measurement_noise: [f64; 3],
    /// Initial variance of a freshly created filter.
    pub initial_variance: f64,
    /// Time step assumed for the first observation of an entity, in seconds.
    pub nominal_period: f64,
    /// Seconds without an observation after which a robot is inactive.
    pub robot_timeout: f64,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            robot_process_noise: [1e-4, 1e-4, 1e-3],
            robot_measurement_noise: [1e-3, 1e-3, 1e-2],
            ball_process_noise: [1e-3, 1e-3, 0.0],
            ball_measurement_noise: [1e-3, 1e-3, 1.0],
            initial_variance: 1.0,
            nominal_period: 1.0 / 60.0,
            robot_timeout: 0.5,
        }
    }
}

/// Settings for the motion controller used by the `Goto` skill.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerSettings {
    /// Maximum linear speed in m/s.
    pub max_speed: f64,
    /// Distance to the final target below which the robot starts braking, in m.
    pub braking_distance: f64,
    pub heading_kp: f64,
    pub heading_ki: f64,
    pub heading_kd: f64,
    /// Clamp for the accumulated heading error.
    pub heading_integral_limit: f64,
    /// Maximum angular speed in rad/s.
    pub max_angular_speed: f64,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            max_speed: 2.0,
            braking_distance: 0.5,
            heading_kp: 3.0,
            heading_ki: 0.0,
            heading_kd: 0.5,
            heading_integral_limit: 1.0,
            max_angular_speed: 6.0,
        }
    }
}

/// Settings for the control loop and the update pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorSettings {
    /// The team we drive.
    pub own_color: TeamColor,
    /// Control cycle period in seconds.
    pub cycle_period: f64,
    /// Capacity of each updater queue.
    pub queue_capacity: usize,
    /// How long a stopping updater may take before it is abandoned, in seconds.
    pub stop_grace_period: f64,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            own_color: TeamColor::Blue,
            cycle_period: 1.0 / 60.0,
            queue_capacity: 15,
            stop_grace_period: 0.5,
        }
    }
}

/// Everything that can be configured, stored as one JSON file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub geometry: FieldGeometry,
    pub tracker: TrackerSettings,
    pub controller: ControllerSettings,
    pub executor: ExecutorSettings,
}

impl Settings {
    /// Load the settings from a file, or store the defaults there if the file
    /// does not exist yet.
    pub fn load_or_insert(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse settings from {}", path.display())),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let settings = Self::default();
                settings.store(path)?;
                log::info!("Wrote default settings to {}", path.display());
                Ok(settings)
            }
            Err(err) => {
                Err(err).with_context(|| format!("Failed to read settings from {}", path.display()))
            }
        }
    }

    pub fn store(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("Failed to write settings to {}", path.display()))
    }
}
