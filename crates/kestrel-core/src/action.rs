use serde::{Deserialize, Serialize};

use crate::{Angle, Uid, Vector2};

/// A target pose in the world frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vector2,
    pub heading: Option<Angle>,
}

/// Velocities in the robot's local frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Speeds {
    /// Along the robot's heading \[m/s]
    pub tangent: f64,
    /// Perpendicular to the heading, `+` to the robot's left \[m/s]
    pub normal: f64,
    /// `+` counter-clockwise \[rad/s]
    pub angular: f64,
}

impl Speeds {
    pub fn is_zero(&self) -> bool {
        self.tangent == 0.0 && self.normal == 0.0 && self.angular == 0.0
    }
}

/// What one robot should do during the current cycle.
///
/// Motion is either a target pose or a set of speeds, never both. Kick and chip
/// exclude each other as well; whichever was set last wins.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Action {
    target: Option<Pose>,
    speeds: Option<Speeds>,
    kick_power: Option<f64>,
    chip_power: Option<f64>,
    dribble_power: Option<f64>,
}

impl Action {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_target(&mut self, target: Pose) {
        self.target = Some(target);
        self.speeds = None;
    }

    pub fn set_speeds(&mut self, speeds: Speeds) {
        self.speeds = Some(speeds);
        self.target = None;
    }

    pub fn kick(&mut self, power: f64) {
        self.kick_power = Some(power);
        self.chip_power = None;
    }

    pub fn chip(&mut self, power: f64) {
        self.chip_power = Some(power);
        self.kick_power = None;
    }

    pub fn dribble(&mut self, power: f64) {
        self.dribble_power = Some(power);
    }

    pub fn target(&self) -> Option<&Pose> {
        self.target.as_ref()
    }

    pub fn speeds(&self) -> Option<&Speeds> {
        self.speeds.as_ref()
    }

    pub fn kick_power(&self) -> Option<f64> {
        self.kick_power
    }

    pub fn chip_power(&self) -> Option<f64> {
        self.chip_power
    }

    pub fn dribble_power(&self) -> Option<f64> {
        self.dribble_power
    }

    /// Clear every intent.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether the action asks the robot to move.
    pub fn is_active(&self) -> bool {
        self.target.is_some() || self.speeds.map(|s| !s.is_zero()).unwrap_or(false)
    }

    /// Build the record handed to the command transport.
    pub fn command(&self, uid: Uid) -> PlayerCmd {
        let speeds = self.speeds.unwrap_or_default();
        PlayerCmd {
            uid,
            tangent_speed: speeds.tangent,
            normal_speed: speeds.normal,
            angular_speed: speeds.angular,
            kick_power: self.kick_power,
            chip_power: self.chip_power,
            dribble_power: self.dribble_power,
            target: self.target,
        }
    }
}

/// A command to one robot as it is handed to the transport.
///
/// Speeds are in the robot's local frame. Transports that only understand
/// velocities ignore `target`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerCmd {
    pub uid: Uid,
    pub tangent_speed: f64,
    pub normal_speed: f64,
    pub angular_speed: f64,
    pub kick_power: Option<f64>,
    pub chip_power: Option<f64>,
    pub dribble_power: Option<f64>,
    pub target: Option<Pose>,
}

impl PlayerCmd {
    pub fn zero(uid: Uid) -> PlayerCmd {
        Action::new().command(uid)
    }
}
