use kestrel_core::{Action, Robot, RobotId, Speeds, World};

use crate::behavior::Skill;

/// Keep the robot still.
pub struct Halt {
    robot: RobotId,
}

impl Halt {
    pub fn new(robot: RobotId) -> Self {
        Self { robot }
    }
}

impl Skill for Halt {
    fn robot(&self) -> RobotId {
        self.robot
    }

    fn name(&self) -> &str {
        "halt"
    }

    fn act(&mut self, _robot: &Robot, action: &mut Action, _world: &World) {
        action.set_speeds(Speeds::default());
    }
}
