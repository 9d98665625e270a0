use kestrel_core::{RobotId, World};

use super::{Behavior, BehaviorError, Machine, StateId, Steppable, Transition};

/// A state machine of behaviors driving one robot.
///
/// Transition conditions are evaluated against the world after the current
/// state's behavior has been stepped.
pub struct Tactic {
    name: String,
    robot: RobotId,
    machine: Machine<Behavior, World>,
}

impl Tactic {
    /// Create a deterministic tactic.
    pub fn new(name: impl Into<String>, robot: RobotId) -> Self {
        Self::with_machine(name, robot, Machine::new(true))
    }

    pub fn with_machine(
        name: impl Into<String>,
        robot: RobotId,
        machine: Machine<Behavior, World>,
    ) -> Self {
        Self {
            name: name.into(),
            robot,
            machine,
        }
    }

    pub fn robot(&self) -> RobotId {
        self.robot
    }

    pub fn add_state(&mut self, name: impl Into<String>, behavior: Option<Behavior>) -> StateId {
        self.machine.add_state(name, behavior)
    }

    pub fn add_transition(&mut self, transition: Transition<World>) {
        self.machine.add_transition(transition);
    }

    pub fn machine(&self) -> &Machine<Behavior, World> {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut Machine<Behavior, World> {
        &mut self.machine
    }

    /// Name of the state the tactic is in.
    pub fn current_state(&self) -> Option<&str> {
        self.machine.current_state().map(|s| s.name.as_str())
    }
}

impl Steppable for Tactic {
    fn name(&self) -> &str {
        &self.name
    }

    fn step(&mut self, world: &World) -> Result<(), BehaviorError> {
        if let Some(state) = self.machine.current_state_mut() {
            match state.behavior.as_mut() {
                Some(behavior) => behavior.step(world)?,
                None => {
                    return Err(BehaviorError::Unimplemented {
                        name: format!("{}/{}", self.name, state.name),
                    })
                }
            }
        }
        self.machine.execute(world);
        world.with_robot(self.robot, |robot| robot.set_last_tactic(&self.name));
        Ok(())
    }

    fn busy(&self, world: &World) -> bool {
        self.machine
            .current_state()
            .and_then(|state| state.behavior.as_ref())
            .map_or(false, |behavior| behavior.busy(world))
    }
}

#[cfg(test)]
mod tests {
    use kestrel_core::{Action, FieldGeometry, Robot, TeamColor, Uid};

    use super::*;
    use crate::behavior::Skill;

    struct Kick(RobotId);

    impl Skill for Kick {
        fn robot(&self) -> RobotId {
            self.0
        }

        fn name(&self) -> &str {
            "kick"
        }

        fn act(&mut self, _robot: &Robot, action: &mut Action, _world: &World) {
            action.kick(1.0);
        }
    }

    fn id() -> RobotId {
        RobotId::new(TeamColor::Yellow, Uid::new(3))
    }

    #[test]
    fn steps_state_then_transitions() {
        let world = World::new(FieldGeometry::default());
        let mut tactic = Tactic::new("striker", id());
        let kick = tactic.add_state("kick", Some(Behavior::skill(Kick(id()))));
        let done = tactic.add_state("done", Some(Behavior::skill(Kick(id()))));
        tactic.add_transition(Transition::new(kick, done).always());

        tactic.step(&world).unwrap();
        assert_eq!(tactic.current_state(), Some("done"));

        let robot = world.robot(id());
        assert_eq!(robot.action.kick_power(), Some(1.0));
        assert_eq!(robot.last_skill(), Some("kick"));
        assert_eq!(robot.last_tactic(), Some("striker"));
    }

    #[test]
    fn empty_state_is_unimplemented() {
        let world = World::new(FieldGeometry::default());
        let mut tactic = Tactic::new("idle", id());
        tactic.add_state("nothing", None);
        assert_eq!(
            tactic.step(&world),
            Err(BehaviorError::Unimplemented {
                name: "idle/nothing".to_owned()
            })
        );
    }

    #[test]
    fn tactic_without_states_only_records_itself() {
        let world = World::new(FieldGeometry::default());
        let mut tactic = Tactic::new("empty", id());
        assert!(tactic.step(&world).is_ok());
        assert_eq!(world.robot(id()).last_tactic(), Some("empty"));
        assert!(!tactic.busy(&world));
    }
}
