use kestrel_core::{ControllerSettings, Robot, TeamColor, Vector2, World};
use kestrel_executor::behavior::{
    Behavior, Heading, Lookpoint, Playbook, Players, Tactic, TacticSet, Transition,
};
use kestrel_executor::skills::{Goto, Halt};

/// Robots closer than this to their slot stop driving.
const HOLD_DISTANCE: f64 = 0.05;
/// Robots pushed further than this from their slot drive back.
const RETURN_DISTANCE: f64 = 0.2;

/// Slots on the negative half, indexed by uid. The goalkeeper slot comes first.
const SLOTS: [(f64, f64); 6] = [
    (-4.0, 0.0),
    (-3.0, 1.0),
    (-3.0, -1.0),
    (-2.0, 0.0),
    (-1.0, 1.5),
    (-1.0, -1.5),
];

/// The slot of robot `index` for a team defending the goal on `side`.
pub fn slot(index: u16, side: f64) -> Vector2 {
    let (x, y) = SLOTS[usize::from(index) % SLOTS.len()];
    Vector2::new(-side * x, y)
}

/// The tactics every robot of the formation knows: `position` drives to the
/// robot's slot facing the ball, `halt` keeps it still.
pub fn formation_tactics(
    side: f64,
    controller: ControllerSettings,
) -> impl Fn(&Robot) -> TacticSet + Send + 'static {
    move |robot| {
        let id = robot.id();
        let target = slot(id.uid.as_u16(), side);

        let mut position = Tactic::new("position", id);
        let goto = Goto::new(
            id,
            target,
            Some(Heading::from(Lookpoint::ball())),
            &controller,
        );
        let moving = position.add_state("moving", Some(Behavior::skill(goto)));
        let holding = position.add_state("holding", Some(Behavior::skill(Halt::new(id))));
        position.add_transition(
            Transition::new(moving, holding)
                .when(move |world: &World| world.robot(id).distance_to(target) < HOLD_DISTANCE),
        );
        position.add_transition(
            Transition::new(holding, moving)
                .when(move |world: &World| world.robot(id).distance_to(target) > RETURN_DISTANCE),
        );

        let mut halt = Tactic::new("halt", id);
        halt.add_state("stopped", Some(Behavior::skill(Halt::new(id))));

        let mut set = TacticSet::new();
        set.insert("position".to_owned(), position);
        set.insert("halt".to_owned(), halt);
        set
    }
}

/// Keeps the team in a static formation while the referee allows motion.
pub struct Formation {
    color: TeamColor,
}

impl Formation {
    pub fn new(color: TeamColor) -> Self {
        Self { color }
    }
}

impl Playbook for Formation {
    fn name(&self) -> &str {
        "formation"
    }

    fn setup_tactics(&mut self, world: &World, players: &mut Players) {
        let tactic = if world.referee().command.allows_motion() {
            "position"
        } else {
            "halt"
        };
        for player in players.values_mut() {
            if player.current_tactic() != Some(tactic) {
                log::debug!(
                    "{} player {} switches to {}",
                    self.color,
                    player.uid(),
                    tactic
                );
                player.set_current_tactic(tactic);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use kestrel_core::{
        Angle, FieldGeometry, RefereeCommand, RefereeState, RobotId, Settings, Uid,
    };
    use kestrel_executor::behavior::{Play, Steppable};

    use super::*;

    fn world_with(id: RobotId, position: Vector2) -> World {
        let world = World::new(FieldGeometry::default());
        world.with_robot(id, |robot| {
            robot.update(position, Some(Angle::ZERO));
            robot.mark_seen(0.0);
        });
        world
    }

    #[test]
    fn slots_mirror_with_side() {
        assert_eq!(slot(0, -1.0), Vector2::new(-4.0, 0.0));
        assert_eq!(slot(0, 1.0), Vector2::new(4.0, 0.0));
        assert_eq!(slot(7, -1.0), slot(1, -1.0));
    }

    #[test]
    fn halts_until_the_referee_allows_motion() {
        let id = RobotId::new(TeamColor::Blue, Uid::new(3));
        let mut world = world_with(id, Vector2::zeros());
        let settings = Settings::default();
        let mut play = Play::new(
            TeamColor::Blue,
            formation_tactics(-1.0, settings.controller),
            Formation::new(TeamColor::Blue),
        );

        play.step(&world).unwrap();
        assert_eq!(world.robot(id).last_tactic(), Some("halt"));

        world.set_referee(RefereeState::new(RefereeCommand::ForceStart, 0.0));
        play.step(&world).unwrap();
        let robot = world.robot(id);
        assert_eq!(robot.last_tactic(), Some("position"));
        assert_eq!(robot.last_skill(), Some("goto"));
    }

    #[test]
    fn holds_once_in_slot() {
        let id = RobotId::new(TeamColor::Blue, Uid::new(0));
        let mut world = world_with(id, slot(0, -1.0));
        world.set_referee(RefereeState::new(RefereeCommand::NormalStart, 0.0));
        let mut play = Play::new(
            TeamColor::Blue,
            formation_tactics(-1.0, ControllerSettings::default()),
            Formation::new(TeamColor::Blue),
        );

        play.step(&world).unwrap();
        play.step(&world).unwrap();
        let tactic = &play.players()[&Uid::new(0)].tactics()["position"];
        assert_eq!(tactic.current_state(), Some("holding"));
    }
}
