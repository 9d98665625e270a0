use kestrel_core::{Action, Angle, Robot, RobotId, Vector2, World};

/// A leaf behavior bound to one robot. Each step it writes the robot's
/// [`Action`]; it never transitions.
pub trait Skill: Send {
    fn robot(&self) -> RobotId;

    fn name(&self) -> &str;

    /// Compute this cycle's action. `robot` is a snapshot taken just before
    /// the call.
    fn act(&mut self, robot: &Robot, action: &mut Action, world: &World);

    fn busy(&self, _world: &World) -> bool {
        false
    }
}

/// Step a skill: snapshot its robot, let the skill fill in the action, then
/// store the action and mark the skill as the robot's last one.
///
/// The team lock is not held while the skill runs, so skills are free to
/// query the world.
pub fn run_skill(skill: &mut dyn Skill, world: &World) {
    let id = skill.robot();
    let robot = world.robot(id);
    let mut action = robot.action.clone();
    skill.act(&robot, &mut action, world);
    world.with_robot(id, |robot| {
        robot.action = action;
        robot.set_last_skill(skill.name());
    });
}

/// A point to look at, either fixed or computed from the world whenever it is
/// read.
pub enum Lookpoint {
    Fixed(Vector2),
    Computed(Box<dyn Fn(&World) -> Vector2 + Send>),
}

impl Lookpoint {
    pub fn computed(f: impl Fn(&World) -> Vector2 + Send + 'static) -> Self {
        Lookpoint::Computed(Box::new(f))
    }

    /// The ball's current position.
    pub fn ball() -> Self {
        Self::computed(|world| world.ball().position())
    }

    pub fn resolve(&self, world: &World) -> Vector2 {
        match self {
            Lookpoint::Fixed(point) => *point,
            Lookpoint::Computed(f) => f(world),
        }
    }
}

/// Desired facing of a robot.
pub enum Heading {
    Fixed(Angle),
    Towards(Lookpoint),
}

impl Heading {
    /// The angle a robot standing at `from` should face.
    pub fn resolve(&self, from: Vector2, world: &World) -> Angle {
        match self {
            Heading::Fixed(angle) => *angle,
            Heading::Towards(lookpoint) => Angle::between_points(from, lookpoint.resolve(world)),
        }
    }
}

impl From<Angle> for Heading {
    fn from(angle: Angle) -> Self {
        Heading::Fixed(angle)
    }
}

impl From<Lookpoint> for Heading {
    fn from(lookpoint: Lookpoint) -> Self {
        Heading::Towards(lookpoint)
    }
}

#[cfg(test)]
mod tests {
    use kestrel_core::{FieldGeometry, Speeds, TeamColor, Uid};

    use super::*;

    struct Spin(RobotId);

    impl Skill for Spin {
        fn robot(&self) -> RobotId {
            self.0
        }

        fn name(&self) -> &str {
            "spin"
        }

        fn act(&mut self, _robot: &Robot, action: &mut Action, _world: &World) {
            action.set_speeds(Speeds {
                angular: 1.0,
                ..Default::default()
            });
        }
    }

    #[test]
    fn run_skill_writes_back() {
        let world = World::new(FieldGeometry::default());
        let id = RobotId::new(TeamColor::Blue, Uid::new(1));
        run_skill(&mut Spin(id), &world);

        let robot = world.robot(id);
        assert_eq!(robot.action.speeds().map(|s| s.angular), Some(1.0));
        assert_eq!(robot.last_skill(), Some("spin"));
    }

    #[test]
    fn lookpoint_resolves_at_read_time() {
        let mut world = World::new(FieldGeometry::default());
        let lookpoint = Lookpoint::ball();
        assert_eq!(lookpoint.resolve(&world), Vector2::zeros());

        world
            .ball_mut()
            .update(Vector2::new(1.0, 1.0), Vector2::zeros(), 0.0);
        assert_eq!(lookpoint.resolve(&world), Vector2::new(1.0, 1.0));

        let heading = Heading::from(lookpoint);
        assert_eq!(
            heading.resolve(Vector2::new(0.0, 1.0), &world),
            Angle::from_degrees(0.0)
        );
        assert_eq!(
            Heading::from(Angle::PI_2).resolve(Vector2::zeros(), &world),
            Angle::PI_2
        );
    }
}
