use kestrel_core::{
    math::{cross, left_normal},
    Action, Angle, ControllerSettings, Robot, RobotId, Vector2, World,
};

use crate::{
    behavior::{Heading, Skill},
    control::{to_local_speeds, Pid},
};

/// Distance to the target at which the robot counts as arrived \[m].
pub const ARRIVAL_TOLERANCE: f64 = 1e-3;
/// Heading error at which the robot counts as oriented \[deg].
pub const ORIENTATION_TOLERANCE: f64 = 1.0;

const SAMPLES: usize = 10;
const MAX_DEPTH: usize = 3;
/// Clearance required around other robots, in robot radii
const COLLISION_RADII: f64 = 2.0;
/// Offset of a deflected waypoint from the colliding sample, in robot radii
const DEFLECTION_RADII: f64 = 1.5;

/// Find a waypoint towards `target` that steers clear of `obstacles`.
///
/// The straight line from `start` to `target` is sampled at [`SAMPLES`] evenly
/// spaced points, `start` excluded. At the first sample closer than two robot
/// radii to an obstacle the path is deflected sideways, away from the
/// obstacle, and the search repeats towards the deflected point. After three
/// deflections the last candidate is returned as is.
pub fn plan_path(
    start: Vector2,
    target: Vector2,
    obstacles: &[Vector2],
    radius: f64,
    depth: usize,
) -> Vector2 {
    if depth >= MAX_DEPTH {
        return target;
    }
    let delta = target - start;
    let length = delta.norm();
    if length < f64::EPSILON {
        return target;
    }

    let clearance = COLLISION_RADII * radius;
    for i in 1..=SAMPLES {
        let sample = start + delta * (i as f64 / SAMPLES as f64);
        let hit = obstacles
            .iter()
            .find(|obstacle| (**obstacle - sample).norm() <= clearance);
        if let Some(obstacle) = hit {
            let normal = left_normal(delta / length);
            // Obstacle on the left of the path: go right, otherwise left
            let normal = if cross(delta, obstacle - start) > 0.0 {
                -normal
            } else {
                normal
            };
            let waypoint = sample + normal * (DEFLECTION_RADII * radius);
            return plan_path(start, waypoint, obstacles, radius, depth + 1);
        }
    }
    target
}

/// Drive a robot to a point, avoiding other robots, and optionally turn it to
/// a heading.
pub struct Goto {
    robot: RobotId,
    final_target: Vector2,
    heading: Option<Heading>,
    /// Waypoint chosen by the planner in the last step
    target: Vector2,
    max_speed: f64,
    braking_distance: f64,
    heading_pid: Pid<f64>,
}

impl Goto {
    pub fn new(
        robot: RobotId,
        target: Vector2,
        heading: Option<Heading>,
        settings: &ControllerSettings,
    ) -> Self {
        Self {
            robot,
            final_target: target,
            heading,
            target,
            max_speed: settings.max_speed,
            braking_distance: settings.braking_distance,
            heading_pid: Pid::new(settings.heading_kp, settings.heading_ki, settings.heading_kd)
                .with_integral_limit(settings.heading_integral_limit)
                .with_output_limit(settings.max_angular_speed),
        }
    }

    /// Retarget this skill.
    pub fn set_target(&mut self, target: Vector2, heading: Option<Heading>) {
        self.final_target = target;
        self.target = target;
        self.heading = heading;
        self.heading_pid.reset();
    }

    pub fn final_target(&self) -> Vector2 {
        self.final_target
    }

    /// The waypoint the robot was last sent towards.
    pub fn planned_target(&self) -> Vector2 {
        self.target
    }

    pub fn arrived(&self, robot: &Robot) -> bool {
        robot.distance_to(self.final_target) <= ARRIVAL_TOLERANCE
    }

    /// Whether the robot faces the desired heading. Always true without one.
    pub fn oriented(&self, robot: &Robot, world: &World) -> bool {
        self.heading_error(robot, world)
            .map_or(true, |error| error.abs().to_degrees() <= ORIENTATION_TOLERANCE)
    }

    fn heading_error(&self, robot: &Robot, world: &World) -> Option<f64> {
        let current = robot.orientation().unwrap_or_default();
        self.heading
            .as_ref()
            .map(|h| current.shortest_to(h.resolve(robot.position(), world)).radians())
    }

    /// Linear speed for a robot `to_final` away from the final target and
    /// `to_planned` away from the current waypoint.
    fn speed(&self, to_final: f64, to_planned: f64) -> f64 {
        if to_final > self.braking_distance {
            self.max_speed
        } else {
            self.max_speed * (to_planned / self.braking_distance).min(1.0)
        }
    }
}

impl Skill for Goto {
    fn robot(&self) -> RobotId {
        self.robot
    }

    fn name(&self) -> &str {
        "goto"
    }

    fn act(&mut self, robot: &Robot, action: &mut Action, world: &World) {
        let position = robot.position();
        let obstacles = world.obstacles(robot.id());
        self.target = plan_path(position, self.final_target, &obstacles, robot.radius(), 0);

        let to_target = self.target - position;
        let distance = to_target.norm();
        let velocity = if distance > ARRIVAL_TOLERANCE {
            to_target / distance * self.speed(robot.distance_to(self.final_target), distance)
        } else {
            Vector2::zeros()
        };

        let angular = match self.heading_error(robot, world) {
            Some(error) => self.heading_pid.step(error, 0.0),
            None => 0.0,
        };

        let heading: Angle = robot.orientation().unwrap_or_default();
        action.set_speeds(to_local_speeds(velocity, heading, angular));
    }

    fn busy(&self, world: &World) -> bool {
        let robot = world.robot(self.robot);
        !(self.arrived(&robot) && self.oriented(&robot, world))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use kestrel_core::{FieldGeometry, Segment, TeamColor, Uid};

    use super::*;
    use crate::behavior::run_skill;

    const R: f64 = 0.09;

    #[test]
    fn free_path_is_unchanged() {
        let target = Vector2::new(2.0, 1.0);
        assert_eq!(plan_path(Vector2::zeros(), target, &[], R, 0), target);

        let far = [Vector2::new(-2.0, -2.0)];
        assert_eq!(plan_path(Vector2::zeros(), target, &far, R, 0), target);
    }

    #[test]
    fn deflects_around_obstacle_on_line() {
        let start = Vector2::zeros();
        let obstacle = Vector2::new(1.0, 0.0);
        let waypoint = plan_path(start, Vector2::new(2.0, 0.0), &[obstacle], R, 0);

        assert_relative_eq!(waypoint.x, 0.882, epsilon = 1e-3);
        assert_relative_eq!(waypoint.y, 0.255, epsilon = 1e-3);
        assert!(Segment::new(start, waypoint).distance_to_point(obstacle) > 2.0 * R);
    }

    #[test]
    fn deflects_away_from_obstacle_side() {
        // Obstacle slightly right of the path: the waypoint goes left.
        let waypoint = plan_path(
            Vector2::zeros(),
            Vector2::new(2.0, 0.0),
            &[Vector2::new(1.0, -0.05)],
            R,
            0,
        );
        assert!(waypoint.y > 0.0);

        let waypoint = plan_path(
            Vector2::zeros(),
            Vector2::new(2.0, 0.0),
            &[Vector2::new(1.0, 0.05)],
            R,
            0,
        );
        assert!(waypoint.y < 0.0);
    }

    #[test]
    fn depth_limit_returns_candidate() {
        let target = Vector2::new(1.0, 0.0);
        assert_eq!(
            plan_path(Vector2::zeros(), target, &[target], R, MAX_DEPTH),
            target
        );
    }

    #[test]
    fn brakes_near_final_target() {
        let world = World::new(FieldGeometry::default());
        let id = RobotId::new(TeamColor::Blue, Uid::new(0));
        world.with_robot(id, |r| {
            r.update(Vector2::zeros(), Some(Angle::ZERO));
            r.mark_seen(0.0);
        });
        let settings = ControllerSettings::default();
        let mut goto = Goto::new(id, Vector2::new(0.25, 0.0), None, &settings);
        run_skill(&mut goto, &world);

        let speeds = *world.robot(id).action.speeds().unwrap();
        assert_relative_eq!(speeds.tangent, settings.max_speed * 0.5);
        assert_relative_eq!(speeds.normal, 0.0);
    }

    #[test]
    fn turns_towards_heading() {
        let world = World::new(FieldGeometry::default());
        let id = RobotId::new(TeamColor::Blue, Uid::new(0));
        world.with_robot(id, |r| {
            r.update(Vector2::zeros(), Some(Angle::ZERO));
            r.mark_seen(0.0);
        });
        let mut goto = Goto::new(
            id,
            Vector2::zeros(),
            Some(Heading::Fixed(Angle::PI_2)),
            &ControllerSettings::default(),
        );
        assert!(goto.busy(&world));
        run_skill(&mut goto, &world);

        let speeds = *world.robot(id).action.speeds().unwrap();
        assert!(speeds.angular > 0.0);
        assert_eq!(speeds.tangent, 0.0);
    }
}
