use crate::{Action, Angle, Circle, FieldGeometry, RobotId, TeamColor, Uid, Uuid, Vector2};

/// A robot of either team.
///
/// Robots are created the first time their uid is looked up and are never
/// destroyed; a robot that is not currently seen by vision stays around with
/// `active == false`.
#[derive(Clone, Debug)]
pub struct Robot {
    id: RobotId,
    position: Vector2,
    /// `None` until the first observation
    orientation: Option<Angle>,
    velocity: Vector2,
    angular_speed: f64,
    radius: f64,
    front_cut_distance: f64,
    /// Derived from `position`; refreshed on every `update`
    body: Circle,
    /// Derived from `position` and `orientation`; refreshed on every `update`
    front_cut: Vector2,
    active: bool,
    last_seen: Option<f64>,
    pub action: Action,
    last_skill: Option<String>,
    last_tactic: Option<String>,
}

impl Robot {
    pub fn new(id: RobotId, geometry: &FieldGeometry) -> Self {
        let position = Vector2::zeros();
        let mut robot = Self {
            id,
            position,
            orientation: None,
            velocity: Vector2::zeros(),
            angular_speed: 0.0,
            radius: geometry.robot_radius,
            front_cut_distance: geometry.robot_front_cut,
            body: Circle::new(position, geometry.robot_radius),
            front_cut: position,
            active: false,
            last_seen: None,
            action: Action::new(),
            last_skill: None,
            last_tactic: None,
        };
        robot.refresh_shape();
        robot
    }

    /// Move the robot. The body and the front cut point follow before this
    /// returns.
    pub fn update(&mut self, position: Vector2, orientation: Option<Angle>) {
        self.position = position;
        if orientation.is_some() {
            self.orientation = orientation;
        }
        self.refresh_shape();
    }

    fn refresh_shape(&mut self) {
        self.body = Circle::new(self.position, self.radius);
        let heading = self.orientation.unwrap_or_default();
        self.front_cut = self.position + heading.unit_vector() * self.front_cut_distance;
    }

    pub fn set_velocity(&mut self, velocity: Vector2, angular_speed: f64) {
        self.velocity = velocity;
        self.angular_speed = angular_speed;
    }

    /// Record an observation at `timestamp` (seconds).
    pub fn mark_seen(&mut self, timestamp: f64) {
        self.active = true;
        self.last_seen = Some(self.last_seen.map_or(timestamp, |t| t.max(timestamp)));
    }

    /// Deactivate the robot if it has not been seen for more than `timeout`
    /// seconds before `now`. Returns whether the robot went inactive.
    pub fn expire(&mut self, now: f64, timeout: f64) -> bool {
        if !self.active {
            return false;
        }
        match self.last_seen {
            Some(t) if now - t <= timeout => false,
            _ => {
                self.active = false;
                true
            }
        }
    }

    pub fn id(&self) -> RobotId {
        self.id
    }

    pub fn uid(&self) -> Uid {
        self.id.uid
    }

    pub fn uuid(&self) -> Uuid {
        self.id.uuid()
    }

    pub fn color(&self) -> TeamColor {
        self.id.color
    }

    pub fn position(&self) -> Vector2 {
        self.position
    }

    pub fn orientation(&self) -> Option<Angle> {
        self.orientation
    }

    pub fn velocity(&self) -> Vector2 {
        self.velocity
    }

    pub fn angular_speed(&self) -> f64 {
        self.angular_speed
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn body(&self) -> &Circle {
        &self.body
    }

    /// Kicker contact point.
    pub fn front_cut(&self) -> Vector2 {
        self.front_cut
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn last_seen(&self) -> Option<f64> {
        self.last_seen
    }

    pub fn distance_to(&self, point: Vector2) -> f64 {
        (point - self.position).norm()
    }

    /// Name of the last skill that wrote this robot's action.
    pub fn last_skill(&self) -> Option<&str> {
        self.last_skill.as_deref()
    }

    /// Name of the last tactic that stepped this robot.
    pub fn last_tactic(&self) -> Option<&str> {
        self.last_tactic.as_deref()
    }

    pub fn set_last_skill(&mut self, name: &str) {
        self.last_skill = Some(name.to_owned());
    }

    pub fn set_last_tactic(&mut self, name: &str) {
        self.last_tactic = Some(name.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn robot() -> Robot {
        Robot::new(
            RobotId::new(TeamColor::Blue, Uid::new(1)),
            &FieldGeometry::default(),
        )
    }

    #[test]
    fn new_robot_is_inactive_without_orientation() {
        let robot = robot();
        assert!(!robot.is_active());
        assert!(robot.orientation().is_none());
        assert_eq!(robot.position(), Vector2::zeros());
    }

    #[test]
    fn update_refreshes_shape() {
        let mut robot = robot();
        robot.update(Vector2::new(1.0, 2.0), Some(Angle::PI_2));
        assert_eq!(robot.body().center, Vector2::new(1.0, 2.0));
        assert_relative_eq!(robot.front_cut().x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(robot.front_cut().y, 2.075, epsilon = 1e-12);

        // A position-only update keeps the last known heading
        robot.update(Vector2::new(0.0, 0.0), None);
        assert_eq!(robot.orientation(), Some(Angle::PI_2));
        assert_eq!(robot.body().center, Vector2::zeros());
        assert_relative_eq!(robot.front_cut().y, 0.075, epsilon = 1e-12);
    }

    #[test]
    fn expire_after_timeout() {
        let mut robot = robot();
        robot.mark_seen(1.0);
        assert!(robot.is_active());
        assert!(!robot.expire(1.2, 0.5));
        assert!(robot.expire(1.6, 0.5));
        assert!(!robot.is_active());
        assert!(!robot.expire(2.0, 0.5));
    }
}
