use crate::{Circle, Vector2};

/// The ball. It belongs to no team.
#[derive(Clone, Debug)]
pub struct Ball {
    position: Vector2,
    velocity: Vector2,
    radius: f64,
    body: Circle,
    last_seen: Option<f64>,
}

impl Ball {
    pub fn new(radius: f64) -> Self {
        Self {
            position: Vector2::zeros(),
            velocity: Vector2::zeros(),
            radius,
            body: Circle::new(Vector2::zeros(), radius),
            last_seen: None,
        }
    }

    pub fn update(&mut self, position: Vector2, velocity: Vector2, timestamp: f64) {
        self.position = position;
        self.velocity = velocity;
        self.body = Circle::new(position, self.radius);
        self.last_seen = Some(timestamp);
    }

    pub fn position(&self) -> Vector2 {
        self.position
    }

    pub fn velocity(&self) -> Vector2 {
        self.velocity
    }

    /// Speed in m/s.
    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn body(&self) -> &Circle {
        &self.body
    }

    /// Timestamp of the last observation, `None` if the ball was never seen.
    pub fn last_seen(&self) -> Option<f64> {
        self.last_seen
    }
}
