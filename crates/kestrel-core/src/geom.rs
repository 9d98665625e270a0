use serde::{Deserialize, Serialize};

use crate::Vector2;

/// Field and robot dimensions. All lengths are in metres.
///
/// The defaults describe a division B field.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct FieldGeometry {
    /// Distance between the goal lines
    pub field_length: f64,
    /// Distance between the touch lines
    pub field_width: f64,
    /// Distance between the inner edges of the goal posts
    pub goal_width: f64,
    /// Distance from the goal line to the back of the goal
    pub goal_depth: f64,
    /// Distance from the touch/goal lines to the boundary walls
    pub boundary_width: f64,
    /// Depth of the defense area, measured from the goal line
    pub penalty_area_depth: f64,
    /// Width of the defense area
    pub penalty_area_width: f64,
    /// Distance from the goal centre to the penalty mark
    pub goal_to_penalty_mark: f64,
    pub center_circle_radius: f64,
    pub robot_radius: f64,
    /// Distance from a robot's centre to its flat front (where the kicker is)
    pub robot_front_cut: f64,
    pub ball_radius: f64,
}

impl Default for FieldGeometry {
    fn default() -> Self {
        Self {
            field_length: 9.0,
            field_width: 6.0,
            goal_width: 1.0,
            goal_depth: 0.18,
            boundary_width: 0.3,
            penalty_area_depth: 1.0,
            penalty_area_width: 2.0,
            goal_to_penalty_mark: 2.0,
            center_circle_radius: 0.5,
            robot_radius: 0.09,
            robot_front_cut: 0.075,
            ball_radius: 0.0215,
        }
    }
}

impl FieldGeometry {
    pub fn half_length(&self) -> f64 {
        self.field_length / 2.0
    }

    pub fn half_width(&self) -> f64 {
        self.field_width / 2.0
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub center: Vector2,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: Vector2, radius: f64) -> Self {
        Self { center, radius }
    }

    pub fn contains(&self, point: Vector2) -> bool {
        (point - self.center).norm() <= self.radius
    }

    /// Distance from `point` to the circle's boundary; negative inside.
    pub fn distance_to(&self, point: Vector2) -> f64 {
        (point - self.center).norm() - self.radius
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub p1: Vector2,
    pub p2: Vector2,
}

impl Segment {
    pub fn new(p1: Vector2, p2: Vector2) -> Self {
        Self { p1, p2 }
    }

    pub fn length(&self) -> f64 {
        (self.p2 - self.p1).norm()
    }

    pub fn midpoint(&self) -> Vector2 {
        (self.p1 + self.p2) / 2.0
    }

    /// Point on the segment nearest to `point`.
    pub fn closest_point(&self, point: Vector2) -> Vector2 {
        let d = self.p2 - self.p1;
        let len_sq = d.norm_squared();
        if len_sq < f64::EPSILON {
            return self.p1;
        }
        let t = ((point - self.p1).dot(&d) / len_sq).clamp(0.0, 1.0);
        self.p1 + d * t
    }

    pub fn distance_to_point(&self, point: Vector2) -> f64 {
        (point - self.closest_point(point)).norm()
    }
}

/// A simple (non self-intersecting) polygon.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Polygon {
    pub vertices: Vec<Vector2>,
}

impl Polygon {
    pub fn new(vertices: Vec<Vector2>) -> Self {
        Self { vertices }
    }

    /// Axis-aligned rectangle spanned by two opposite corners.
    pub fn rectangle(a: Vector2, b: Vector2) -> Self {
        let (min_x, max_x) = (a.x.min(b.x), a.x.max(b.x));
        let (min_y, max_y) = (a.y.min(b.y), a.y.max(b.y));
        Self::new(vec![
            Vector2::new(min_x, min_y),
            Vector2::new(max_x, min_y),
            Vector2::new(max_x, max_y),
            Vector2::new(min_x, max_y),
        ])
    }

    /// Even-odd ray casting. Points exactly on an edge may go either way.
    pub fn contains(&self, point: Vector2) -> bool {
        let n = self.vertices.len();
        if n < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let (vi, vj) = (self.vertices[i], self.vertices[j]);
            if (vi.y > point.y) != (vj.y > point.y)
                && point.x < (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    pub fn centroid(&self) -> Vector2 {
        if self.vertices.is_empty() {
            return Vector2::zeros();
        }
        self.vertices.iter().sum::<Vector2>() / self.vertices.len() as f64
    }

    pub fn edges(&self) -> impl Iterator<Item = Segment> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| Segment::new(self.vertices[i], self.vertices[(i + 1) % n]))
    }
}
