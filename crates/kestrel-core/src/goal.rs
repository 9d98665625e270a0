use crate::{math::find_intersection, FieldGeometry, Polygon, Segment, Vector2};

/// One of the two goals. Everything here is derived from the field geometry and
/// the sign of the goal's side (`+1.0` for the goal at positive x).
#[derive(Clone, Debug)]
pub struct Goal {
    side: f64,
    center: Vector2,
    posts: [Vector2; 2],
    penalty_line: Segment,
    penalty_spot: Vector2,
    defense_area: Polygon,
}

impl Goal {
    pub fn new(geometry: &FieldGeometry, side: f64) -> Self {
        let side = if side < 0.0 { -1.0 } else { 1.0 };
        let goal_x = side * geometry.half_length();
        let center = Vector2::new(goal_x, 0.0);
        let half_goal = geometry.goal_width / 2.0;
        let posts = [
            Vector2::new(goal_x, -half_goal),
            Vector2::new(goal_x, half_goal),
        ];

        let front_x = goal_x - side * geometry.penalty_area_depth;
        let half_area = geometry.penalty_area_width / 2.0;
        let penalty_line = Segment::new(
            Vector2::new(front_x, -half_area),
            Vector2::new(front_x, half_area),
        );
        let defense_area = Polygon::rectangle(
            Vector2::new(goal_x, -half_area),
            Vector2::new(front_x, half_area),
        );
        let penalty_spot = Vector2::new(goal_x - side * geometry.goal_to_penalty_mark, 0.0);

        Self {
            side,
            center,
            posts,
            penalty_line,
            penalty_spot,
            defense_area,
        }
    }

    pub fn side(&self) -> f64 {
        self.side
    }

    pub fn center(&self) -> Vector2 {
        self.center
    }

    pub fn posts(&self) -> [Vector2; 2] {
        self.posts
    }

    /// Front edge of the defense area.
    pub fn penalty_line(&self) -> Segment {
        self.penalty_line
    }

    pub fn penalty_spot(&self) -> Vector2 {
        self.penalty_spot
    }

    pub fn defense_area(&self) -> &Polygon {
        &self.defense_area
    }

    /// Where a ray from `from` along `direction` crosses the goal mouth, if it
    /// heads towards this goal and passes between the posts.
    pub fn shot_target(&self, from: Vector2, direction: Vector2) -> Option<Vector2> {
        if direction.x * self.side <= 0.0 {
            return None;
        }
        let hit = find_intersection(from, direction, self.center, Vector2::y())?;
        let half_goal = (self.posts[1].y - self.posts[0].y) / 2.0;
        (hit.y.abs() <= half_goal).then_some(hit)
    }
}
