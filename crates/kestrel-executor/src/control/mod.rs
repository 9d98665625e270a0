mod pid;
mod variable;

pub use pid::Pid;
pub use variable::Variable;

use kestrel_core::{Angle, Speeds, Vector2};

/// Express a world-frame velocity in the frame of a robot facing `heading`.
pub fn to_local_speeds(velocity: Vector2, heading: Angle, angular: f64) -> Speeds {
    let forward = heading.unit_vector();
    let left = Vector2::new(-forward.y, forward.x);
    Speeds {
        tangent: velocity.dot(&forward),
        normal: velocity.dot(&left),
        angular,
    }
}
