use crate::Vector2;

/// Finds the intersection point of two lines.
///
/// Each line is given by a point and a direction. Returns `None` for parallel
/// (or coincident) lines.
pub fn find_intersection(
    point1: Vector2,
    direction1: Vector2,
    point2: Vector2,
    direction2: Vector2,
) -> Option<Vector2> {
    let det = cross(direction1, direction2);
    if det.abs() < 1e-10 {
        return None;
    }

    let t = cross(point2 - point1, direction2) / det;
    Some(point1 + t * direction1)
}

/// z-component of the 3D cross product of two planar vectors. Positive when `b`
/// is counter-clockwise from `a`.
pub fn cross(a: Vector2, b: Vector2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// `v` rotated by +90°.
pub fn left_normal(v: Vector2) -> Vector2 {
    Vector2::new(-v.y, v.x)
}
