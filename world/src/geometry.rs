use glam::DVec2;

/// Distance along a ray to its first intersection with a circle.
///
/// `direction` must be normalised. Only intersections strictly ahead of the
/// origin are reported.
pub(crate) fn ray_circle(origin: DVec2, direction: DVec2, center: DVec2, radius: f64) -> Option<f64> {
    let offset = origin - center;
    let b = offset.dot(direction);
    let c = offset.length_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    let root = discriminant.sqrt();
    [-b - root, -b + root]
        .into_iter()
        .find(|distance| *distance > 0.0)
}

/// Whether two circles overlap.
pub(crate) fn circles_overlap(a: DVec2, a_radius: f64, b: DVec2, b_radius: f64) -> bool {
    let reach = a_radius + b_radius;
    a.distance_squared(b) < reach * reach
}
