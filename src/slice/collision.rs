//! Circle hit tests between input/projectiles and targets

use glam::Vec2;

use super::state::Target;

/// Check if two circles touch or overlap
pub fn circles_overlap(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
    let reach = radius_a + radius_b;
    a.distance_squared(b) <= reach * reach
}

/// Indices of every unsliced target within `radius` of `point`, in world order
pub fn targets_within(targets: &[Target], point: Vec2, radius: f32) -> Vec<usize> {
    targets
        .iter()
        .enumerate()
        .filter(|(_, t)| !t.sliced && circles_overlap(t.pos, t.radius, point, radius))
        .map(|(i, _)| i)
        .collect()
}

/// First unsliced target a projectile at `point` hits
pub fn first_hit(targets: &[Target], point: Vec2, hit_radius: f32) -> Option<usize> {
    targets
        .iter()
        .position(|t| !t.sliced && circles_overlap(t.pos, t.radius, point, hit_radius))
}
