//! Reynolds-style steering behaviours.
//!
//! Each function returns a steering force (desired velocity minus current
//! velocity) already clamped to `max_force`.

use glam::Vec2;

/// Steer toward `target` at full `max_speed`
pub fn seek(position: Vec2, velocity: Vec2, target: Vec2, max_speed: f32, max_force: f32) -> Vec2 {
    let desired = (target - position).normalize_or_zero() * max_speed;
    (desired - velocity).clamp_length_max(max_force)
}

/// Steer away from `threat` at full `max_speed`, only while it is closer
/// than `radius`
pub fn flee(
    position: Vec2,
    velocity: Vec2,
    threat: Vec2,
    radius: f32,
    max_speed: f32,
    max_force: f32,
) -> Vec2 {
    let away = position - threat;
    if away.length() >= radius {
        return Vec2::ZERO;
    }
    let desired = away.normalize_or_zero() * max_speed;
    (desired - velocity).clamp_length_max(max_force)
}

/// Steer toward `target`, slowing linearly inside `slowing_radius`
pub fn arrive(
    position: Vec2,
    velocity: Vec2,
    target: Vec2,
    slowing_radius: f32,
    max_speed: f32,
    max_force: f32,
) -> Vec2 {
    let offset = target - position;
    let distance = offset.length();
    let speed = if slowing_radius > 0.0 {
        max_speed * (distance / slowing_radius).min(1.0)
    } else {
        max_speed
    };
    let desired = offset.normalize_or_zero() * speed;
    (desired - velocity).clamp_length_max(max_force)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seek_points_at_target() {
        let force = seek(Vec2::ZERO, Vec2::ZERO, Vec2::new(10.0, 0.0), 2.0, 5.0);
        assert_eq!(force, Vec2::new(2.0, 0.0));
        // Clamped
        let force = seek(Vec2::ZERO, Vec2::ZERO, Vec2::new(10.0, 0.0), 2.0, 0.5);
        assert!((force.length() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_flee_only_inside_radius() {
        let outside = flee(Vec2::ZERO, Vec2::ZERO, Vec2::new(50.0, 0.0), 20.0, 1.0, 1.0);
        assert_eq!(outside, Vec2::ZERO);
        let inside = flee(Vec2::ZERO, Vec2::ZERO, Vec2::new(5.0, 0.0), 20.0, 1.0, 1.0);
        assert!(inside.x < 0.0);
    }

    #[test]
    fn test_arrive_slows_near_target() {
        let far = arrive(Vec2::ZERO, Vec2::ZERO, Vec2::new(100.0, 0.0), 10.0, 2.0, 10.0);
        let near = arrive(Vec2::ZERO, Vec2::ZERO, Vec2::new(5.0, 0.0), 10.0, 2.0, 10.0);
        assert_eq!(far, Vec2::new(2.0, 0.0));
        assert_eq!(near, Vec2::new(1.0, 0.0));
        // At the target with no velocity there is nothing to do
        let here = arrive(Vec2::ONE, Vec2::ZERO, Vec2::ONE, 10.0, 2.0, 10.0);
        assert_eq!(here, Vec2::ZERO);
    }

    #[test]
    fn test_arrive_brakes_existing_velocity() {
        let force = arrive(Vec2::ZERO, Vec2::new(3.0, 0.0), Vec2::ZERO, 10.0, 2.0, 1.0);
        assert!((force - Vec2::new(-1.0, 0.0)).length() < 1e-6);
    }
}
