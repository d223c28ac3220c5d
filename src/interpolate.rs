//! Interpolation between time-bounded samples.
//!
//! An [`Interpolator`] is a pure function from the samples on either side of a
//! query time to a synthesized sample at that time. Returning `None` makes the
//! slice fall back to the sample at or before the query time.

use std::f64::consts::{PI, TAU};

use crate::schema::{BeamUpdate, GateUpdate, LaserUpdate, PlatformUpdate, ProjectorUpdate, Vec3};

/// Produces a sample at `time` from the samples bracketing it.
///
/// `prev.time <= time < next.time` always holds when the store calls these.
pub trait Interpolator {
    /// Platform position, orientation and velocity.
    fn interpolate_platform(
        &self,
        _prev: &PlatformUpdate,
        _next: &PlatformUpdate,
        _time: f64,
    ) -> Option<PlatformUpdate> {
        None
    }

    /// Beam pointing.
    fn interpolate_beam(&self, _prev: &BeamUpdate, _next: &BeamUpdate, _time: f64) -> Option<BeamUpdate> {
        None
    }

    /// Gate extents.
    fn interpolate_gate(&self, _prev: &GateUpdate, _next: &GateUpdate, _time: f64) -> Option<GateUpdate> {
        None
    }

    /// Laser orientation.
    fn interpolate_laser(&self, _prev: &LaserUpdate, _next: &LaserUpdate, _time: f64) -> Option<LaserUpdate> {
        None
    }

    /// Projector field of view.
    fn interpolate_projector(
        &self,
        _prev: &ProjectorUpdate,
        _next: &ProjectorUpdate,
        _time: f64,
    ) -> Option<ProjectorUpdate> {
        None
    }
}

/// Straight-line interpolation; angles take the shortest arc.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearInterpolator;

impl LinearInterpolator {
    /// Creates a linear interpolator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn factor(prev_time: f64, next_time: f64, time: f64) -> f64 {
    let span = next_time - prev_time;
    if span <= 0.0 {
        0.0
    } else {
        ((time - prev_time) / span).clamp(0.0, 1.0)
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Interpolates an angle in radians along the shorter way around the circle.
fn lerp_angle(a: f64, b: f64, t: f64) -> f64 {
    let mut delta = (b - a) % TAU;
    if delta > PI {
        delta -= TAU;
    } else if delta < -PI {
        delta += TAU;
    }
    a + delta * t
}

fn lerp_vec(a: Vec3, b: Vec3, t: f64) -> Vec3 {
    Vec3::new(lerp(a.x, b.x, t), lerp(a.y, b.y, t), lerp(a.z, b.z, t))
}

fn lerp_angles(a: Vec3, b: Vec3, t: f64) -> Vec3 {
    Vec3::new(
        lerp_angle(a.x, b.x, t),
        lerp_angle(a.y, b.y, t),
        lerp_angle(a.z, b.z, t),
    )
}

fn lerp_opt(a: Option<Vec3>, b: Option<Vec3>, t: f64, f: fn(Vec3, Vec3, f64) -> Vec3) -> Option<Vec3> {
    match (a, b) {
        (Some(a), Some(b)) => Some(f(a, b, t)),
        (a, _) => a,
    }
}

impl Interpolator for LinearInterpolator {
    fn interpolate_platform(
        &self,
        prev: &PlatformUpdate,
        next: &PlatformUpdate,
        time: f64,
    ) -> Option<PlatformUpdate> {
        let t = factor(prev.time, next.time, time);
        Some(PlatformUpdate {
            time,
            position: lerp_opt(prev.position, next.position, t, lerp_vec),
            orientation: lerp_opt(prev.orientation, next.orientation, t, lerp_angles),
            velocity: lerp_opt(prev.velocity, next.velocity, t, lerp_vec),
        })
    }

    fn interpolate_beam(&self, prev: &BeamUpdate, next: &BeamUpdate, time: f64) -> Option<BeamUpdate> {
        let t = factor(prev.time, next.time, time);
        Some(BeamUpdate {
            time,
            azimuth: lerp_angle(prev.azimuth, next.azimuth, t),
            elevation: lerp_angle(prev.elevation, next.elevation, t),
            range: lerp(prev.range, next.range, t),
        })
    }

    fn interpolate_gate(&self, prev: &GateUpdate, next: &GateUpdate, time: f64) -> Option<GateUpdate> {
        let t = factor(prev.time, next.time, time);
        let centroid = match (prev.centroid, next.centroid) {
            (Some(a), Some(b)) => Some(lerp(a, b, t)),
            (a, _) => a,
        };
        Some(GateUpdate {
            time,
            azimuth: lerp_angle(prev.azimuth, next.azimuth, t),
            elevation: lerp_angle(prev.elevation, next.elevation, t),
            width: lerp(prev.width, next.width, t),
            height: lerp(prev.height, next.height, t),
            min_range: lerp(prev.min_range, next.min_range, t),
            max_range: lerp(prev.max_range, next.max_range, t),
            centroid,
        })
    }

    fn interpolate_laser(&self, prev: &LaserUpdate, next: &LaserUpdate, time: f64) -> Option<LaserUpdate> {
        let t = factor(prev.time, next.time, time);
        Some(LaserUpdate {
            time,
            orientation: lerp_angles(prev.orientation, next.orientation, t),
        })
    }

    fn interpolate_projector(
        &self,
        prev: &ProjectorUpdate,
        next: &ProjectorUpdate,
        time: f64,
    ) -> Option<ProjectorUpdate> {
        let t = factor(prev.time, next.time, time);
        Some(ProjectorUpdate {
            time,
            fov: lerp(prev.fov, next.fov, t),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_platform_midpoint() {
        let prev = PlatformUpdate::at(0.0, Vec3::new(0.0, 0.0, 0.0));
        let next = PlatformUpdate::at(10.0, Vec3::new(10.0, 20.0, 30.0));
        let mid = LinearInterpolator
            .interpolate_platform(&prev, &next, 5.0)
            .unwrap();
        let pos = mid.position.unwrap();
        assert!(approx(mid.time, 5.0));
        assert!(approx(pos.x, 5.0));
        assert!(approx(pos.y, 10.0));
        assert!(approx(pos.z, 15.0));
    }

    #[test]
    fn test_angle_takes_short_arc() {
        // 350 degrees to 10 degrees passes through 0, not 180
        let a = 350.0_f64.to_radians();
        let b = 10.0_f64.to_radians();
        let mid = lerp_angle(a, b, 0.5);
        let normalized = mid.rem_euclid(TAU);
        assert!(normalized < 1e-9 || (TAU - normalized) < 1e-9);
    }

    #[test]
    fn test_degenerate_span_returns_prev_values() {
        let prev = ProjectorUpdate { time: 2.0, fov: 0.5 };
        let next = ProjectorUpdate { time: 2.0, fov: 0.9 };
        let out = LinearInterpolator.interpolate_projector(&prev, &next, 2.0).unwrap();
        assert!(approx(out.fov, 0.5));
    }

    #[test]
    fn test_missing_position_keeps_prev() {
        let prev = PlatformUpdate {
            time: 0.0,
            ..PlatformUpdate::default()
        };
        let next = PlatformUpdate::at(1.0, Vec3::new(1.0, 1.0, 1.0));
        let out = LinearInterpolator.interpolate_platform(&prev, &next, 0.5).unwrap();
        assert!(out.position.is_none());
    }

    #[test]
    fn test_default_trait_methods_decline() {
        struct Nothing;
        impl Interpolator for Nothing {}
        let a = BeamUpdate::default();
        assert!(Nothing.interpolate_beam(&a, &a, 0.0).is_none());
    }
}
