//! Random sampling helpers for placing agents in space.

use embryoid_data::Vec3;
use rand::Rng;
use std::f64::consts::TAU;

/// Uniformly distributed point on the unit sphere.
///
/// Uses the cylinder projection: `z` uniform in `[-1, 1]` and azimuth uniform in
/// `[0, 2π)` give a uniform density on the surface.
pub fn random_point_on_sphere<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let z: f64 = rng.gen_range(-1.0..=1.0);
    let phi: f64 = rng.gen_range(0.0..TAU);
    let ring = (1.0 - z * z).max(0.0).sqrt();
    Vec3::new(ring * phi.cos(), ring * phi.sin(), z)
}

/// Uniformly distributed point inside a ball of the given radius around `center`.
pub fn random_point_in_ball<R: Rng + ?Sized>(rng: &mut R, center: Vec3, radius: f64) -> Vec3 {
    let direction = random_point_on_sphere(rng);
    let u: f64 = rng.gen();
    center + direction.scale(radius * u.cbrt())
}
