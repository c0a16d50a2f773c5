//! Mappings from the unit square to other domains, used for importance sampling.
use std::f64::consts::{FRAC_1_PI, FRAC_PI_2, FRAC_PI_4};

use crate::{Vec2d, Vec3d};

/// Maps the unit square to the unit disk with Shirley's concentric mapping. The mapping
/// preserves area, so uniform samples stay uniform. The center of the square maps to the center
/// of the disk.
#[must_use]
pub fn square_to_uniform_disk_concentric(sample: Vec2d) -> Vec2d {
    let x = 2.0f64.mul_add(sample.x, -1.0);
    let y = 2.0f64.mul_add(sample.y, -1.0);

    let (r, phi) = if x == 0.0 && y == 0.0 {
        (0.0, 0.0)
    } else if x * x > y * y {
        (x, FRAC_PI_4 * (y / x))
    } else {
        (y, FRAC_PI_2 - FRAC_PI_4 * (x / y))
    };

    let (sin_phi, cos_phi) = phi.sin_cos();
    Vec2d::new(r * cos_phi, r * sin_phi)
}

/* pdf is cos(theta) / pi */
/// Samples the upper hemisphere (`z >= 0`) proportional to the cosine of the polar angle by
/// lifting a concentric disk sample onto the hemisphere.
#[must_use]
pub fn square_to_cosine_hemisphere(sample: Vec2d) -> Vec3d {
    let p = square_to_uniform_disk_concentric(sample);
    let z = (1.0 - p.length_squared()).max(0.0).sqrt();
    Vec3d::new(p.x, p.y, z)
}

/// Density of [`square_to_cosine_hemisphere`]. Zero below the surface.
#[must_use]
pub fn square_to_cosine_hemisphere_pdf(v: Vec3d) -> f64 {
    if v.z > 0.0 {
        v.z * FRAC_1_PI
    } else {
        0.0
    }
}
