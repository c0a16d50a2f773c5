//! Orthonormal shading frames. The normal is the z-axis of the local space.
use crate::Vec3d;

/// An orthonormal basis with `n` as the local z-axis
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    pub s: Vec3d,
    pub t: Vec3d,
    pub n: Vec3d,
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            s: Vec3d::X,
            t: Vec3d::Y,
            n: Vec3d::Z,
        }
    }
}

impl Frame {
    /// Builds a frame around a normalized normal vector
    #[must_use]
    pub fn from_normal(n: Vec3d) -> Self {
        let (s, t) = n.any_orthonormal_pair();
        Self { s, t, n }
    }

    #[must_use]
    pub fn to_local(&self, v: Vec3d) -> Vec3d {
        Vec3d::new(v.dot(self.s), v.dot(self.t), v.dot(self.n))
    }

    #[must_use]
    pub fn to_world(&self, v: Vec3d) -> Vec3d {
        self.s * v.x + self.t * v.y + self.n * v.z
    }

    /// cosine of the angle between a local direction and the normal
    #[must_use]
    pub fn cos_theta(v: Vec3d) -> f64 {
        v.z
    }
}
