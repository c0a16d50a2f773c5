use bitflags::bitflags;

use crate::{frame::Frame, params::Traversable};

/// used for colors
pub type RgbD = glam::f64::DVec3;

/// used for direction vectors and points
pub type Vec3d = glam::f64::DVec3;
/// used for uv coordinates and 2d samples
pub type Vec2d = glam::f64::DVec2;

bitflags! {
    /// Describes the lobes a [Bsdf] is made of. A [Bsdf] advertises these at construction time,
    /// so integrators can decide what to do with a surface without sampling it first.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct BsdfFlags: u32 {
        /// No interaction with light at all
        const NULL = 1 << 0;
        const DIFFUSE_REFLECTION = 1 << 1;
        const DIFFUSE_TRANSMISSION = 1 << 2;
        const GLOSSY_REFLECTION = 1 << 3;
        const GLOSSY_TRANSMISSION = 1 << 4;
        const DELTA_REFLECTION = 1 << 5;
        const DELTA_TRANSMISSION = 1 << 6;
        const ANISOTROPIC = 1 << 7;
        /// The parameters of the [Bsdf] depend on the surface position
        const SPATIALLY_VARYING = 1 << 8;
        /// Light transport and importance transport behave differently
        const NON_SYMMETRIC = 1 << 9;
        /// Light arriving on the side the normal points to is scattered
        const FRONT_SIDE = 1 << 10;
        /// Light arriving on the side opposite to the normal is scattered
        const BACK_SIDE = 1 << 11;
        const NEEDS_DIFFERENTIALS = 1 << 12;

        const REFLECTION = Self::DIFFUSE_REFLECTION.bits()
            | Self::GLOSSY_REFLECTION.bits()
            | Self::DELTA_REFLECTION.bits();
        const TRANSMISSION = Self::DIFFUSE_TRANSMISSION.bits()
            | Self::GLOSSY_TRANSMISSION.bits()
            | Self::DELTA_TRANSMISSION.bits()
            | Self::NULL.bits();
        const DIFFUSE = Self::DIFFUSE_REFLECTION.bits() | Self::DIFFUSE_TRANSMISSION.bits();
        const GLOSSY = Self::GLOSSY_REFLECTION.bits() | Self::GLOSSY_TRANSMISSION.bits();
        const SMOOTH = Self::DIFFUSE.bits() | Self::GLOSSY.bits();
        const DELTA = Self::NULL.bits()
            | Self::DELTA_REFLECTION.bits()
            | Self::DELTA_TRANSMISSION.bits();
        const ALL = Self::DIFFUSE.bits() | Self::GLOSSY.bits() | Self::DELTA.bits();
    }
}

/// Tells a [Bsdf] which of its lobes the caller's light transport strategy is interested in.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BsdfContext {
    /// Lobes that may be sampled or evaluated
    pub type_mask: BsdfFlags,

    /// The only component that may be sampled or evaluated. `None` enables all components.
    pub component: Option<u32>,
}

impl Default for BsdfContext {
    fn default() -> Self {
        Self {
            type_mask: BsdfFlags::ALL,
            component: None,
        }
    }
}

impl BsdfContext {
    /// A context restricted to the given lobes
    #[must_use]
    pub fn with_type_mask(type_mask: BsdfFlags) -> Self {
        Self {
            type_mask,
            ..Self::default()
        }
    }

    /// Returns true if the lobe `flags` of component `component` may be used.
    #[must_use]
    pub fn is_enabled(&self, flags: BsdfFlags, component: u32) -> bool {
        self.component.map_or(true, |c| c == component) && self.type_mask.intersects(flags)
    }
}

/// The local geometry at a point where a ray hit a surface
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SurfaceInteraction {
    /// position of the hit in world space
    pub p: Vec3d,

    /// surface parameterization at the hit
    pub uv: Vec2d,

    /// shading frame. The normal is the z-axis of the local space
    pub sh_frame: Frame,

    /// direction towards the origin of the ray, in local space
    pub wi: Vec3d,
}

impl SurfaceInteraction {
    /// Builds an interaction from a world space normal and a world space direction pointing back
    /// along the ray.
    #[must_use]
    pub fn new(p: Vec3d, uv: Vec2d, normal: Vec3d, wi_world: Vec3d) -> Self {
        let sh_frame = Frame::from_normal(normal);
        Self {
            p,
            uv,
            wi: sh_frame.to_local(wi_world),
            sh_frame,
        }
    }

    /// An interaction at the origin with the identity frame and the given local `wi`.
    #[must_use]
    pub fn with_local_wi(wi: Vec3d) -> Self {
        Self {
            p: Vec3d::ZERO,
            uv: Vec2d::ZERO,
            sh_frame: Frame::default(),
            wi,
        }
    }

    /// Transforms a local direction into world space
    #[must_use]
    pub fn to_world(&self, v: Vec3d) -> Vec3d {
        self.sh_frame.to_world(v)
    }

    /// Transforms a world space direction into the local shading frame
    #[must_use]
    pub fn to_local(&self, v: Vec3d) -> Vec3d {
        self.sh_frame.to_local(v)
    }
}

/// Contains the data that is returned by [`Bsdf::sample`]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BsdfSample {
    /// The direction to which light is scattered to, in local space
    pub wo: Vec3d,

    /// The probability density of choosing `wo`
    pub pdf: f64,

    /// Relative index of refraction along the sampled direction
    pub eta: f64,

    /// The lobe that was sampled
    pub sampled_type: BsdfFlags,

    /// Index of the component that was sampled
    pub sampled_component: u32,
}

impl BsdfSample {
    /// The inert sample. Returned for inactive lanes and disabled lobes.
    #[must_use]
    pub fn zeroed() -> Self {
        Self {
            wo: Vec3d::ZERO,
            pdf: 0.0,
            eta: 0.0,
            sampled_type: BsdfFlags::empty(),
            sampled_component: 0,
        }
    }
}

impl Default for BsdfSample {
    fn default() -> Self {
        Self::zeroed()
    }
}

/// Bidirectional Scattering Distribution Functions. A trait that describes the surface properties
/// of a material if you will.
///
/// All directions are given in the local shading frame of the [`SurfaceInteraction`]. Every
/// function takes an `active` flag. If it is false, the call must produce the same result as if
/// it had not been made: zero values, zero densities and [`BsdfSample::zeroed`].
///
/// Unlike in many renderers, the value returned by [`Bsdf::eval`] already contains the
/// `|cos theta_o|` foreshortening term.
pub trait Bsdf: Traversable + std::fmt::Display + Send + Sync {
    /// Importance samples an outgoing direction.
    ///
    /// # Arguments
    /// * `ctx` - Which lobes the caller is interested in
    /// * `si` - The surface interaction. `si.wi` is the incoming direction
    /// * `sample1` - A uniform sample used to select a lobe
    /// * `sample2` - A uniform 2d sample used to select a direction
    /// * `active` - Whether this lane computes anything at all
    ///
    /// # Return
    /// The sample and the BSDF value divided by the pdf (including the cosine term)
    fn sample(
        &self,
        ctx: &BsdfContext,
        si: &SurfaceInteraction,
        sample1: f64,
        sample2: Vec2d,
        active: bool,
    ) -> (BsdfSample, RgbD);

    /// Returns the value of the BSDF times `|cos theta_o|`
    fn eval(&self, ctx: &BsdfContext, si: &SurfaceInteraction, wo: Vec3d, active: bool) -> RgbD;

    /// Returns the probability density of [`Bsdf::sample`] choosing `wo`
    fn pdf(&self, ctx: &BsdfContext, si: &SurfaceInteraction, wo: Vec3d, active: bool) -> f64;

    /// Fused [`Bsdf::eval`] and [`Bsdf::pdf`]. Implementations that override this must return the
    /// same values as the separate calls.
    fn eval_pdf(
        &self,
        ctx: &BsdfContext,
        si: &SurfaceInteraction,
        wo: Vec3d,
        active: bool,
    ) -> (RgbD, f64) {
        (
            self.eval(ctx, si, wo, active),
            self.pdf(ctx, si, wo, active),
        )
    }

    /// A rough estimate of how much light the surface scatters. Used for heuristics such as
    /// russian roulette or denoiser albedo images, not for light transport.
    fn eval_diffuse_reflectance(&self, si: &SurfaceInteraction, active: bool) -> RgbD;

    /// The union of the flags of all components
    fn flags(&self) -> BsdfFlags;

    /// The number of components
    fn component_count(&self) -> usize;

    /// The flags of a single component
    fn component_flags(&self, index: usize) -> Option<BsdfFlags>;
}
