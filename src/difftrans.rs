//! [Bsdf] for non-reflective surfaces that scatter all light diffusely to the other side
use std::fmt;

use crate::{
    frame::Frame,
    params::{ParamFlags, Traversable, TraversalCallback},
    texture::{ConstantTexture, SharedTexture},
    utils::{self, select},
    warp, Bsdf, BsdfContext, BsdfFlags, BsdfSample, RgbD, SurfaceInteraction, Vec2d, Vec3d,
};

/// A non-reflective [Bsdf]. Any light entering the surface loses its directionality and leaves
/// through the other side with a cosine-weighted distribution.
///
/// Combined with a reflection model it describes translucent substances with internal multiple
/// scattering, such as plant leaves or paper.
#[derive(Clone)]
pub struct DiffuseTransmitter {
    /// The fraction of light that is transmitted. Every component should be in \[0,1\] to
    /// preserve physical validity.
    transmittance: SharedTexture,
    flags: BsdfFlags,
    components: Vec<BsdfFlags>,
}

impl DiffuseTransmitter {
    pub const DEFAULT_TRANSMITTANCE: f64 = 0.5;

    #[must_use]
    pub fn new(transmittance: SharedTexture) -> Self {
        let flags = BsdfFlags::DIFFUSE_TRANSMISSION | BsdfFlags::FRONT_SIDE | BsdfFlags::BACK_SIDE;
        Self {
            transmittance,
            flags,
            components: vec![flags],
        }
    }

    /// A transmitter with the same transmittance everywhere
    #[must_use]
    pub fn constant(transmittance: RgbD) -> Self {
        Self::new(ConstantTexture::shared(transmittance))
    }

    #[must_use]
    pub fn transmittance(&self) -> &SharedTexture {
        &self.transmittance
    }

    fn enabled(ctx: &BsdfContext) -> bool {
        ctx.is_enabled(BsdfFlags::DIFFUSE_TRANSMISSION, 0)
    }

    /// cosine weighted density on whichever side `wo` lies
    fn cosine_pdf(wo: Vec3d) -> f64 {
        warp::square_to_cosine_hemisphere_pdf(wo.abs())
    }
}

impl Default for DiffuseTransmitter {
    fn default() -> Self {
        Self::constant(RgbD::splat(Self::DEFAULT_TRANSMITTANCE))
    }
}

impl Bsdf for DiffuseTransmitter {
    fn sample(
        &self,
        ctx: &BsdfContext,
        si: &SurfaceInteraction,
        _sample1: f64,
        sample2: Vec2d,
        active: bool,
    ) -> (BsdfSample, RgbD) {
        if !Self::enabled(ctx) || !active {
            return (BsdfSample::zeroed(), RgbD::ZERO);
        }

        let cos_theta_i = Frame::cos_theta(si.wi);
        let mut wo = warp::square_to_cosine_hemisphere(sample2);
        // light arriving on the front side leaves through the back side
        if cos_theta_i > 0.0 {
            wo.z = -wo.z;
        }

        let pdf = Self::cosine_pdf(wo);
        let sample = BsdfSample {
            wo,
            pdf,
            eta: 1.0,
            sampled_type: BsdfFlags::DIFFUSE_TRANSMISSION,
            sampled_component: 0,
        };

        // f * |cos theta_o| / pdf, the cosine cancels against the cosine weighted density
        let value = self.transmittance.eval(si, active);
        (sample, select(pdf > 0.0, value, RgbD::ZERO))
    }

    fn eval(&self, ctx: &BsdfContext, si: &SurfaceInteraction, wo: Vec3d, active: bool) -> RgbD {
        let active = active && utils::opposite_hemispheres(si.wi, wo);
        if !active || !Self::enabled(ctx) {
            return RgbD::ZERO;
        }

        self.transmittance.eval(si, active) * Self::cosine_pdf(wo)
    }

    fn pdf(&self, ctx: &BsdfContext, si: &SurfaceInteraction, wo: Vec3d, active: bool) -> f64 {
        let active = active && utils::opposite_hemispheres(si.wi, wo);
        if !active || !Self::enabled(ctx) {
            return 0.0;
        }

        Self::cosine_pdf(wo)
    }

    fn eval_pdf(
        &self,
        ctx: &BsdfContext,
        si: &SurfaceInteraction,
        wo: Vec3d,
        active: bool,
    ) -> (RgbD, f64) {
        let active = active && utils::opposite_hemispheres(si.wi, wo);
        if !active || !Self::enabled(ctx) {
            return (RgbD::ZERO, 0.0);
        }

        let pdf = Self::cosine_pdf(wo);
        (self.transmittance.eval(si, active) * pdf, pdf)
    }

    fn eval_diffuse_reflectance(&self, si: &SurfaceInteraction, active: bool) -> RgbD {
        select(active, self.transmittance.eval(si, active), RgbD::ZERO)
    }

    fn flags(&self) -> BsdfFlags {
        self.flags
    }

    fn component_count(&self) -> usize {
        self.components.len()
    }

    fn component_flags(&self, index: usize) -> Option<BsdfFlags> {
        self.components.get(index).copied()
    }
}

impl Traversable for DiffuseTransmitter {
    fn traverse(&mut self, callback: &mut dyn TraversalCallback) {
        callback.put_object(
            "transmittance",
            &mut self.transmittance,
            ParamFlags::DIFFERENTIABLE,
        );
    }
}

impl fmt::Display for DiffuseTransmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DiffuseTransmitter[")?;
        writeln!(
            f,
            "  transmittance = {}",
            utils::indent(&self.transmittance.to_string(), 2)
        )?;
        write!(f, "]")
    }
}

impl fmt::Debug for DiffuseTransmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
