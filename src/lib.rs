#![warn(clippy::pedantic)]
#![warn(clippy::perf)]
#![warn(clippy::nursery)]
#![warn(clippy::suboptimal_flops)]
#![deny(clippy::return_self_not_must_use)]
#![allow(clippy::similar_names)]
#![deny(clippy::semicolon_if_nothing_returned)]
#![deny(clippy::double_must_use)]
#![deny(clippy::use_self)]
#![deny(clippy::unreadable_literal)]
#![deny(clippy::explicit_iter_loop)]
// these are lints to enable later
#![allow(clippy::cast_lossless)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::module_name_repetitions)]

//! This crate implements a diffuse transmission [Bsdf] for pathtracing: a non-reflective
//! surface where any entering light loses its directionality and is scattered diffusely out of
//! the other side. Combined with a reflection model, it describes translucent materials with
//! internal multiple scattering, e.g. plant leaves.
//!
//! # Design Decisions
//!
//! [Bsdf]s are computed in a local space. That means, the surface is assumed to be the xy-plane
//! and the z-vector is assumed to be the normal. The [`SurfaceInteraction`] carries the shading
//! frame and the incoming direction `wi` already transformed into that space.
//!
//! Unlike many other libraries, [`Bsdf::eval`] includes the `|cos theta_o|` term, and
//! [`Bsdf::sample`] returns the BSDF value divided by the pdf. For the diffuse transmitter the
//! cosine cancels against the cosine-weighted sampling density, so the sampled weight is simply
//! the transmittance.
//!
//! Every query takes an `active` flag. Integrators that process many rays in lock step can
//! disable lanes; an inactive lane always produces zero values and [`BsdfSample::zeroed`]. The
//! [`batch`] module runs queries over slices of lanes, optionally in parallel.
//!
//! A [`BsdfContext`] selects the lobes the light transport strategy is interested in. If it does
//! not enable diffuse transmission every query returns the zero result.
//!
//! Lighting calculations are done in [f64]s. Material parameters are [`texture::Texture`]s
//! shared through [`std::sync::Arc`], so the same texture can be referenced by several
//! materials and by the [`params`] traversal used for differentiable rendering.
//!
//! `sample` functions are deterministic. You are responsible for generating [f64]s in the range
//! of `0.0..1.0`.
//!
//! This crate is built on [glam] for a simple but fast vector math library at the core.
//!
//! # References
//! * Eric Veach. *Robust monte carlo methods for light transport simulation.* PhD thesis, Stanford University, 1997.
//! * Peter Shirley and Kenneth Chiu. A low distortion map between disk and square. *Journal of Graphics Tools, 2(3):45–52,* 1997.
//! * Matt Pharr, Wenzel Jakob and Greg Humphreys. *Physically Based Rendering: From Theory to Implementation,* 3rd edition, 2016.

mod core;

pub use self::core::{
    Bsdf, BsdfContext, BsdfFlags, BsdfSample, RgbD, SurfaceInteraction, Vec2d, Vec3d,
};

#[cfg(test)]
pub(crate) mod test_utils;
pub(crate) mod utils;

pub mod batch;
pub mod difftrans;
pub mod frame;
pub mod loader;
pub mod params;
pub mod texture;
pub mod warp;
