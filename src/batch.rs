//! Runs [Bsdf] queries over many independent lanes at once.
//!
//! Every lane carries its own `active` flag. Lanes never influence each other, so the result of
//! an active lane is the same whether it is evaluated alone or as part of a batch, and inactive
//! lanes produce the inert result of the underlying [Bsdf] call.
//!
//! With the `parallel` feature the `par_*` functions split the lanes across the rayon thread
//! pool.
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{Bsdf, BsdfContext, BsdfSample, RgbD, SurfaceInteraction, Vec2d, Vec3d};

/// Input of a single lane for [`sample_lanes`]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SampleLane {
    pub si: SurfaceInteraction,
    pub sample1: f64,
    pub sample2: Vec2d,
    pub active: bool,
}

/// Input of a single lane for [`eval_lanes`], [`pdf_lanes`] and [`eval_pdf_lanes`]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct QueryLane {
    pub si: SurfaceInteraction,
    pub wo: Vec3d,
    pub active: bool,
}

pub fn sample_lanes<B: Bsdf + ?Sized>(
    bsdf: &B,
    ctx: &BsdfContext,
    lanes: &[SampleLane],
) -> Vec<(BsdfSample, RgbD)> {
    lanes
        .iter()
        .map(|lane| bsdf.sample(ctx, &lane.si, lane.sample1, lane.sample2, lane.active))
        .collect()
}

pub fn eval_lanes<B: Bsdf + ?Sized>(bsdf: &B, ctx: &BsdfContext, lanes: &[QueryLane]) -> Vec<RgbD> {
    lanes
        .iter()
        .map(|lane| bsdf.eval(ctx, &lane.si, lane.wo, lane.active))
        .collect()
}

pub fn pdf_lanes<B: Bsdf + ?Sized>(bsdf: &B, ctx: &BsdfContext, lanes: &[QueryLane]) -> Vec<f64> {
    lanes
        .iter()
        .map(|lane| bsdf.pdf(ctx, &lane.si, lane.wo, lane.active))
        .collect()
}

pub fn eval_pdf_lanes<B: Bsdf + ?Sized>(
    bsdf: &B,
    ctx: &BsdfContext,
    lanes: &[QueryLane],
) -> Vec<(RgbD, f64)> {
    lanes
        .iter()
        .map(|lane| bsdf.eval_pdf(ctx, &lane.si, lane.wo, lane.active))
        .collect()
}

#[cfg(feature = "parallel")]
pub fn par_sample_lanes<B: Bsdf + ?Sized>(
    bsdf: &B,
    ctx: &BsdfContext,
    lanes: &[SampleLane],
) -> Vec<(BsdfSample, RgbD)> {
    lanes
        .par_iter()
        .map(|lane| bsdf.sample(ctx, &lane.si, lane.sample1, lane.sample2, lane.active))
        .collect()
}

#[cfg(feature = "parallel")]
pub fn par_eval_lanes<B: Bsdf + ?Sized>(
    bsdf: &B,
    ctx: &BsdfContext,
    lanes: &[QueryLane],
) -> Vec<RgbD> {
    lanes
        .par_iter()
        .map(|lane| bsdf.eval(ctx, &lane.si, lane.wo, lane.active))
        .collect()
}

#[cfg(feature = "parallel")]
pub fn par_pdf_lanes<B: Bsdf + ?Sized>(
    bsdf: &B,
    ctx: &BsdfContext,
    lanes: &[QueryLane],
) -> Vec<f64> {
    lanes
        .par_iter()
        .map(|lane| bsdf.pdf(ctx, &lane.si, lane.wo, lane.active))
        .collect()
}

#[cfg(feature = "parallel")]
pub fn par_eval_pdf_lanes<B: Bsdf + ?Sized>(
    bsdf: &B,
    ctx: &BsdfContext,
    lanes: &[QueryLane],
) -> Vec<(RgbD, f64)> {
    lanes
        .par_iter()
        .map(|lane| bsdf.eval_pdf(ctx, &lane.si, lane.wo, lane.active))
        .collect()
}
