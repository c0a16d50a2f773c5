pub trait ApproxEqual: Copy {
    fn equals_approx(self, other: Self, eps: Self, eps_rel: Self) -> bool;
    fn equals_approx_abs(self, other: Self, eps: Self) -> bool;
}

macro_rules! assert_eq_approx {
    ($lhs:expr, $rhs:expr, $eps_abs:expr, $eps_rel:expr) => {
        assert!(
            $crate::test_utils::ApproxEqual::equals_approx($lhs, $rhs, $eps_abs, $eps_rel),
            r#"assert_eq_approx failed:
    {}: {:?}
    {}: {:?}
    {} (maximum absolute error): {:?}
    {} (maximum relative error): {:?}"#,
            stringify!($lhs),
            $lhs,
            stringify!($rhs),
            $rhs,
            stringify!($eps_abs),
            $eps_abs,
            stringify!($eps_rel),
            $eps_rel,
        );
    };

    ($lhs:expr, $rhs:expr, $eps_abs: expr, $eps_rel:expr, $($arg:tt)+) => {
        assert!($crate::test_utils::ApproxEqual::equals_approx($lhs, $rhs, $eps_abs, $eps_rel), $($arg)*);
    }
}

macro_rules! assert_eq_approx_abs {
    ($lhs:expr, $rhs:expr, $eps_abs:expr) => {
        assert!(
            $crate::test_utils::ApproxEqual::equals_approx_abs($lhs, $rhs, $eps_abs),
            r#"assert_eq_approx_abs failed:
    {}: {:?}
    {}: {:?}
    {} (maximum absolute error): {:?}"#,
            stringify!($lhs),
            $lhs,
            stringify!($rhs),
            $rhs,
            stringify!($eps_abs),
            $eps_abs,
        )
    };

    ($lhs:expr, $rhs:expr, $eps_abs:expr, $($arg:tt)+) => {
        assert!($crate::test_utils::ApproxEqual::equals_approx_abs($lhs, $rhs, $eps_abs),
        $($arg)*);
    };
}

macro_rules! assert_in_range {
    ($value:expr, $lower:expr, $upper:expr) => {
        assert!(
            $lower <= $value && $value <= $upper,
            r#"assert_in_range failed:
    {} (value): {:?}
    {} (lower bound): {:?}
    {} (upper bound): {:?}"#,
            stringify!($value),
            $value,
            stringify!($lower),
            $lower,
            stringify!($upper),
            $upper
        )
    };
}

impl ApproxEqual for f64 {
    fn equals_approx(self, other: Self, eps: Self, eps_rel: Self) -> bool {
        let diff = (self - other).abs();
        #[allow(clippy::float_cmp)]
        if self == other || diff <= eps {
            true
        } else {
            diff <= self.abs().max(other.abs()) * eps_rel
        }
    }

    fn equals_approx_abs(self, other: Self, eps: Self) -> bool {
        #[allow(clippy::float_cmp)]
        if self == other {
            true
        } else {
            (self - other).abs() <= eps
        }
    }
}

impl ApproxEqual for Vec3d {
    fn equals_approx(self, other: Self, eps_abs: Self, eps_rel: Self) -> bool {
        self.x.equals_approx(other.x, eps_abs.x, eps_rel.x)
            && self.y.equals_approx(other.y, eps_abs.y, eps_rel.y)
            && self.z.equals_approx(other.z, eps_abs.z, eps_rel.z)
    }

    fn equals_approx_abs(self, other: Self, eps: Self) -> bool {
        self.x.equals_approx_abs(other.x, eps.x)
            && self.y.equals_approx_abs(other.y, eps.y)
            && self.z.equals_approx_abs(other.z, eps.z)
    }
}

use std::f64::consts;

pub(crate) use assert_eq_approx_abs;
pub(crate) use assert_in_range;

use crate::{Bsdf, BsdfContext, RgbD, SurfaceInteraction, Vec2d, Vec3d};

pub trait FloatExt {
    fn sq(self) -> Self;
}

impl FloatExt for f64 {
    fn sq(self) -> Self {
        self * self
    }
}

pub trait VecExt {
    type Scalar;
    #[must_use]
    fn luminance(self) -> Self::Scalar;
    #[must_use]
    fn sq(self) -> Self;
}

impl VecExt for RgbD {
    type Scalar = f64;

    fn sq(self) -> Self {
        self * self
    }

    /// Returns the perceived brightness of the color
    fn luminance(self) -> Self::Scalar {
        let lfac = Self::new(0.2126, 0.7152, 0.0722);
        self.dot(lfac)
    }
}

pub trait SamplerExt {
    fn vec2d(&mut self) -> Vec2d;
}

impl SamplerExt for fastrand::Rng {
    fn vec2d(&mut self) -> Vec2d {
        Vec2d::new(self.f64(), self.f64())
    }
}

/** sample a direction with density 1 / 4pi */
pub fn spherical_sample(rd: &mut fastrand::Rng) -> Vec3d {
    let u = rd.f64();
    let v = rd.f64();
    #[allow(clippy::suboptimal_flops)]
    let cos_theta = 2.0 * u - 1.0;
    #[allow(clippy::suboptimal_flops)]
    let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();
    let phi = v * 2.0 * consts::PI;
    let (sin_phi, cos_phi) = phi.sin_cos();
    Vec3d::new(sin_theta * sin_phi, sin_theta * cos_phi, cos_theta)
}

/// The sampled weights must average to the albedo. Since [`Bsdf::sample`] returns
/// `f * |cos theta_o| / pdf`, the estimator is a plain average.
#[allow(clippy::cast_lossless)]
pub fn test_energy_conservation<T: Bsdf>(material: &T, allowed_energy_loss: f64) {
    let ctx = BsdfContext::default();
    let mut rd = fastrand::Rng::with_seed(0);
    let runs = 100;
    let num_samples = 10_000;
    for _ in 0..runs {
        let si = SurfaceInteraction::with_local_wi(spherical_sample(&mut rd));
        let mut sum = RgbD::ZERO;
        let mut sum2 = RgbD::ZERO;
        for _ in 0..num_samples {
            let (bs, weight) = material.sample(&ctx, &si, rd.f64(), rd.vec2d(), true);
            if bs.pdf > 0.0 {
                sum += weight;
                sum2 += weight.sq();
            }
        }
        sum /= num_samples as f64;
        sum2 /= num_samples as f64;

        let variance =
            (sum2 - sum.sq()).luminance() * num_samples as f64 / (num_samples - 1) as f64;
        let std_error = (variance.abs() / num_samples as f64).sqrt();
        let confidence = (4.0 * std_error).max(1e-3);

        for channel in sum.to_array() {
            assert_in_range!(
                channel,
                1.0 - confidence - allowed_energy_loss,
                1.0 + confidence
            );
        }
    }
}

pub fn test_bsdf_sample_eval<T: Bsdf>(material: &T) {
    let ctx = BsdfContext::default();
    let mut rd = fastrand::Rng::with_seed(1);
    let runs = 10000;
    for _ in 0..runs {
        let si = SurfaceInteraction::with_local_wi(spherical_sample(&mut rd));
        let (bs, weight) = material.sample(&ctx, &si, rd.f64(), rd.vec2d(), true);
        let (c_value, c_pdf) = material.eval_pdf(&ctx, &si, bs.wo, true);
        if bs.pdf == 0.0 {
            assert_eq!(weight, RgbD::ZERO);
            continue;
        }
        assert!(
            c_pdf > 0.0,
            r#"
    PDFs must be greater than 0.
    pdf: {},
    c_pdf: {c_pdf},
    wi: {:?},
    wo: {:?}"#,
            bs.pdf,
            si.wi,
            bs.wo
        );
        assert_eq_approx!(
            bs.pdf,
            c_pdf,
            1e-9,
            1e-9,
            r#"
    PDFs must be equal for sample and pdf,
    pdf: {},
    c_pdf: {c_pdf},
    wi: {:?},
    wo: {:?}"#,
            bs.pdf,
            si.wi,
            bs.wo
        );
        assert_eq_approx!(weight, c_value / c_pdf, RgbD::splat(1e-6), RgbD::splat(1e-6));

        assert!(weight.min_element() >= 0.0);
    }
}

/// Swapping the directions must not change the BSDF. The cosine that [`Bsdf::eval`] includes is
/// divided out first.
pub fn test_bsdf_reciprocity<T: Bsdf>(material: &T) {
    let ctx = BsdfContext::default();
    let mut rd = fastrand::Rng::with_seed(2);
    let runs = 10000;
    for _ in 0..runs {
        let wi = spherical_sample(&mut rd);
        let wo = spherical_sample(&mut rd);

        let forward = material.eval(&ctx, &SurfaceInteraction::with_local_wi(wi), wo, true);
        let backward = material.eval(&ctx, &SurfaceInteraction::with_local_wi(wo), wi, true);

        assert!(forward.min_element() >= 0.0, "the bsdf should always be positive");
        assert!(backward.min_element() >= 0.0, "the bsdf should always be positive");

        if wi.z == 0.0 || wo.z == 0.0 {
            continue;
        }
        assert_eq_approx!(
            forward / wo.z.abs(),
            backward / wi.z.abs(),
            RgbD::splat(1e-9),
            RgbD::splat(1e-9)
        );
    }
}

/// Monte Carlo check that the density integrates to one over the sphere. Directions are drawn
/// from a mixture of uniform sphere sampling and the material itself, which keeps the estimator
/// bounded.
pub fn test_integrate_pdf<T: Bsdf>(material: &T) {
    const DOMAIN: f64 = 4.0 * std::f64::consts::PI;

    let ctx = BsdfContext::default();
    let mut rd = fastrand::Rng::with_seed(3);
    let runs = 20;
    let num_samples = 100_000;
    for i in 0..runs {
        let si = SurfaceInteraction::with_local_wi(spherical_sample(&mut rd));
        let spheric_pdf = 1.0 / DOMAIN;
        let mut sum = 0.0;
        let mut sum_of_squared = 0.0;
        for _ in 0..num_samples {
            let pdf_bsdf = if rd.bool() {
                material.sample(&ctx, &si, rd.f64(), rd.vec2d(), true).0.pdf
            } else {
                let wo = spherical_sample(&mut rd);
                material.pdf(&ctx, &si, wo, true)
            };
            #[allow(clippy::suboptimal_flops)]
            let value = 1.0 / (0.5 * spheric_pdf + 0.5 * pdf_bsdf);
            sum += value;
            sum_of_squared += value.sq();
        }
        sum /= DOMAIN * num_samples as f64;
        sum_of_squared /= DOMAIN.sq() * num_samples as f64;
        let variance_unscaled = sum_of_squared - sum.sq();

        let sample_standard_deviation =
            ((num_samples as f64) / (num_samples - 1) as f64 * variance_unscaled).sqrt();
        let standard_error = sample_standard_deviation / (num_samples as f64).sqrt();

        let confidence_thres = (4.0 * standard_error).max(1e-3);
        assert_eq_approx_abs!(
            sum,
            1.0,
            confidence_thres,
            r#"
    expected the monte carlo test to approach 1.
    But it approached {sum} after {num_samples} Samples with a standard error of {standard_error}.
    wi: {:?}
    i: {i}"#,
            si.wi
        );
    }
}
