//! Spatially varying colors that parameterize a [`crate::Bsdf`]
use std::{fmt, sync::Arc};

use crate::{
    params::{ParamFlags, ParamValue, TraversalCallback},
    RgbD, SurfaceInteraction,
};

/// A color that may vary over a surface.
///
/// Textures are shared between the materials that reference them and the parameter traversal
/// machinery, therefore they are immutable and must be safe to evaluate from many threads. A
/// parameter is changed by building a new texture with [`Texture::with_parameter`].
pub trait Texture: fmt::Debug + fmt::Display + Send + Sync {
    /// Evaluates the texture at the surface interaction. Implementations may skip work when
    /// `active` is false; callers mask the result.
    fn eval(&self, si: &SurfaceInteraction, active: bool) -> RgbD;

    /// The average color over the whole texture
    fn mean(&self) -> RgbD;

    /// Returns true if the value depends on the surface position
    fn is_spatially_varying(&self) -> bool {
        false
    }

    /// Reports the parameters of this texture
    fn traverse(&self, _callback: &mut dyn TraversalCallback) {}

    /// Returns a copy of this texture with the parameter `name` set to `value`, or `None` if
    /// there is no such parameter or `value` has the wrong kind.
    fn with_parameter(&self, _name: &str, _value: ParamValue) -> Option<SharedTexture> {
        None
    }
}

/// Atomic reference counted [`Texture`]
pub type SharedTexture = Arc<dyn Texture>;

/// A texture that returns the same color everywhere
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ConstantTexture {
    pub value: RgbD,
}

impl ConstantTexture {
    #[must_use]
    pub const fn new(value: RgbD) -> Self {
        Self { value }
    }

    #[must_use]
    pub fn splat(value: f64) -> Self {
        Self {
            value: RgbD::splat(value),
        }
    }

    #[must_use]
    pub fn shared(value: RgbD) -> SharedTexture {
        Arc::new(Self::new(value))
    }
}

impl Texture for ConstantTexture {
    fn eval(&self, _si: &SurfaceInteraction, _active: bool) -> RgbD {
        self.value
    }

    fn mean(&self) -> RgbD {
        self.value
    }

    fn traverse(&self, callback: &mut dyn TraversalCallback) {
        callback.put_value("value", ParamValue::Rgb(self.value), ParamFlags::DIFFERENTIABLE);
    }

    fn with_parameter(&self, name: &str, value: ParamValue) -> Option<SharedTexture> {
        match (name, value) {
            ("value", ParamValue::Rgb(value)) => Some(Self::shared(value)),
            _ => None,
        }
    }
}

impl fmt::Display for ConstantTexture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ConstantTexture[value = [{}, {}, {}]]",
            self.value.x, self.value.y, self.value.z
        )
    }
}

/// Alternates between two colors in a checkerboard pattern over the uv coordinates
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Checkerboard {
    pub color0: RgbD,
    pub color1: RgbD,

    /// number of tiles per unit of uv space
    pub scale: f64,
}

impl Texture for Checkerboard {
    fn eval(&self, si: &SurfaceInteraction, _active: bool) -> RgbD {
        let u = (si.uv.x * self.scale).floor();
        let v = (si.uv.y * self.scale).floor();
        if (u + v).rem_euclid(2.0) < 0.5 {
            self.color0
        } else {
            self.color1
        }
    }

    fn mean(&self) -> RgbD {
        (self.color0 + self.color1) * 0.5
    }

    fn is_spatially_varying(&self) -> bool {
        true
    }

    fn traverse(&self, callback: &mut dyn TraversalCallback) {
        callback.put_value("color0", ParamValue::Rgb(self.color0), ParamFlags::DIFFERENTIABLE);
        callback.put_value("color1", ParamValue::Rgb(self.color1), ParamFlags::DIFFERENTIABLE);
        callback.put_value(
            "scale",
            ParamValue::Float(self.scale),
            ParamFlags::NON_DIFFERENTIABLE,
        );
    }

    fn with_parameter(&self, name: &str, value: ParamValue) -> Option<SharedTexture> {
        let mut texture = *self;
        match (name, value) {
            ("color0", ParamValue::Rgb(color)) => texture.color0 = color,
            ("color1", ParamValue::Rgb(color)) => texture.color1 = color,
            ("scale", ParamValue::Float(scale)) => texture.scale = scale,
            _ => return None,
        }
        Some(Arc::new(texture))
    }
}

impl fmt::Display for Checkerboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Checkerboard[")?;
        writeln!(
            f,
            "  color0 = [{}, {}, {}],",
            self.color0.x, self.color0.y, self.color0.z
        )?;
        writeln!(
            f,
            "  color1 = [{}, {}, {}],",
            self.color1.x, self.color1.y, self.color1.z
        )?;
        writeln!(f, "  scale = {}", self.scale)?;
        write!(f, "]")
    }
}
