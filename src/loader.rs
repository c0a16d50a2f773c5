//! Builds materials from scene description fragments.
//!
//! A material is a JSON object with a `"type"` field, the remaining fields are its parameters:
//!
//! ```json
//! {
//!     "type": "difftrans",
//!     "transmittance": { "type": "rgb", "value": [0.2, 0.25, 0.7] }
//! }
//! ```
//!
//! Colors may be given as a single number, an array of three numbers or a texture object.
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde_json::Value;

use crate::{
    difftrans::DiffuseTransmitter,
    texture::{Checkerboard, ConstantTexture, SharedTexture},
    Bsdf, RgbD,
};

/// Loads any supported [Bsdf] and dispatches on its `"type"` field
///
/// # Errors
/// If the type is unknown or one of the parameters is malformed
pub fn load_bsdf(value: &Value) -> Result<Box<dyn Bsdf>> {
    let ty = get_str_field(value, "bsdf", "type")?;
    let bsdf: Box<dyn Bsdf> = match ty {
        "difftrans" => Box::new(DiffuseTransmitter::from_json(value)?),
        _ => bail!("bsdf: unknown type '{ty}'"),
    };
    log::debug!("loaded bsdf {bsdf}");
    Ok(bsdf)
}

impl DiffuseTransmitter {
    /// Builds a transmitter from its parameters. A missing `transmittance` defaults to
    /// [`DiffuseTransmitter::DEFAULT_TRANSMITTANCE`].
    ///
    /// # Errors
    /// If `transmittance` is malformed
    pub fn from_json(value: &Value) -> Result<Self> {
        warn_unused_keys(value, "difftrans", &["type", "transmittance"]);
        let transmittance = match value.get("transmittance") {
            Some(transmittance) => load_texture(transmittance, "difftrans.transmittance")?,
            None => ConstantTexture::shared(RgbD::splat(Self::DEFAULT_TRANSMITTANCE)),
        };
        Ok(Self::new(transmittance))
    }
}

/// Loads a color parameter. `env` names the parameter in error messages.
///
/// # Errors
/// If the value is neither a number, an array of three numbers nor a known texture
pub fn load_texture(value: &Value, env: &str) -> Result<SharedTexture> {
    match value {
        Value::Number(_) | Value::Array(_) => Ok(ConstantTexture::shared(parse_color(value, env)?)),
        Value::Object(_) => {
            let ty = get_str_field(value, env, "type")?;
            match ty {
                "rgb" => {
                    warn_unused_keys(value, env, &["type", "value"]);
                    let color = value
                        .get("value")
                        .with_context(|| format!("{env}: no 'value' field"))?;
                    Ok(ConstantTexture::shared(parse_color(color, env)?))
                }
                "checkerboard" => {
                    warn_unused_keys(value, env, &["type", "color0", "color1", "scale"]);
                    let color0 = get_color_field_or(value, env, "color0", RgbD::splat(0.4))?;
                    let color1 = get_color_field_or(value, env, "color1", RgbD::splat(0.2))?;
                    let scale = get_float_field_or(value, env, "scale", 1.0)?;
                    Ok(Arc::new(Checkerboard {
                        color0,
                        color1,
                        scale,
                    }))
                }
                _ => bail!("{env}: unknown texture type '{ty}'"),
            }
        }
        _ => bail!("{env}: should be a number, an array of 3 numbers or a texture"),
    }
}

fn parse_color(value: &Value, env: &str) -> Result<RgbD> {
    if let Some(v) = value.as_f64() {
        return Ok(RgbD::splat(v));
    }
    let error_info = format!("{env}: should be a number or an array with 3 numbers");
    let arr = value.as_array().context(error_info.clone())?;
    if arr.len() != 3 {
        bail!(error_info);
    }
    let mut color = [0.0; 3];
    for (c, v) in color.iter_mut().zip(arr) {
        *c = v.as_f64().context(error_info.clone())?;
    }
    Ok(RgbD::from_array(color))
}

fn get_str_field<'a>(value: &'a Value, env: &str, field: &str) -> Result<&'a str> {
    let field_value = value
        .get(field)
        .with_context(|| format!("{env}: no '{field}' field"))?;
    field_value
        .as_str()
        .with_context(|| format!("{env}: '{field}' should be a string"))
}

fn get_float_field_or(value: &Value, env: &str, field: &str, default: f64) -> Result<f64> {
    value.get(field).map_or(Ok(default), |v| {
        v.as_f64()
            .with_context(|| format!("{env}: '{field}' should be a number"))
    })
}

fn get_color_field_or(value: &Value, env: &str, field: &str, default: RgbD) -> Result<RgbD> {
    value
        .get(field)
        .map_or(Ok(default), |v| parse_color(v, &format!("{env}.{field}")))
}

fn warn_unused_keys(value: &Value, env: &str, known: &[&str]) {
    if let Some(object) = value.as_object() {
        for key in object.keys().filter(|k| !known.contains(&k.as_str())) {
            log::warn!("{env} - unused key '{key}'");
        }
    }
}
