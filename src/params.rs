//! Exposes the parameters of a [`crate::Bsdf`] to external tools, e.g. gradient based
//! optimizers that fit material parameters to reference images.
//!
//! Objects register their parameters with a [`TraversalCallback`]. [`ParameterMap::collect`]
//! flattens them into dotted keys (`leaf.transmittance.value`). New values are staged on the map
//! with [`ParameterMap::set`] or [`ParameterMap::set_object`] and written back into the object
//! with [`ParameterMap::update`].
//!
//! ```ignore
//! let mut params = ParameterMap::collect("leaf", &mut bsdf);
//! params.set("leaf.transmittance.value", ParamValue::Rgb(RgbD::splat(0.8)))?;
//! params.update(&mut bsdf)?;
//! ```
use std::collections::BTreeMap;

use anyhow::{bail, Context};
use bitflags::bitflags;

use crate::{texture::SharedTexture, RgbD};

bitflags! {
    /// Describes how a parameter may be used
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct ParamFlags: u32 {
        /// Gradients may be propagated to this parameter
        const DIFFERENTIABLE = 1 << 0;
        const NON_DIFFERENTIABLE = 1 << 1;
        /// Changing the parameter introduces visibility discontinuities
        const DISCONTINUOUS = 1 << 2;
        /// The parameter is reported but can not be written back
        const READ_ONLY = 1 << 3;
    }
}

/// A plain parameter value reported by a texture
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ParamValue {
    Float(f64),
    Rgb(RgbD),
}

impl ParamValue {
    fn same_kind(self, other: Self) -> bool {
        matches!(
            (self, other),
            (Self::Float(_), Self::Float(_)) | (Self::Rgb(_), Self::Rgb(_))
        )
    }
}

/// Receives the parameters of an object during traversal
pub trait TraversalCallback {
    /// Registers a shared texture. The callback may replace the reference.
    fn put_object(&mut self, name: &str, object: &mut SharedTexture, flags: ParamFlags);

    /// Registers a plain value. Values reported by a texture are written back by rebuilding the
    /// texture, values reported directly by a [`Traversable`] are read only.
    fn put_value(&mut self, name: &str, value: ParamValue, flags: ParamFlags);
}

/// Implemented by everything that exposes parameters
pub trait Traversable {
    fn traverse(&mut self, callback: &mut dyn TraversalCallback);
}

#[derive(Debug, Clone, PartialEq)]
pub enum Parameter {
    /// A texture, identified by its description
    Object(String),
    Value(ParamValue),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterEntry {
    pub flags: ParamFlags,
    pub parameter: Parameter,
}

#[derive(Debug, Clone)]
enum Staged {
    Object(SharedTexture),
    Value(ParamValue),
}

/// A flattened, sorted view of all parameters reachable from an object
#[derive(Debug, Clone, Default)]
pub struct ParameterMap {
    prefix: String,
    entries: BTreeMap<String, ParameterEntry>,
    staged: BTreeMap<String, Staged>,
}

fn join_key(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_owned()
    } else {
        format!("{prefix}.{name}")
    }
}

struct Collector<'a> {
    prefix: String,
    /// added to every value, i.e. `READ_ONLY` unless the values belong to a writable texture
    value_flags: ParamFlags,
    entries: &'a mut BTreeMap<String, ParameterEntry>,
}

impl TraversalCallback for Collector<'_> {
    fn put_object(&mut self, name: &str, object: &mut SharedTexture, flags: ParamFlags) {
        let key = join_key(&self.prefix, name);
        self.entries.insert(
            key.clone(),
            ParameterEntry {
                flags,
                parameter: Parameter::Object(object.to_string()),
            },
        );
        let mut nested = Collector {
            prefix: key,
            value_flags: flags & ParamFlags::READ_ONLY,
            entries: &mut *self.entries,
        };
        object.traverse(&mut nested);
    }

    fn put_value(&mut self, name: &str, value: ParamValue, flags: ParamFlags) {
        self.entries.insert(
            join_key(&self.prefix, name),
            ParameterEntry {
                flags: flags | self.value_flags,
                parameter: Parameter::Value(value),
            },
        );
    }
}

struct Updater<'a> {
    prefix: &'a str,
    staged: &'a mut BTreeMap<String, Staged>,
    failed: Vec<String>,
}

impl TraversalCallback for Updater<'_> {
    fn put_object(&mut self, name: &str, object: &mut SharedTexture, _flags: ParamFlags) {
        let key = join_key(self.prefix, name);
        match self.staged.remove(&key) {
            Some(Staged::Object(texture)) => {
                log::debug!("updating '{key}': {object} -> {texture}");
                *object = texture;
            }
            Some(Staged::Value(_)) => self.failed.push(key.clone()),
            None => {}
        }

        // values of the texture, applied after a replacement of the texture itself
        let child_prefix = format!("{key}.");
        let children: Vec<String> = self
            .staged
            .range(child_prefix.clone()..)
            .take_while(|(child, _)| child.starts_with(&child_prefix))
            .map(|(child, _)| child.clone())
            .collect();
        for child in children {
            let rebuilt = match self.staged.remove(&child) {
                Some(Staged::Value(value)) => {
                    object.with_parameter(&child[child_prefix.len()..], value)
                }
                _ => None,
            };
            match rebuilt {
                Some(texture) => {
                    log::debug!("updating '{child}': {object} -> {texture}");
                    *object = texture;
                }
                None => self.failed.push(child),
            }
        }
    }

    fn put_value(&mut self, _name: &str, _value: ParamValue, _flags: ParamFlags) {}
}

impl ParameterMap {
    /// Collects the parameters of `object`. All keys are prefixed with `prefix` unless it is
    /// empty.
    pub fn collect<T: Traversable + ?Sized>(prefix: &str, object: &mut T) -> Self {
        let mut entries = BTreeMap::new();
        object.traverse(&mut Collector {
            prefix: prefix.to_owned(),
            value_flags: ParamFlags::READ_ONLY,
            entries: &mut entries,
        });
        log::debug!("collected {} parameters below '{prefix}'", entries.len());
        Self {
            prefix: prefix.to_owned(),
            entries,
            staged: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParameterEntry> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Keys of all writable parameters that gradients may be propagated to
    pub fn differentiable_keys(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, entry)| {
                entry.flags.contains(ParamFlags::DIFFERENTIABLE)
                    && !entry.flags.contains(ParamFlags::READ_ONLY)
            })
            .map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterEntry)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if there are staged changes that [`ParameterMap::update`] has not written
    /// back yet
    #[must_use]
    pub fn is_modified(&self) -> bool {
        !self.staged.is_empty()
    }

    fn writable_entry(&mut self, key: &str) -> anyhow::Result<&mut ParameterEntry> {
        let entry = self
            .entries
            .get_mut(key)
            .with_context(|| format!("there is no parameter named '{key}'"))?;
        if entry.flags.contains(ParamFlags::READ_ONLY) {
            bail!("parameter '{key}' is read only");
        }
        Ok(entry)
    }

    /// Stages a new value for the plain parameter `key`. [`ParameterMap::get`] reports the new
    /// value right away, the object is changed by [`ParameterMap::update`].
    ///
    /// # Errors
    /// If `key` is unknown, read only, refers to a texture or holds a different kind of value
    pub fn set(&mut self, key: &str, value: ParamValue) -> anyhow::Result<()> {
        let entry = self.writable_entry(key)?;
        match entry.parameter {
            Parameter::Value(current) if current.same_kind(value) => {}
            Parameter::Value(current) => {
                bail!("parameter '{key}' holds {current:?}, it can not be set to {value:?}")
            }
            Parameter::Object(_) => bail!("parameter '{key}' is a texture, use set_object"),
        }
        entry.parameter = Parameter::Value(value);
        self.staged.insert(key.to_owned(), Staged::Value(value));
        Ok(())
    }

    /// Stages a replacement for the texture registered under `key`
    ///
    /// # Errors
    /// If `key` is unknown, read only or refers to a plain value
    pub fn set_object(&mut self, key: &str, texture: SharedTexture) -> anyhow::Result<()> {
        let entry = self.writable_entry(key)?;
        if matches!(entry.parameter, Parameter::Value(_)) {
            bail!("parameter '{key}' is a plain value, use set");
        }
        entry.parameter = Parameter::Object(texture.to_string());
        self.staged.insert(key.to_owned(), Staged::Object(texture));
        Ok(())
    }

    /// Writes all staged changes back into `object` and collects its parameters again. `object`
    /// must be the object the map was collected from.
    ///
    /// # Errors
    /// If a staged change could not be applied. All other changes are applied regardless.
    pub fn update<T: Traversable + ?Sized>(&mut self, object: &mut T) -> anyhow::Result<()> {
        let mut staged = std::mem::take(&mut self.staged);
        let count = staged.len();
        let mut updater = Updater {
            prefix: &self.prefix,
            staged: &mut staged,
            failed: Vec::new(),
        };
        object.traverse(&mut updater);
        let mut failed = updater.failed;
        failed.extend(staged.into_keys());
        log::debug!(
            "updated {} of {count} parameters below '{}'",
            count - failed.len(),
            self.prefix
        );

        *self = Self::collect(&self.prefix, object);
        if !failed.is_empty() {
            bail!("could not update the parameters {}", failed.join(", "));
        }
        Ok(())
    }
}
