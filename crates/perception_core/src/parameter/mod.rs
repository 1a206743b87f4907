//! Typed parameters built from one or more samplers.
//!
//! Like samplers, parameters are authored as a [`ParameterSpec`] and validated into a
//! [`Parameter`]. Each draw yields a [`ParameterValue`], a closed set of value types
//! that host adapters match on.
use glam::{Vec2, Vec3, Vec4};
use rand::RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sampler::{Sampler, SamplerSpec};

pub mod categorical;
pub mod color;

pub use categorical::{CategoricalParameter, CategoricalSpec};
pub use color::{ColorHsva, ColorRgba};

/// Unvalidated parameter configuration.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ParameterSpec {
    Bool {
        value: SamplerSpec,
        /// Draws at or above this value are `true`. Must lie in [0, 1].
        threshold: f32,
    },
    Int {
        value: SamplerSpec,
    },
    Float {
        value: SamplerSpec,
    },
    Vector2 {
        x: SamplerSpec,
        y: SamplerSpec,
    },
    Vector3 {
        x: SamplerSpec,
        y: SamplerSpec,
        z: SamplerSpec,
    },
    Vector4 {
        x: SamplerSpec,
        y: SamplerSpec,
        z: SamplerSpec,
        w: SamplerSpec,
    },
    ColorRgba {
        red: SamplerSpec,
        green: SamplerSpec,
        blue: SamplerSpec,
        alpha: SamplerSpec,
    },
    ColorHsva {
        hue: SamplerSpec,
        saturation: SamplerSpec,
        value: SamplerSpec,
        alpha: SamplerSpec,
    },
    Categorical(CategoricalSpec<String>),
}

impl ParameterSpec {
    /// Fair coin: uniform [0, 1] against a 0.5 threshold.
    pub fn coin() -> Self {
        ParameterSpec::Bool {
            value: SamplerSpec::uniform(0.0, 1.0),
            threshold: 0.5,
        }
    }

    pub fn float(value: SamplerSpec) -> Self {
        ParameterSpec::Float { value }
    }

    pub fn int(value: SamplerSpec) -> Self {
        ParameterSpec::Int { value }
    }

    /// Three independent components.
    pub fn vector3(x: SamplerSpec, y: SamplerSpec, z: SamplerSpec) -> Self {
        ParameterSpec::Vector3 { x, y, z }
    }

    /// Uniform hue, saturation and value with opaque alpha.
    pub fn hsva_uniform() -> Self {
        ParameterSpec::ColorHsva {
            hue: SamplerSpec::uniform(0.0, 1.0),
            saturation: SamplerSpec::uniform(0.0, 1.0),
            value: SamplerSpec::uniform(0.0, 1.0),
            alpha: SamplerSpec::constant(1.0),
        }
    }

    /// Uniform red, green and blue with opaque alpha.
    pub fn rgba_uniform() -> Self {
        ParameterSpec::ColorRgba {
            red: SamplerSpec::uniform(0.0, 1.0),
            green: SamplerSpec::uniform(0.0, 1.0),
            blue: SamplerSpec::uniform(0.0, 1.0),
            alpha: SamplerSpec::constant(1.0),
        }
    }

    pub fn categorical(spec: CategoricalSpec<String>) -> Self {
        ParameterSpec::Categorical(spec)
    }

    /// Validates every inner sampler and builds the parameter.
    pub fn validate(&self) -> Result<Parameter> {
        Ok(match self {
            ParameterSpec::Bool { value, threshold } => {
                if !(0.0..=1.0).contains(threshold) {
                    return Err(Error::ParameterValidation(format!(
                        "bool threshold {threshold} must lie in [0, 1]"
                    )));
                }
                Parameter::Bool {
                    value: value.validate()?,
                    threshold: *threshold,
                }
            }
            ParameterSpec::Int { value } => Parameter::Int(value.validate()?),
            ParameterSpec::Float { value } => Parameter::Float(value.validate()?),
            ParameterSpec::Vector2 { x, y } => Parameter::Vector2([x.validate()?, y.validate()?]),
            ParameterSpec::Vector3 { x, y, z } => {
                Parameter::Vector3([x.validate()?, y.validate()?, z.validate()?])
            }
            ParameterSpec::Vector4 { x, y, z, w } => Parameter::Vector4([
                x.validate()?,
                y.validate()?,
                z.validate()?,
                w.validate()?,
            ]),
            ParameterSpec::ColorRgba {
                red,
                green,
                blue,
                alpha,
            } => Parameter::ColorRgba([
                red.validate()?,
                green.validate()?,
                blue.validate()?,
                alpha.validate()?,
            ]),
            ParameterSpec::ColorHsva {
                hue,
                saturation,
                value,
                alpha,
            } => Parameter::ColorHsva([
                hue.validate()?,
                saturation.validate()?,
                value.validate()?,
                alpha.validate()?,
            ]),
            ParameterSpec::Categorical(spec) => Parameter::Categorical(spec.validate()?),
        })
    }
}

/// A validated parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Parameter {
    Bool { value: Sampler, threshold: f32 },
    Int(Sampler),
    Float(Sampler),
    Vector2([Sampler; 2]),
    Vector3([Sampler; 3]),
    Vector4([Sampler; 4]),
    ColorRgba([Sampler; 4]),
    ColorHsva([Sampler; 4]),
    Categorical(CategoricalParameter<String>),
}

impl Parameter {
    /// Draws one value. Components are sampled in declaration order.
    pub fn sample(&self, rng: &mut dyn RngCore) -> Result<ParameterValue> {
        Ok(match self {
            Parameter::Bool { value, threshold } => {
                ParameterValue::Bool(value.sample(rng) >= *threshold)
            }
            Parameter::Int(value) => ParameterValue::Int(value.sample(rng) as i32),
            Parameter::Float(value) => ParameterValue::Float(value.sample(rng)),
            Parameter::Vector2([x, y]) => {
                let x = x.sample(rng);
                ParameterValue::Vector2(Vec2::new(x, y.sample(rng)))
            }
            Parameter::Vector3([x, y, z]) => {
                let x = x.sample(rng);
                let y = y.sample(rng);
                ParameterValue::Vector3(Vec3::new(x, y, z.sample(rng)))
            }
            Parameter::Vector4(samplers) => {
                let [x, y, z, w] = sample_four(samplers, rng);
                ParameterValue::Vector4(Vec4::new(x, y, z, w))
            }
            Parameter::ColorRgba(samplers) => {
                let [r, g, b, a] = sample_four(samplers, rng);
                ParameterValue::ColorRgba(ColorRgba::new(r, g, b, a))
            }
            Parameter::ColorHsva(samplers) => {
                let [h, s, v, a] = sample_four(samplers, rng);
                ParameterValue::ColorHsva(ColorHsva::new(h, s, v, a))
            }
            Parameter::Categorical(table) => ParameterValue::Category(table.sample(rng)?.clone()),
        })
    }

    /// Draws `count` values.
    pub fn samples(&self, rng: &mut dyn RngCore, count: usize) -> Result<Vec<ParameterValue>> {
        (0..count).map(|_| self.sample(rng)).collect()
    }
}

fn sample_four(samplers: &[Sampler; 4], rng: &mut dyn RngCore) -> [f32; 4] {
    let mut out = [0.0; 4];
    for (slot, sampler) in out.iter_mut().zip(samplers) {
        *slot = sampler.sample(rng);
    }
    out
}

/// A sampled parameter value.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    Vector2(Vec2),
    Vector3(Vec3),
    Vector4(Vec4),
    ColorRgba(ColorRgba),
    ColorHsva(ColorHsva),
    Category(String),
}

impl ParameterValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParameterValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            ParameterValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            ParameterValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vector3(&self) -> Option<Vec3> {
        match self {
            ParameterValue::Vector3(v) => Some(*v),
            _ => None,
        }
    }

    /// Either color variant as RGBA.
    pub fn as_rgba(&self) -> Option<ColorRgba> {
        match self {
            ParameterValue::ColorRgba(c) => Some(*c),
            ParameterValue::ColorHsva(c) => Some(c.to_rgba()),
            _ => None,
        }
    }

    pub fn as_category(&self) -> Option<&str> {
        match self {
            ParameterValue::Category(s) => Some(s),
            _ => None,
        }
    }
}
