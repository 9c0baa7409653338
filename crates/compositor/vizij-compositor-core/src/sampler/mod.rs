//! Samplers turn a unit time and a repeat iteration into a raw value.

pub mod motion;
pub mod simple;
pub mod transform;

pub use motion::MotionSampler;
pub use simple::{Composition, SimpleSampler};
pub use transform::TransformSampler;

use crate::config::Config;
use crate::decl::{AnimationDecl, SamplerDecl, ValueSource};
use crate::error::Result;
use crate::value::{AnimatableValue, Value};

/// Sampling strategy of one animation.
#[derive(Clone, Debug)]
pub enum Sampler {
    Simple(SimpleSampler<Value>),
    Motion(MotionSampler),
    Transform(TransformSampler),
}

impl Sampler {
    /// Build the sampler for `decl`. `underlying` is the host base value, used
    /// to seed to-animations.
    pub fn build(
        decl: &AnimationDecl,
        underlying: Option<&Value>,
        cfg: &Config,
    ) -> Result<(Self, Composition)> {
        match &decl.sampler {
            SamplerDecl::Simple => {
                let resolved = ValueSource {
                    values: decl.values.as_deref(),
                    from: decl.from.as_ref(),
                    to: decl.to.as_ref(),
                    by: decl.by.as_ref(),
                }
                .resolve(underlying)?;
                let composition =
                    Composition::for_form(resolved.form, decl.additive, decl.cumulative);
                let sampler = SimpleSampler::new(
                    resolved.values,
                    decl.calc_mode,
                    decl.key_times.as_deref(),
                    decl.key_splines.as_deref(),
                    composition.cumulative,
                    cfg,
                )?;
                Ok((Sampler::Simple(sampler), composition))
            }
            SamplerDecl::Motion {
                path,
                key_points,
                rotate,
            } => {
                let (s, c) = MotionSampler::build(
                    decl,
                    path.as_deref(),
                    key_points.as_deref(),
                    *rotate,
                    underlying,
                    cfg,
                )?;
                Ok((Sampler::Motion(s), c))
            }
            SamplerDecl::Transform { transform } => {
                let (s, c) = TransformSampler::build(decl, *transform, underlying, cfg)?;
                Ok((Sampler::Transform(s), c))
            }
        }
    }

    pub fn sample(&self, unit_time: f32, iteration: u32) -> Value {
        match self {
            Sampler::Simple(s) => s.sample(unit_time, iteration),
            Sampler::Motion(s) => s.sample(unit_time, iteration),
            Sampler::Transform(s) => s.sample(unit_time, iteration),
        }
    }

    /// Re-seed the first keyframe of a to-animation from a new base value.
    /// Callers only invoke this for to-animations.
    pub fn set_underlying(&mut self, underlying: Option<&Value>) {
        match self {
            Sampler::Simple(s) => {
                let Some(to) = s.values().last().cloned() else {
                    return;
                };
                let first = underlying.cloned().unwrap_or_else(|| to.zero_value());
                s.set_first_value(first);
            }
            Sampler::Motion(s) => s.set_underlying(underlying),
            Sampler::Transform(s) => s.set_underlying(underlying),
        }
    }
}

