//! One scheduled animation: activation state, composition flags and the
//! latest raw sample.

use crate::config::Config;
use crate::decl::AnimationDecl;
use crate::error::Result;
use crate::sampler::{Composition, Sampler};
use crate::value::Value;

/// A sandwich member.
///
/// State flags are driven by the engine (activate/deactivate/removeFill); the
/// raw `value` by sampling calls from the timing source.
#[derive(Clone, Debug)]
pub struct Animation {
    sampler: Sampler,
    additive: bool,
    cumulative: bool,
    to_animation: bool,
    pub(crate) active: bool,
    pub(crate) frozen: bool,
    pub(crate) dirty: bool,
    /// Most recent activation time; only used to order the sandwich.
    pub(crate) begin_time: f32,
    pub(crate) value: Option<Value>,
    pub(crate) composed: Option<Value>,
    /// Whether the last composition read the host's base value.
    pub(crate) uses_base_value: bool,
    pub(crate) last_sample: Option<(f32, u32)>,
}

impl Animation {
    /// Validate `decl` and build its sampler. `underlying` seeds to-animations.
    pub fn build(decl: &AnimationDecl, underlying: Option<&Value>, cfg: &Config) -> Result<Self> {
        let (sampler, composition) = Sampler::build(decl, underlying, cfg)?;
        Ok(Self::from_sampler(sampler, composition))
    }

    pub fn from_sampler(sampler: Sampler, composition: Composition) -> Self {
        Self {
            sampler,
            additive: composition.additive,
            cumulative: composition.cumulative,
            to_animation: composition.to_animation,
            active: false,
            frozen: false,
            dirty: false,
            begin_time: f32::NEG_INFINITY,
            value: None,
            composed: None,
            uses_base_value: false,
            last_sample: None,
        }
    }

    #[inline]
    pub fn sampler(&self) -> &Sampler {
        &self.sampler
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Active or frozen: the animation takes part in composition.
    #[inline]
    pub fn contributes(&self) -> bool {
        self.active || self.frozen
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn is_additive(&self) -> bool {
        self.additive
    }

    #[inline]
    pub fn is_cumulative(&self) -> bool {
        self.cumulative
    }

    #[inline]
    pub fn is_to_animation(&self) -> bool {
        self.to_animation
    }

    #[inline]
    pub fn begin_time(&self) -> f32 {
        self.begin_time
    }

    /// Latest raw sampled value.
    #[inline]
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Non-additive animations occlude everything below them.
    #[inline]
    pub fn will_replace(&self) -> bool {
        !self.additive
    }

    /// Whether this animation, as lowest contributor, depends on the base value.
    #[inline]
    pub fn uses_underlying_value(&self) -> bool {
        self.to_animation || self.uses_base_value
    }

    /// Sample at `unit_time` in repeat `iteration`. Returns whether the raw
    /// value changed.
    pub(crate) fn sample(&mut self, unit_time: f32, iteration: u32) -> bool {
        let next = self.sampler.sample(unit_time, iteration);
        self.last_sample = Some((unit_time, iteration));
        let changed = self.value.as_ref() != Some(&next);
        self.value = Some(next);
        changed
    }

    /// Re-seed a to-animation from a new base value and re-sample at the last
    /// sample point. Returns whether the raw value changed.
    pub(crate) fn refresh_underlying(&mut self, base: Option<&Value>) -> bool {
        if !self.to_animation {
            return false;
        }
        self.sampler.set_underlying(base);
        let Some((unit_time, iteration)) = self.last_sample else {
            return false;
        };
        if self.value.is_none() {
            return false;
        }
        self.sample(unit_time, iteration)
    }

    /// Drop the raw sample (deactivation without fill).
    pub(crate) fn clear_value(&mut self) {
        self.value = None;
        self.last_sample = None;
    }
}
