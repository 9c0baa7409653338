//! Keyframe sampling over a list of values.

use crate::config::Config;
use crate::decl::ValuesForm;
use crate::error::{CompositorError, Result};
use crate::interp::keyframes::paced_key_times;
use crate::interp::{CalcMode, KeyPosition, Keyframes};
use crate::value::AnimatableValue;

/// Samples a keyframe list under one calc mode.
#[derive(Clone, Debug, PartialEq)]
pub struct SimpleSampler<V> {
    keyframes: Keyframes,
    values: Vec<V>,
    cumulative: bool,
}

impl<V: AnimatableValue> SimpleSampler<V> {
    pub fn new(
        values: Vec<V>,
        calc_mode: CalcMode,
        key_times: Option<&[f32]>,
        key_splines: Option<&[f32]>,
        cumulative: bool,
        cfg: &Config,
    ) -> Result<Self> {
        if values.is_empty() {
            return Err(CompositorError::malformed("values", "list is empty"));
        }
        let keyframes = Keyframes::resolve(
            calc_mode,
            key_times,
            key_splines,
            values.len(),
            || paced_distances(&values).and_then(|d| paced_key_times(&d)),
            cfg,
        )?;
        Ok(Self {
            keyframes,
            values,
            cumulative,
        })
    }

    #[inline]
    pub fn keyframes(&self) -> &Keyframes {
        &self.keyframes
    }

    #[inline]
    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// Replace the first keyframe (to-animations re-seeded from a new base value).
    pub fn set_first_value(&mut self, value: V) {
        if let Some(first) = self.values.first_mut() {
            *first = value;
        }
    }

    /// Value at `unit_time` during repeat `iteration` (0-based).
    pub fn sample(&self, unit_time: f32, iteration: u32) -> V {
        let last = &self.values[self.values.len() - 1];
        let sampled = match self.keyframes.locate(unit_time) {
            KeyPosition::Final => last.clone(),
            KeyPosition::At { index } => self.values[index].clone(),
            KeyPosition::Between { index, fraction } => {
                self.values[index].interpolate(Some(&self.values[index + 1]), fraction, None, 0)
            }
        };
        if self.cumulative && iteration > 0 {
            sampled.interpolate(None, 0.0, Some(last), iteration)
        } else {
            sampled
        }
    }
}

/// Distances between successive keyframes, or `None` if any value cannot pace.
pub(crate) fn paced_distances<V: AnimatableValue>(values: &[V]) -> Option<Vec<f32>> {
    if !values.iter().all(AnimatableValue::can_pace) {
        return None;
    }
    Some(values.windows(2).map(|w| w[0].distance_to(&w[1])).collect())
}

/// Composition flags implied by how values were specified.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Composition {
    pub additive: bool,
    pub cumulative: bool,
    pub to_animation: bool,
}

impl Composition {
    /// By-animations are always additive; to-animations are never cumulative.
    pub fn for_form(form: ValuesForm, additive: bool, cumulative: bool) -> Self {
        match form {
            ValuesForm::To => Self {
                additive,
                cumulative: false,
                to_animation: true,
            },
            ValuesForm::By => Self {
                additive: true,
                cumulative,
                to_animation: false,
            },
            _ => Self {
                additive,
                cumulative,
                to_animation: false,
            },
        }
    }
}
