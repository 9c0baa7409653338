//! Declarative description of one animation.
//!
//! Field names follow the SMIL attribute names (`calcMode`, `keyTimes`,
//! `keySplines`, `keyPoints`) so hosts can forward parsed attributes as JSON.

use serde::{Deserialize, Serialize};

use crate::error::{CompositorError, Result};
use crate::interp::CalcMode;
use crate::value::{AnimatableValue, TransformKind, Value};

/// Rotation policy of a motion animation.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MotionRotate {
    /// Fixed angle in degrees.
    Angle(f32),
    /// Follow the path tangent.
    Auto,
    /// Follow the path tangent, turned around.
    AutoReverse,
}

impl Default for MotionRotate {
    fn default() -> Self {
        MotionRotate::Angle(0.0)
    }
}

/// Motion path command in user space.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "camelCase")]
pub enum PathCommand {
    MoveTo { x: f32, y: f32 },
    LineTo { x: f32, y: f32 },
    QuadTo { x1: f32, y1: f32, x: f32, y: f32 },
    CurveTo {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        x: f32,
        y: f32,
    },
    Close,
}

/// Which sampling strategy an animation uses.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SamplerDecl {
    /// Scalar, list, color or discrete values.
    #[default]
    Simple,
    /// Motion along a 2D path; keyframe values are points.
    Motion {
        #[serde(default)]
        path: Option<Vec<PathCommand>>,
        #[serde(default, rename = "keyPoints")]
        key_points: Option<Vec<f32>>,
        #[serde(default)]
        rotate: MotionRotate,
    },
    /// One transform primitive, animated per component.
    Transform {
        #[serde(rename = "type")]
        transform: TransformKind,
    },
}

/// Immutable interpolation settings of one animation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationDecl {
    #[serde(default)]
    pub calc_mode: CalcMode,
    #[serde(default)]
    pub key_times: Option<Vec<f32>>,
    #[serde(default)]
    pub key_splines: Option<Vec<f32>>,
    #[serde(default)]
    pub additive: bool,
    #[serde(default)]
    pub cumulative: bool,
    #[serde(default)]
    pub values: Option<Vec<Value>>,
    #[serde(default)]
    pub from: Option<Value>,
    #[serde(default)]
    pub to: Option<Value>,
    #[serde(default)]
    pub by: Option<Value>,
    #[serde(default)]
    pub sampler: SamplerDecl,
}

impl AnimationDecl {
    /// Parse a declaration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// A `values` animation with default timing.
    pub fn values(values: Vec<Value>) -> Self {
        Self {
            values: Some(values),
            ..Self::default()
        }
    }

    pub fn from_to(from: Value, to: Value) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            ..Self::default()
        }
    }

    pub fn with_calc_mode(mut self, calc_mode: CalcMode) -> Self {
        self.calc_mode = calc_mode;
        self
    }

    pub fn with_key_times(mut self, key_times: Vec<f32>) -> Self {
        self.key_times = Some(key_times);
        self
    }

    pub fn with_key_splines(mut self, key_splines: Vec<f32>) -> Self {
        self.key_splines = Some(key_splines);
        self
    }

    pub fn additive(mut self, additive: bool) -> Self {
        self.additive = additive;
        self
    }

    pub fn cumulative(mut self, cumulative: bool) -> Self {
        self.cumulative = cumulative;
        self
    }

    pub fn with_sampler(mut self, sampler: SamplerDecl) -> Self {
        self.sampler = sampler;
        self
    }

    /// Whether the declaration is a to-animation (only `to` supplied).
    pub fn is_to_animation(&self) -> bool {
        self.values.is_none() && self.from.is_none() && self.to.is_some()
    }
}

/// How the keyframe values were specified.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ValuesForm {
    Values,
    FromTo,
    FromBy,
    /// Starts from the underlying value; never cumulative.
    To,
    /// Starts from zero; always additive.
    By,
}

/// Keyframe values after `values`/`from`/`to`/`by` resolution.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedValues<V> {
    pub values: Vec<V>,
    pub form: ValuesForm,
}

/// Borrowed `values`/`from`/`to`/`by` quadruple for any value type.
#[derive(Clone, Copy, Debug)]
pub struct ValueSource<'a, V> {
    pub values: Option<&'a [V]>,
    pub from: Option<&'a V>,
    pub to: Option<&'a V>,
    pub by: Option<&'a V>,
}

impl<'a, V: AnimatableValue> ValueSource<'a, V> {
    /// Resolve to a keyframe list. `values` wins over `from`/`to`/`by`.
    ///
    /// `underlying` seeds to-animations; when the host has no base value the
    /// zero value of `to` is used instead.
    pub fn resolve(&self, underlying: Option<&V>) -> Result<ResolvedValues<V>> {
        if let Some(values) = self.values {
            if values.is_empty() {
                return Err(CompositorError::malformed("values", "list is empty"));
            }
            return Ok(ResolvedValues {
                values: values.to_vec(),
                form: ValuesForm::Values,
            });
        }
        match (self.from, self.to, self.by) {
            (Some(from), Some(to), _) => Ok(ResolvedValues {
                values: vec![from.clone(), to.clone()],
                form: ValuesForm::FromTo,
            }),
            (Some(from), None, Some(by)) => Ok(ResolvedValues {
                values: vec![from.clone(), from.interpolate(None, 0.0, Some(by), 1)],
                form: ValuesForm::FromBy,
            }),
            (None, Some(to), _) => {
                let start = underlying.cloned().unwrap_or_else(|| to.zero_value());
                Ok(ResolvedValues {
                    values: vec![start, to.clone()],
                    form: ValuesForm::To,
                })
            }
            (None, None, Some(by)) => Ok(ResolvedValues {
                values: vec![by.zero_value(), by.clone()],
                form: ValuesForm::By,
            }),
            _ => Err(CompositorError::malformed(
                "values",
                "one of values, from/to, from/by, to or by is required",
            )),
        }
    }
}
