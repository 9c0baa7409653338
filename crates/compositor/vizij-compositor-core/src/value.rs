//! Animatable values and the interpolation contract they implement.
//!
//! The sandwich and the samplers only talk to values through
//! [`AnimatableValue`]. [`Value`] is the concrete runtime value hosts exchange
//! with the engine; `f32` and [`TransformValue`] implement the contract too so
//! per-component sampling can reuse the same code paths.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::interp::functions::{
    add_scaled_slice, add_scaled_vec2, add_scaled_vec4, euclidean, lerp_f32, lerp_slice,
    lerp_vec2, lerp_vec4,
};

/// Interpolable value contract consumed by the sandwich and the samplers.
pub trait AnimatableValue: Clone + fmt::Debug + PartialEq {
    /// `self + (to - self) * fraction + accumulation * multiplier`.
    ///
    /// With `to` absent the blend term vanishes; with `accumulation` absent (or
    /// a zero multiplier) nothing is added.
    fn interpolate(
        &self,
        to: Option<&Self>,
        fraction: f32,
        accumulation: Option<&Self>,
        multiplier: u32,
    ) -> Self;

    /// Distance metric used by paced timing.
    fn distance_to(&self, other: &Self) -> f32;

    /// Whether `distance_to` is meaningful for this value.
    fn can_pace(&self) -> bool;

    /// The additive identity of this value's kind.
    fn zero_value(&self) -> Self;
}

impl AnimatableValue for f32 {
    fn interpolate(
        &self,
        to: Option<&Self>,
        fraction: f32,
        accumulation: Option<&Self>,
        multiplier: u32,
    ) -> Self {
        let base = to.map_or(*self, |b| lerp_f32(*self, *b, fraction));
        match accumulation {
            Some(acc) if multiplier > 0 => base + acc * multiplier as f32,
            _ => base,
        }
    }

    fn distance_to(&self, other: &Self) -> f32 {
        (other - self).abs()
    }

    fn can_pace(&self) -> bool {
        true
    }

    fn zero_value(&self) -> Self {
        0.0
    }
}

/// Single transform primitive kinds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransformKind {
    Translate,
    Scale,
    Rotate,
    SkewX,
    SkewY,
}

impl TransformKind {
    /// Number of independently animated components.
    #[inline]
    pub fn arity(self) -> usize {
        match self {
            TransformKind::Translate | TransformKind::Scale => 2,
            TransformKind::Rotate => 3,
            TransformKind::SkewX | TransformKind::SkewY => 1,
        }
    }
}

/// One transform primitive. Unused trailing components stay zero.
///
/// Component layout: translate `(tx, ty)`, scale `(sx, sy)`, rotate
/// `(angle_deg, cx, cy)`, skew `(angle_deg)`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransformValue {
    pub kind: TransformKind,
    pub components: [f32; 3],
}

impl TransformValue {
    pub fn translate(tx: f32, ty: f32) -> Self {
        Self {
            kind: TransformKind::Translate,
            components: [tx, ty, 0.0],
        }
    }

    pub fn scale(sx: f32, sy: f32) -> Self {
        Self {
            kind: TransformKind::Scale,
            components: [sx, sy, 0.0],
        }
    }

    pub fn rotate(angle: f32, cx: f32, cy: f32) -> Self {
        Self {
            kind: TransformKind::Rotate,
            components: [angle, cx, cy],
        }
    }

    pub fn skew_x(angle: f32) -> Self {
        Self {
            kind: TransformKind::SkewX,
            components: [angle, 0.0, 0.0],
        }
    }

    pub fn skew_y(angle: f32) -> Self {
        Self {
            kind: TransformKind::SkewY,
            components: [angle, 0.0, 0.0],
        }
    }

    /// The no-op transform of `kind`.
    pub fn identity(kind: TransformKind) -> Self {
        match kind {
            TransformKind::Scale => Self::scale(1.0, 1.0),
            _ => Self {
                kind,
                components: [0.0; 3],
            },
        }
    }

    /// Components that participate in interpolation.
    #[inline]
    pub fn active(&self) -> &[f32] {
        &self.components[..self.kind.arity()]
    }

    /// Per-component distance used by per-component pacing.
    #[inline]
    pub fn component_distance(&self, other: &Self, component: usize) -> f32 {
        (other.components[component] - self.components[component]).abs()
    }
}

impl AnimatableValue for TransformValue {
    fn interpolate(
        &self,
        to: Option<&Self>,
        fraction: f32,
        accumulation: Option<&Self>,
        multiplier: u32,
    ) -> Self {
        let mut out = *self;
        if let Some(to) = to.filter(|t| t.kind == self.kind) {
            for i in 0..self.kind.arity() {
                out.components[i] = lerp_f32(self.components[i], to.components[i], fraction);
            }
        }
        if let Some(acc) = accumulation.filter(|a| a.kind == self.kind && multiplier > 0) {
            for i in 0..self.kind.arity() {
                out.components[i] += acc.components[i] * multiplier as f32;
            }
        }
        out
    }

    fn distance_to(&self, other: &Self) -> f32 {
        if self.kind != other.kind {
            return 0.0;
        }
        euclidean(self.active(), other.active())
    }

    fn can_pace(&self) -> bool {
        true
    }

    fn zero_value(&self) -> Self {
        Self {
            kind: self.kind,
            components: [0.0; 3],
        }
    }
}

/// Coarse kind tag, handy for dispatch and diagnostics.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Number,
    NumberList,
    Point,
    Color,
    Motion,
    Transform,
    Bool,
    Text,
}

/// Runtime attribute value.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum Value {
    /// Scalar number or length
    Number(f32),
    /// Variable-length numeric list
    NumberList(Vec<f32>),
    /// 2D point (motion keyframes)
    Point([f32; 2]),
    /// RGBA color
    Color([f32; 4]),
    /// Motion sample: position plus rotation in degrees
    Motion { x: f32, y: f32, angle: f32 },
    /// Transform list applied left to right
    Transform(Vec<TransformValue>),
    /// Step-only boolean (no blending)
    Bool(bool),
    /// Step-only text (no blending)
    Text(String),
}

impl Value {
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Number(_) => ValueKind::Number,
            Value::NumberList(_) => ValueKind::NumberList,
            Value::Point(_) => ValueKind::Point,
            Value::Color(_) => ValueKind::Color,
            Value::Motion { .. } => ValueKind::Motion,
            Value::Transform(_) => ValueKind::Transform,
            Value::Bool(_) => ValueKind::Bool,
            Value::Text(_) => ValueKind::Text,
        }
    }

    /// Position carried by point and motion values.
    pub fn as_point(&self) -> Option<[f32; 2]> {
        match self {
            Value::Point(p) => Some(*p),
            Value::Motion { x, y, .. } => Some([*x, *y]),
            _ => None,
        }
    }

    /// The single transform of a one-entry transform list.
    pub fn as_single_transform(&self) -> Option<TransformValue> {
        match self {
            Value::Transform(list) if list.len() == 1 => Some(list[0]),
            _ => None,
        }
    }

    fn lerp(&self, to: &Value, t: f32) -> Value {
        match (self, to) {
            (Value::Number(a), Value::Number(b)) => Value::Number(lerp_f32(*a, *b, t)),
            (Value::NumberList(a), Value::NumberList(b)) if a.len() == b.len() => {
                Value::NumberList(lerp_slice(a, b, t))
            }
            (Value::Point(a), Value::Point(b)) => Value::Point(lerp_vec2(*a, *b, t)),
            (Value::Color(a), Value::Color(b)) => Value::Color(lerp_vec4(*a, *b, t)),
            (
                Value::Motion { x, y, angle },
                Value::Motion {
                    x: bx,
                    y: by,
                    angle: ba,
                },
            ) => Value::Motion {
                x: lerp_f32(*x, *bx, t),
                y: lerp_f32(*y, *by, t),
                angle: lerp_f32(*angle, *ba, t),
            },
            (Value::Transform(a), Value::Transform(b)) if same_shape(a, b) => Value::Transform(
                a.iter()
                    .zip(b.iter())
                    .map(|(x, y)| x.interpolate(Some(y), t, None, 0))
                    .collect(),
            ),
            // Step kinds and mismatched kinds hold the left value (fail-soft).
            _ => self.clone(),
        }
    }

    fn accumulate(&self, acc: &Value, multiplier: u32) -> Value {
        let k = multiplier as f32;
        match (self, acc) {
            (Value::Number(a), Value::Number(b)) => Value::Number(a + b * k),
            (Value::NumberList(a), Value::NumberList(b)) if a.len() == b.len() => {
                Value::NumberList(add_scaled_slice(a, b, k))
            }
            (Value::Point(a), Value::Point(b)) => Value::Point(add_scaled_vec2(*a, *b, k)),
            (Value::Color(a), Value::Color(b)) => Value::Color(add_scaled_vec4(*a, *b, k)),
            (
                Value::Motion { x, y, angle },
                Value::Motion {
                    x: bx,
                    y: by,
                    angle: ba,
                },
            ) => Value::Motion {
                x: x + bx * k,
                y: y + by * k,
                angle: angle + ba * k,
            },
            (Value::Motion { x, y, angle }, Value::Point(p)) => Value::Motion {
                x: x + p[0] * k,
                y: y + p[1] * k,
                angle: *angle,
            },
            (Value::Transform(a), Value::Transform(b)) => {
                if same_shape(a, b) {
                    Value::Transform(
                        a.iter()
                            .zip(b.iter())
                            .map(|(x, y)| x.interpolate(None, 0.0, Some(y), multiplier))
                            .collect(),
                    )
                } else {
                    // Different primitives compose by list concatenation, lower layers first.
                    let mut out = Vec::with_capacity(b.len() * multiplier as usize + a.len());
                    for _ in 0..multiplier {
                        out.extend_from_slice(b);
                    }
                    out.extend_from_slice(a);
                    Value::Transform(out)
                }
            }
            _ => self.clone(),
        }
    }
}

fn same_shape(a: &[TransformValue], b: &[TransformValue]) -> bool {
    a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.kind == y.kind)
}

/// Blending and accumulation work per kind:
/// - numeric kinds add component-wise;
/// - transform lists of the same shape (same length, same primitive kinds in
///   order) add component-wise, so `scale(2,2)` over `scale(1,1)` gives
///   `scale(3,3)` and rotate centres add as well;
/// - transform lists of different shapes concatenate, lower list first;
/// - step kinds and mismatched kinds keep `self`.
impl AnimatableValue for Value {
    fn interpolate(
        &self,
        to: Option<&Self>,
        fraction: f32,
        accumulation: Option<&Self>,
        multiplier: u32,
    ) -> Self {
        let base = match to {
            Some(to) if fraction != 0.0 => self.lerp(to, fraction),
            _ => self.clone(),
        };
        match accumulation {
            Some(acc) if multiplier > 0 => base.accumulate(acc, multiplier),
            _ => base,
        }
    }

    fn distance_to(&self, other: &Self) -> f32 {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => (b - a).abs(),
            (Value::NumberList(a), Value::NumberList(b)) if a.len() == b.len() => euclidean(a, b),
            (Value::Point(a), Value::Point(b)) => euclidean(a, b),
            (Value::Color(a), Value::Color(b)) => euclidean(&a[..3], &b[..3]),
            (Value::Motion { x, y, .. }, Value::Motion { x: bx, y: by, .. }) => {
                euclidean(&[*x, *y], &[*bx, *by])
            }
            (Value::Transform(a), Value::Transform(b)) if a.len() == 1 && b.len() == 1 => {
                a[0].distance_to(&b[0])
            }
            _ => 0.0,
        }
    }

    fn can_pace(&self) -> bool {
        !matches!(self, Value::Bool(_) | Value::Text(_))
    }

    fn zero_value(&self) -> Self {
        match self {
            Value::Number(_) => Value::Number(0.0),
            Value::NumberList(v) => Value::NumberList(vec![0.0; v.len()]),
            Value::Point(_) => Value::Point([0.0; 2]),
            Value::Color(_) => Value::Color([0.0; 4]),
            Value::Motion { .. } => Value::Motion {
                x: 0.0,
                y: 0.0,
                angle: 0.0,
            },
            Value::Transform(list) => {
                Value::Transform(list.iter().map(|t| t.zero_value()).collect())
            }
            Value::Bool(_) => Value::Bool(false),
            Value::Text(_) => Value::Text(String::new()),
        }
    }
}
