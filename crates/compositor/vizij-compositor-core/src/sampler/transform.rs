//! Single-primitive transform animation.
//!
//! In paced mode translate, scale and rotate pace each component on its own
//! distance table, so e.g. `tx` and `ty` can reach their keyframes at
//! different times. Every other mode shares one table across components.

use crate::config::Config;
use crate::decl::{AnimationDecl, ValueSource};
use crate::error::{CompositorError, Result};
use crate::interp::functions::lerp_f32;
use crate::interp::keyframes::paced_key_times;
use crate::interp::{CalcMode, KeyPosition, Keyframes};
use crate::sampler::simple::{Composition, SimpleSampler};
use crate::value::{TransformKind, TransformValue, Value};

#[derive(Clone, Debug, PartialEq)]
enum Timing {
    Shared(SimpleSampler<TransformValue>),
    PerComponent {
        components: Vec<Keyframes>,
        values: Vec<TransformValue>,
    },
}

/// Samples one transform primitive and emits a one-entry transform list.
#[derive(Clone, Debug, PartialEq)]
pub struct TransformSampler {
    kind: TransformKind,
    timing: Timing,
    cumulative: bool,
    to_animation: bool,
}

/// First entry of `kind` in an underlying transform list, else the identity.
fn underlying_of(kind: TransformKind, underlying: Option<&Value>) -> TransformValue {
    match underlying {
        Some(Value::Transform(list)) => list
            .iter()
            .find(|t| t.kind == kind)
            .copied()
            .unwrap_or_else(|| TransformValue::identity(kind)),
        _ => TransformValue::identity(kind),
    }
}

fn expect_kind(kind: TransformKind, value: &Value) -> Result<TransformValue> {
    match value.as_single_transform() {
        Some(tv) if tv.kind == kind => Ok(tv),
        _ => Err(CompositorError::malformed(
            "values",
            format!("expected a single {kind:?} transform, found {value:?}"),
        )),
    }
}

impl TransformSampler {
    pub fn build(
        decl: &AnimationDecl,
        kind: TransformKind,
        underlying: Option<&Value>,
        cfg: &Config,
    ) -> Result<(Self, Composition)> {
        let convert = |v: &Option<Value>| v.as_ref().map(|v| expect_kind(kind, v)).transpose();
        let values = decl
            .values
            .as_deref()
            .map(|vs| vs.iter().map(|v| expect_kind(kind, v)).collect::<Result<Vec<_>>>())
            .transpose()?;
        let from = convert(&decl.from)?;
        let to = convert(&decl.to)?;
        let by = convert(&decl.by)?;
        let base = underlying_of(kind, underlying);

        let resolved = ValueSource {
            values: values.as_deref(),
            from: from.as_ref(),
            to: to.as_ref(),
            by: by.as_ref(),
        }
        .resolve(Some(&base))?;
        let composition = Composition::for_form(resolved.form, decl.additive, decl.cumulative);

        let per_component = decl.calc_mode == CalcMode::Paced
            && !matches!(kind, TransformKind::SkewX | TransformKind::SkewY)
            && resolved.values.len() > 1;
        let timing = if per_component {
            let values = resolved.values;
            let components = (0..kind.arity())
                .map(|c| {
                    let distances: Vec<f32> = values
                        .windows(2)
                        .map(|w| w[0].component_distance(&w[1], c))
                        .collect();
                    Keyframes::resolve(
                        CalcMode::Paced,
                        decl.key_times.as_deref(),
                        None,
                        values.len(),
                        || paced_key_times(&distances),
                        cfg,
                    )
                })
                .collect::<Result<Vec<_>>>()?;
            Timing::PerComponent { components, values }
        } else {
            Timing::Shared(SimpleSampler::new(
                resolved.values,
                decl.calc_mode,
                decl.key_times.as_deref(),
                decl.key_splines.as_deref(),
                composition.cumulative,
                cfg,
            )?)
        };

        Ok((
            Self {
                kind,
                timing,
                cumulative: composition.cumulative,
                to_animation: composition.to_animation,
            },
            composition,
        ))
    }

    #[inline]
    pub fn kind(&self) -> TransformKind {
        self.kind
    }

    /// Keyframe tables in use: one when shared, one per component when paced.
    pub fn keyframes(&self) -> Vec<&Keyframes> {
        match &self.timing {
            Timing::Shared(s) => vec![s.keyframes()],
            Timing::PerComponent { components, .. } => components.iter().collect(),
        }
    }

    /// Re-seed a to-animation's start from a new underlying value.
    pub fn set_underlying(&mut self, underlying: Option<&Value>) {
        if !self.to_animation {
            return;
        }
        let first = underlying_of(self.kind, underlying);
        match &mut self.timing {
            Timing::Shared(s) => s.set_first_value(first),
            Timing::PerComponent { values, .. } => {
                if let Some(v) = values.first_mut() {
                    *v = first;
                }
            }
        }
    }

    pub fn sample(&self, unit_time: f32, iteration: u32) -> Value {
        let tv = match &self.timing {
            Timing::Shared(s) => s.sample(unit_time, iteration),
            Timing::PerComponent { components, values } => {
                let last = values[values.len() - 1];
                let mut out = values[0];
                for (c, keyframes) in components.iter().enumerate() {
                    let mut v = match keyframes.locate(unit_time) {
                        KeyPosition::Final => last.components[c],
                        KeyPosition::At { index } => values[index].components[c],
                        KeyPosition::Between { index, fraction } => lerp_f32(
                            values[index].components[c],
                            values[index + 1].components[c],
                            fraction,
                        ),
                    };
                    if self.cumulative && iteration > 0 {
                        v += last.components[c] * iteration as f32;
                    }
                    out.components[c] = v;
                }
                out
            }
        };
        Value::Transform(vec![tv])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32, eps: f32) {
        assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
    }

    fn tf(tv: TransformValue) -> Value {
        Value::Transform(vec![tv])
    }

    fn single(v: Value) -> TransformValue {
        v.as_single_transform().unwrap()
    }

    fn build(decl: &AnimationDecl, kind: TransformKind) -> Result<(TransformSampler, Composition)> {
        TransformSampler::build(decl, kind, None, &Config::default())
    }

    #[test]
    fn paced_translate_paces_each_component() {
        let decl = AnimationDecl::values(vec![
            tf(TransformValue::translate(0.0, 0.0)),
            tf(TransformValue::translate(10.0, 0.0)),
            tf(TransformValue::translate(10.0, 30.0)),
        ])
        .with_calc_mode(CalcMode::Paced);
        let (s, _) = build(&decl, TransformKind::Translate).unwrap();
        let tables: Vec<&[f32]> = s.keyframes().iter().map(|k| k.key_times()).collect();
        assert_eq!(tables, vec![&[0.0, 1.0, 1.0][..], &[0.0, 0.0, 1.0][..]]);
        let tv = single(s.sample(0.5, 0));
        approx(tv.components[0], 5.0, 1e-5);
        approx(tv.components[1], 15.0, 1e-5);
    }

    #[test]
    fn paced_rotate_includes_center() {
        let decl = AnimationDecl::values(vec![
            tf(TransformValue::rotate(0.0, 0.0, 0.0)),
            tf(TransformValue::rotate(90.0, 10.0, 0.0)),
            tf(TransformValue::rotate(180.0, 10.0, 40.0)),
        ])
        .with_calc_mode(CalcMode::Paced);
        let (s, _) = build(&decl, TransformKind::Rotate).unwrap();
        assert_eq!(s.keyframes().len(), 3);
        let tv = single(s.sample(0.5, 0));
        approx(tv.components[0], 90.0, 1e-4);
        approx(tv.components[1], 5.0, 1e-4);
        approx(tv.components[2], 20.0, 1e-4);
    }

    #[test]
    fn skew_and_linear_share_one_table() {
        let decl = AnimationDecl::from_to(
            tf(TransformValue::skew_x(0.0)),
            tf(TransformValue::skew_x(30.0)),
        )
        .with_calc_mode(CalcMode::Paced);
        let (s, _) = build(&decl, TransformKind::SkewX).unwrap();
        assert_eq!(s.keyframes().len(), 1);
        approx(single(s.sample(0.5, 0)).components[0], 15.0, 1e-5);

        let decl = AnimationDecl::from_to(
            tf(TransformValue::scale(1.0, 1.0)),
            tf(TransformValue::scale(3.0, 5.0)),
        );
        let (s, _) = build(&decl, TransformKind::Scale).unwrap();
        assert_eq!(single(s.sample(0.5, 0)), TransformValue::scale(2.0, 3.0));
    }

    #[test]
    fn wrong_kind_is_malformed() {
        let decl = AnimationDecl::from_to(
            tf(TransformValue::translate(0.0, 0.0)),
            tf(TransformValue::rotate(10.0, 0.0, 0.0)),
        );
        let err = build(&decl, TransformKind::Translate).unwrap_err();
        assert_eq!(err.attribute(), Some("values"));

        let list = AnimationDecl::values(vec![Value::Transform(vec![
            TransformValue::translate(0.0, 0.0),
            TransformValue::translate(1.0, 0.0),
        ])]);
        assert!(build(&list, TransformKind::Translate).is_err());
    }

    #[test]
    fn to_animation_starts_from_matching_base_entry() {
        let decl = AnimationDecl {
            to: Some(tf(TransformValue::scale(3.0, 3.0))),
            ..AnimationDecl::default()
        };
        let base = Value::Transform(vec![
            TransformValue::translate(5.0, 5.0),
            TransformValue::scale(2.0, 2.0),
        ]);
        let (mut s, c) =
            TransformSampler::build(&decl, TransformKind::Scale, Some(&base), &Config::default())
                .unwrap();
        assert!(c.to_animation);
        assert_eq!(single(s.sample(0.5, 0)), TransformValue::scale(2.5, 2.5));

        // No scale entry in the new base: start from the identity scale.
        s.set_underlying(Some(&tf(TransformValue::translate(1.0, 1.0))));
        assert_eq!(single(s.sample(0.5, 0)), TransformValue::scale(2.0, 2.0));
    }

    #[test]
    fn cumulative_per_component() {
        let decl = AnimationDecl::values(vec![
            tf(TransformValue::translate(0.0, 0.0)),
            tf(TransformValue::translate(10.0, 20.0)),
        ])
        .with_calc_mode(CalcMode::Paced)
        .cumulative(true);
        let (s, _) = build(&decl, TransformKind::Translate).unwrap();
        let tv = single(s.sample(0.5, 1));
        approx(tv.components[0], 15.0, 1e-5);
        approx(tv.components[1], 30.0, 1e-5);
    }
}
