//! Motion along a 2D path with arc-length parameterization.
//!
//! Model:
//! - The path is explicit (`path` commands) or synthesized as straight segments
//!   through the resolved keyframe points.
//! - keyPoints give, per keyframe, the fraction of total arc length reached at
//!   that keyframe. Defaults place keyframe `i` at the start of drawn segment
//!   `i` (and the last at the end of the path).
//! - Paced timing derives keyTimes from the same arc-length table, so motion
//!   runs at constant speed.

use kurbo::{BezPath, ParamCurve, ParamCurveArclen, ParamCurveDeriv, PathSeg, Point};

use crate::config::Config;
use crate::decl::{AnimationDecl, MotionRotate, PathCommand, ValueSource, ValuesForm};
use crate::error::{CompositorError, Result};
use crate::interp::keyframes::even_key_times;
use crate::interp::{CalcMode, KeyPosition, Keyframes};
use crate::sampler::simple::Composition;
use crate::value::{AnimatableValue, Value};

/// Flattened view of a path with cumulative segment lengths.
#[derive(Clone, Debug)]
struct MotionPath {
    start: Point,
    segments: Vec<PathSeg>,
    /// Arc length at the end of each segment.
    lengths: Vec<f64>,
    accuracy: f64,
}

impl MotionPath {
    fn from_commands(commands: &[PathCommand], accuracy: f64) -> Result<Self> {
        if !matches!(commands.first(), Some(PathCommand::MoveTo { .. })) {
            return Err(CompositorError::malformed("path", "must begin with a moveTo"));
        }
        let mut path = BezPath::new();
        for cmd in commands {
            match *cmd {
                PathCommand::MoveTo { x, y } => path.move_to(pt(x, y)?),
                PathCommand::LineTo { x, y } => path.line_to(pt(x, y)?),
                PathCommand::QuadTo { x1, y1, x, y } => path.quad_to(pt(x1, y1)?, pt(x, y)?),
                PathCommand::CurveTo {
                    x1,
                    y1,
                    x2,
                    y2,
                    x,
                    y,
                } => path.curve_to(pt(x1, y1)?, pt(x2, y2)?, pt(x, y)?),
                PathCommand::Close => path.close_path(),
            }
        }
        let start = match commands[0] {
            PathCommand::MoveTo { x, y } => Point::new(x as f64, y as f64),
            _ => Point::ZERO,
        };
        Ok(Self::from_bez(start, &path, accuracy))
    }

    fn polyline(points: &[[f32; 2]], accuracy: f64) -> Result<Self> {
        let mut path = BezPath::new();
        let mut iter = points.iter();
        let first = iter.next().ok_or_else(|| {
            CompositorError::malformed("values", "motion needs at least one point")
        })?;
        let start = pt(first[0], first[1])?;
        path.move_to(start);
        for p in iter {
            path.line_to(pt(p[0], p[1])?);
        }
        Ok(Self::from_bez(start, &path, accuracy))
    }

    fn from_bez(start: Point, path: &BezPath, accuracy: f64) -> Self {
        let segments: Vec<PathSeg> = path.segments().collect();
        let mut lengths = Vec::with_capacity(segments.len());
        let mut acc = 0.0;
        for seg in &segments {
            acc += seg.arclen(accuracy);
            lengths.push(acc);
        }
        Self {
            start,
            segments,
            lengths,
            accuracy,
        }
    }

    #[inline]
    fn total(&self) -> f64 {
        self.lengths.last().copied().unwrap_or(0.0)
    }

    #[inline]
    fn length_before(&self, segment: usize) -> f64 {
        if segment == 0 {
            0.0
        } else {
            self.lengths[segment - 1]
        }
    }

    fn end_point(&self) -> Point {
        self.segments.last().map_or(self.start, |s| s.end())
    }

    /// Arc-length fractions at the start of each segment, plus 1 for the end.
    fn segment_fractions(&self) -> Option<Vec<f32>> {
        let total = self.total();
        if total <= 0.0 {
            return None;
        }
        let mut out: Vec<f32> = (0..self.segments.len())
            .map(|i| (self.length_before(i) / total) as f32)
            .collect();
        out.push(1.0);
        Some(out)
    }

    /// Point and tangent angle (degrees) at `distance` along the path.
    fn sample(&self, distance: f64) -> (Point, f64) {
        if self.segments.is_empty() {
            return (self.start, 0.0);
        }
        let d = distance.clamp(0.0, self.total());
        let i = self
            .lengths
            .partition_point(|&l| l < d)
            .min(self.segments.len() - 1);
        let seg = self.segments[i];
        let before = self.length_before(i);
        let seg_len = self.lengths[i] - before;
        let t = if seg_len > 0.0 {
            seg.inv_arclen(d - before, self.accuracy)
        } else {
            0.0
        };
        let tangent = tangent_at(&seg, t);
        let angle = if tangent.hypot2() > 0.0 {
            tangent.y.atan2(tangent.x).to_degrees()
        } else {
            0.0
        };
        (seg.eval(t), angle)
    }
}

fn tangent_at(seg: &PathSeg, t: f64) -> kurbo::Vec2 {
    match seg {
        PathSeg::Line(l) => l.p1 - l.p0,
        PathSeg::Quad(q) => q.deriv().eval(t).to_vec2(),
        PathSeg::Cubic(c) => c.deriv().eval(t).to_vec2(),
    }
}

fn pt(x: f32, y: f32) -> Result<Point> {
    if x.is_finite() && y.is_finite() {
        Ok(Point::new(x as f64, y as f64))
    } else {
        Err(CompositorError::malformed("path", "coordinates must be finite"))
    }
}

/// Samples motion along a path.
#[derive(Clone, Debug)]
pub struct MotionSampler {
    path: MotionPath,
    keyframes: Keyframes,
    key_points: Vec<f32>,
    rotate: MotionRotate,
    cumulative: bool,
    /// End point of a synthesized to-animation, kept to re-seed its start.
    to_point: Option<[f32; 2]>,
}

impl MotionSampler {
    pub fn build(
        decl: &AnimationDecl,
        path: Option<&[PathCommand]>,
        key_points: Option<&[f32]>,
        rotate: MotionRotate,
        underlying: Option<&Value>,
        cfg: &Config,
    ) -> Result<(Self, Composition)> {
        let (motion_path, form, to_point) = match path {
            Some(commands) => (
                MotionPath::from_commands(commands, cfg.path_accuracy)?,
                ValuesForm::Values,
                None,
            ),
            None => {
                let source = ValueSource {
                    values: decl.values.as_deref(),
                    from: decl.from.as_ref(),
                    to: decl.to.as_ref(),
                    by: decl.by.as_ref(),
                };
                let base = underlying.and_then(Value::as_point).map(Value::Point);
                let resolved = source.resolve(base.as_ref())?;
                let points = resolved
                    .values
                    .iter()
                    .map(|v| {
                        v.as_point().ok_or_else(|| {
                            CompositorError::malformed("values", "motion keyframes must be points")
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                let to_point = (resolved.form == ValuesForm::To).then(|| points[points.len() - 1]);
                (
                    MotionPath::polyline(&points, cfg.path_accuracy)?,
                    resolved.form,
                    to_point,
                )
            }
        };
        let composition = Composition::for_form(form, decl.additive, decl.cumulative);

        if let Some(kp) = key_points {
            if kp.is_empty() {
                return Err(CompositorError::malformed("keyPoints", "list is empty"));
            }
            if kp.iter().any(|v| !v.is_finite() || !(0.0..=1.0).contains(v)) {
                return Err(CompositorError::malformed("keyPoints", "entries must lie in [0,1]"));
            }
        }
        let paced = decl.calc_mode == CalcMode::Paced;
        let supplied_points = key_points.filter(|_| !paced);
        let count = supplied_points.map_or(motion_path.segments.len() + 1, <[f32]>::len);

        let keyframes = Keyframes::resolve(
            decl.calc_mode,
            decl.key_times.as_deref(),
            decl.key_splines.as_deref(),
            count,
            || motion_path.segment_fractions(),
            cfg,
        )?;
        let key_points = match supplied_points {
            Some(kp) => kp.to_vec(),
            None => motion_path
                .segment_fractions()
                .unwrap_or_else(|| even_key_times(CalcMode::Linear, count)),
        };
        if key_points.len() != keyframes.key_times().len() {
            return Err(CompositorError::malformed(
                "keyPoints",
                format!(
                    "expected {} entries, found {}",
                    keyframes.key_times().len(),
                    key_points.len()
                ),
            ));
        }

        Ok((
            Self {
                path: motion_path,
                keyframes,
                key_points,
                rotate,
                cumulative: composition.cumulative,
                to_point,
            },
            composition,
        ))
    }

    #[inline]
    pub fn keyframes(&self) -> &Keyframes {
        &self.keyframes
    }

    #[inline]
    pub fn key_points(&self) -> &[f32] {
        &self.key_points
    }

    /// Total arc length of the motion path.
    #[inline]
    pub fn path_length(&self) -> f64 {
        self.path.total()
    }

    /// Re-seed a to-animation's start from a new underlying value.
    pub fn set_underlying(&mut self, underlying: Option<&Value>) {
        let Some(to) = self.to_point else {
            return;
        };
        let from = underlying.and_then(Value::as_point).unwrap_or([0.0, 0.0]);
        if let Ok(path) = MotionPath::polyline(&[from, to], self.path.accuracy) {
            self.path = path;
        }
    }

    pub fn sample(&self, unit_time: f32, iteration: u32) -> Value {
        let kp = &self.key_points;
        let along = match self.keyframes.locate(unit_time) {
            KeyPosition::Final => kp[kp.len() - 1],
            KeyPosition::At { index } => kp[index],
            KeyPosition::Between { index, fraction } => {
                kp[index] + fraction * (kp[index + 1] - kp[index])
            }
        };
        let (p, tangent) = self.path.sample(along as f64 * self.path.total());
        let angle = match self.rotate {
            MotionRotate::Angle(deg) => deg,
            MotionRotate::Auto => tangent as f32,
            MotionRotate::AutoReverse => (tangent + 180.0) as f32,
        };
        let value = Value::Motion {
            x: p.x as f32,
            y: p.y as f32,
            angle,
        };
        if self.cumulative && iteration > 0 {
            let end = self.path.end_point();
            let acc = Value::Motion {
                x: end.x as f32,
                y: end.y as f32,
                angle: 0.0,
            };
            value.interpolate(None, 0.0, Some(&acc), iteration)
        } else {
            value
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::SamplerDecl;

    fn approx(a: f32, b: f32, eps: f32) {
        assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
    }

    fn motion(decl: &AnimationDecl) -> Result<(MotionSampler, Composition)> {
        let (path, key_points, rotate) = match &decl.sampler {
            SamplerDecl::Motion {
                path,
                key_points,
                rotate,
            } => (path.as_deref(), key_points.as_deref(), *rotate),
            _ => (None, None, MotionRotate::default()),
        };
        MotionSampler::build(decl, path, key_points, rotate, None, &Config::default())
    }

    fn xy(v: &Value) -> [f32; 2] {
        v.as_point().unwrap()
    }

    #[test]
    fn paced_polyline_moves_at_constant_speed() {
        let decl = AnimationDecl::values(vec![
            Value::Point([0.0, 0.0]),
            Value::Point([10.0, 0.0]),
            Value::Point([10.0, 30.0]),
        ])
        .with_calc_mode(CalcMode::Paced);
        let (s, _) = motion(&decl).unwrap();
        assert_eq!(s.keyframes().key_times(), &[0.0, 0.25, 1.0]);
        let p = xy(&s.sample(0.5, 0));
        approx(p[0], 10.0, 1e-3);
        approx(p[1], 10.0, 1e-3);
    }

    #[test]
    fn linear_polyline_spends_equal_time_per_segment() {
        let decl = AnimationDecl::values(vec![
            Value::Point([0.0, 0.0]),
            Value::Point([10.0, 0.0]),
            Value::Point([10.0, 30.0]),
        ]);
        let (s, _) = motion(&decl).unwrap();
        let p = xy(&s.sample(0.5, 0));
        approx(p[0], 10.0, 1e-3);
        approx(p[1], 0.0, 1e-3);
    }

    #[test]
    fn explicit_curve_samples_by_arc_length() {
        let decl = AnimationDecl::default()
            .with_calc_mode(CalcMode::Paced)
            .with_sampler(SamplerDecl::Motion {
                path: Some(vec![
                    PathCommand::MoveTo { x: 0.0, y: 0.0 },
                    PathCommand::CurveTo {
                        x1: 0.0,
                        y1: 0.0,
                        x2: 0.0,
                        y2: 0.0,
                        x: 100.0,
                        y: 0.0,
                    },
                ]),
                key_points: None,
                rotate: MotionRotate::Auto,
            });
        let (s, _) = motion(&decl).unwrap();
        // Control points bunched at the start: parametric t=0.5 sits at x=12.5,
        // arc-length midpoint sits at x=50.
        let v = s.sample(0.5, 0);
        approx(xy(&v)[0], 50.0, 0.05);
        match v {
            Value::Motion { angle, .. } => approx(angle, 0.0, 1e-3),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rotate_policies() {
        let base = AnimationDecl::from_to(Value::Point([0.0, 0.0]), Value::Point([0.0, 10.0]));
        for (rotate, expected) in [
            (MotionRotate::Auto, 90.0),
            (MotionRotate::AutoReverse, 270.0),
            (MotionRotate::Angle(30.0), 30.0),
        ] {
            let decl = base.clone().with_sampler(SamplerDecl::Motion {
                path: None,
                key_points: None,
                rotate,
            });
            let (s, _) = motion(&decl).unwrap();
            match s.sample(0.3, 0) {
                Value::Motion { angle, .. } => approx(angle, expected, 1e-3),
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn key_points_remap_distance() {
        let decl = AnimationDecl::from_to(Value::Point([0.0, 0.0]), Value::Point([100.0, 0.0]))
            .with_sampler(SamplerDecl::Motion {
                path: None,
                key_points: Some(vec![1.0, 0.0]),
                rotate: MotionRotate::default(),
            });
        let (s, _) = motion(&decl).unwrap();
        approx(xy(&s.sample(0.25, 0))[0], 75.0, 1e-3);
        approx(xy(&s.sample(1.0, 0))[0], 0.0, 1e-3);
    }

    #[test]
    fn malformed_inputs() {
        let segment = |key_points: Option<Vec<f32>>| {
            AnimationDecl::from_to(Value::Point([0.0, 0.0]), Value::Point([1.0, 0.0]))
                .with_sampler(SamplerDecl::Motion {
                    path: None,
                    key_points,
                    rotate: MotionRotate::default(),
                })
        };
        let err = |decl: AnimationDecl| motion(&decl).unwrap_err();

        let bad_points = segment(Some(vec![0.0, 0.5, 1.0])).with_key_times(vec![0.0, 1.0]);
        assert_eq!(err(bad_points).attribute(), Some("keyTimes"));
        let out_of_range = segment(Some(vec![0.0, 1.5]));
        assert_eq!(err(out_of_range).attribute(), Some("keyPoints"));
        assert_eq!(err(segment(Some(vec![]))).attribute(), Some("keyPoints"));

        let no_move = AnimationDecl::default().with_sampler(SamplerDecl::Motion {
            path: Some(vec![PathCommand::LineTo { x: 1.0, y: 1.0 }]),
            key_points: None,
            rotate: MotionRotate::default(),
        });
        assert_eq!(err(no_move).attribute(), Some("path"));

        let numbers = AnimationDecl::from_to(Value::Number(0.0), Value::Number(1.0))
            .with_sampler(SamplerDecl::Motion {
                path: None,
                key_points: None,
                rotate: MotionRotate::default(),
            });
        assert_eq!(err(numbers).attribute(), Some("values"));
    }

    #[test]
    fn cumulative_motion_offsets_by_path_end() {
        let decl = AnimationDecl::from_to(Value::Point([0.0, 0.0]), Value::Point([10.0, 0.0]))
            .cumulative(true)
            .with_sampler(SamplerDecl::Motion {
                path: None,
                key_points: None,
                rotate: MotionRotate::default(),
            });
        let (s, c) = motion(&decl).unwrap();
        assert!(c.cumulative);
        approx(xy(&s.sample(0.5, 2))[0], 25.0, 1e-3);
    }

    #[test]
    fn to_motion_reseeds_from_underlying() {
        let decl = AnimationDecl {
            to: Some(Value::Point([10.0, 0.0])),
            ..AnimationDecl::default()
        }
        .with_sampler(SamplerDecl::Motion {
                path: None,
                key_points: None,
                rotate: MotionRotate::default(),
            });
        let (mut s, c) = motion(&decl).unwrap();
        assert!(c.to_animation);
        approx(xy(&s.sample(0.5, 0))[0], 5.0, 1e-3);
        s.set_underlying(Some(&Value::Point([20.0, 0.0])));
        approx(xy(&s.sample(0.5, 0))[0], 15.0, 1e-3);
    }
}
