//! Calc-mode resolution and keyframe lookup.
//!
//! Model:
//! - A keyframe table is a non-decreasing list of normalized stamps (`keyTimes`)
//!   in [0,1], one per keyframe.
//! - linear/paced/spline tables start at 0, end at 1 and hold at least two stamps;
//!   discrete tables start at 0.
//! - Spline tables carry one cubic easing curve per segment.
//! - Missing tables are synthesized: `i/(n-1)` for linear/spline, `i/n` for
//!   discrete, and cumulative distance over total distance for paced.

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{CompositorError, Result};
use crate::interp::functions::spline_ease;

/// Interpolation strategy between keyframes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CalcMode {
    Discrete,
    #[default]
    Linear,
    Paced,
    Spline,
}

impl CalcMode {
    /// Modes that blend between neighbouring keyframes.
    #[inline]
    pub fn interpolates(self) -> bool {
        !matches!(self, CalcMode::Discrete)
    }
}

/// With a single keyframe there is nothing to blend toward.
pub fn effective_calc_mode(mode: CalcMode, count: usize) -> CalcMode {
    if count <= 1 {
        CalcMode::Discrete
    } else {
        mode
    }
}

/// Check a supplied keyTimes list against the calc mode.
pub fn validate_key_times(mode: CalcMode, key_times: &[f32]) -> Result<()> {
    let Some(&first) = key_times.first() else {
        return Err(CompositorError::malformed("keyTimes", "list is empty"));
    };
    if first != 0.0 {
        return Err(CompositorError::malformed("keyTimes", "must start at 0"));
    }
    if mode.interpolates() {
        if key_times.len() < 2 {
            return Err(CompositorError::malformed(
                "keyTimes",
                "interpolating modes need at least two entries",
            ));
        }
        if key_times[key_times.len() - 1] != 1.0 {
            return Err(CompositorError::malformed("keyTimes", "must end at 1"));
        }
    }
    let mut last = 0.0f32;
    for &t in key_times {
        if !t.is_finite() || !(0.0..=1.0).contains(&t) {
            return Err(CompositorError::malformed(
                "keyTimes",
                format!("entry {t} outside [0,1]"),
            ));
        }
        if t < last {
            return Err(CompositorError::malformed(
                "keyTimes",
                "entries must be non-decreasing",
            ));
        }
        last = t;
    }
    Ok(())
}

/// Evenly spaced keyTimes for `count` keyframes.
pub fn even_key_times(mode: CalcMode, count: usize) -> Vec<f32> {
    match (mode, count) {
        (_, 0) => Vec::new(),
        (_, 1) => vec![0.0],
        (CalcMode::Discrete, n) => (0..n).map(|i| i as f32 / n as f32).collect(),
        (_, n) => (0..n).map(|i| i as f32 / (n - 1) as f32).collect(),
    }
}

/// Paced keyTimes from the distances between successive keyframes.
///
/// Returns `None` when the total distance is zero or not finite; callers fall
/// back to even spacing.
pub fn paced_key_times(distances: &[f32]) -> Option<Vec<f32>> {
    let total: f32 = distances.iter().sum();
    if !(total.is_finite() && total > 0.0) {
        return None;
    }
    let mut out = Vec::with_capacity(distances.len() + 1);
    let mut acc = 0.0f32;
    out.push(0.0);
    for d in &distances[..distances.len().saturating_sub(1)] {
        acc += d;
        out.push(acc / total);
    }
    out.push(1.0);
    Some(out)
}

/// Resolve the keyTimes table for `count` keyframes.
///
/// Supplied tables are validated first. Paced mode ignores a valid supplied
/// table and asks `paced` for one instead.
pub fn resolve_key_times(
    mode: CalcMode,
    supplied: Option<&[f32]>,
    count: usize,
    paced: impl FnOnce() -> Option<Vec<f32>>,
) -> Result<Vec<f32>> {
    if let Some(kt) = supplied {
        validate_key_times(mode, kt)?;
        if mode != CalcMode::Paced {
            if kt.len() != count {
                return Err(CompositorError::malformed(
                    "keyTimes",
                    format!("expected {count} entries, found {}", kt.len()),
                ));
            }
            return Ok(kt.to_vec());
        }
    }
    if mode == CalcMode::Paced {
        if let Some(kt) = paced() {
            return Ok(kt);
        }
        log::warn!("paced timing over non-paceable or zero-length keyframes; spacing evenly");
    }
    Ok(even_key_times(mode, count))
}

/// Resolve keySplines (four floats per segment) for spline mode.
pub fn resolve_key_splines(
    mode: CalcMode,
    supplied: Option<&[f32]>,
    key_times_len: usize,
) -> Result<Vec<[f32; 4]>> {
    if mode != CalcMode::Spline {
        return Ok(Vec::new());
    }
    let flat = supplied.ok_or_else(|| {
        CompositorError::malformed("keySplines", "required when calcMode is spline")
    })?;
    if flat.len() % 4 != 0 {
        return Err(CompositorError::malformed(
            "keySplines",
            "must hold four values per segment",
        ));
    }
    let segments = key_times_len.saturating_sub(1);
    if flat.len() / 4 != segments {
        return Err(CompositorError::malformed(
            "keySplines",
            format!("expected {segments} segments, found {}", flat.len() / 4),
        ));
    }
    if flat
        .iter()
        .any(|v| !v.is_finite() || !(0.0..=1.0).contains(v))
    {
        return Err(CompositorError::malformed(
            "keySplines",
            "control coordinates must lie in [0,1]",
        ));
    }
    Ok(flat
        .chunks_exact(4)
        .map(|c| [c[0], c[1], c[2], c[3]])
        .collect())
}

/// Where a unit time falls within a keyframe table.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum KeyPosition {
    /// Unit time 1: the final keyframe.
    Final,
    /// Discrete hold on keyframe `index`.
    At { index: usize },
    /// Between `index` and `index + 1`, with the (eased) blend fraction.
    Between { index: usize, fraction: f32 },
}

/// Resolved timing for one keyframe sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct Keyframes {
    calc_mode: CalcMode,
    key_times: Vec<f32>,
    splines: Vec<[f32; 4]>,
    spline_tolerance: f32,
    spline_max_iterations: u32,
}

impl Keyframes {
    pub fn new(
        calc_mode: CalcMode,
        key_times: Vec<f32>,
        splines: Vec<[f32; 4]>,
        cfg: &Config,
    ) -> Self {
        Self {
            calc_mode,
            key_times,
            splines,
            spline_tolerance: cfg.spline_tolerance,
            spline_max_iterations: cfg.spline_max_iterations,
        }
    }

    /// Validate and resolve a keyframe table in one step.
    pub fn resolve(
        mode: CalcMode,
        key_times: Option<&[f32]>,
        key_splines: Option<&[f32]>,
        count: usize,
        paced: impl FnOnce() -> Option<Vec<f32>>,
        cfg: &Config,
    ) -> Result<Self> {
        let mode = effective_calc_mode(mode, count);
        let times = resolve_key_times(mode, key_times, count, paced)?;
        let splines = resolve_key_splines(mode, key_splines, times.len())?;
        Ok(Self::new(mode, times, splines, cfg))
    }

    #[inline]
    pub fn calc_mode(&self) -> CalcMode {
        self.calc_mode
    }

    #[inline]
    pub fn key_times(&self) -> &[f32] {
        &self.key_times
    }

    /// Locate `unit_time` (clamped to [0,1]) in the table.
    pub fn locate(&self, unit_time: f32) -> KeyPosition {
        let u = unit_time.clamp(0.0, 1.0);
        let n = self.key_times.len();
        if u >= 1.0 || n == 0 {
            return KeyPosition::Final;
        }
        let mut index = 0;
        while index + 1 < n && u >= self.key_times[index + 1] {
            index += 1;
        }
        if !self.calc_mode.interpolates() || index + 1 >= n {
            return KeyPosition::At { index };
        }
        let t0 = self.key_times[index];
        let t1 = self.key_times[index + 1];
        let mut fraction = (u - t0) / (t1 - t0);
        if self.calc_mode == CalcMode::Spline && u != 0.0 {
            if let Some(ctrl) = self.splines.get(index) {
                fraction = spline_ease(
                    fraction,
                    *ctrl,
                    self.spline_tolerance,
                    self.spline_max_iterations,
                );
            }
        }
        KeyPosition::Between { index, fraction }
    }
}
