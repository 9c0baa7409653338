//! Interpolation core shared by every sampler.
//!
//! `functions` holds the numeric blends and keySpline easing; `keyframes`
//! owns calc-mode resolution and keyTimes/keySplines validation.

pub mod functions;
pub mod keyframes;

pub use keyframes::{CalcMode, KeyPosition, Keyframes};
