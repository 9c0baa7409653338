//! Vizij Compositor Core (engine-agnostic)
//!
//! Timed attribute animation in the SMIL model: every (target, kind, attribute)
//! owns a *sandwich* of animations ordered by priority. A timing source drives
//! activation and sampling; each [`Engine::tick`] composes the dirty sandwiches
//! bottom-up (additive layers sum, replacing layers occlude) and pushes the
//! results to a [`TargetHost`].
//!
//! Interpolation covers discrete/linear/paced/spline calc modes with keyTimes
//! and keySplines, plus motion along paths and per-component transforms.

pub mod animation;
pub mod config;
pub mod decl;
pub mod engine;
pub mod error;
pub mod ids;
pub mod interp;
pub mod sampler;
mod sandwich;
pub mod target;
pub mod value;

// Re-exports for consumers (adapters)
pub use animation::Animation;
pub use config::Config;
pub use decl::{AnimationDecl, MotionRotate, PathCommand, SamplerDecl, ValueSource, ValuesForm};
pub use engine::Engine;
pub use error::{CompositorError, Result};
pub use ids::{AnimationId, IdAllocator};
pub use interp::{CalcMode, KeyPosition, Keyframes};
pub use sampler::{Composition, MotionSampler, Sampler, SimpleSampler, TransformSampler};
pub use target::{AttributeKey, AttributeKind, SandwichKey, TargetHost, TargetId};
pub use value::{AnimatableValue, TransformKind, TransformValue, Value, ValueKind};
