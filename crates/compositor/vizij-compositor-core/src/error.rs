//! Error types for the compositor.

use serde::{Deserialize, Serialize};

/// Errors raised while building animations. Runtime composition never fails.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum CompositorError {
    /// A declaration attribute failed validation; the animation was not built.
    #[error("malformed animation attribute '{attribute}': {reason}")]
    MalformedAnimationSpec { attribute: String, reason: String },

    /// Declaration JSON could not be decoded.
    #[error("animation declaration json: {0}")]
    Json(String),
}

impl CompositorError {
    pub fn malformed(attribute: &str, reason: impl Into<String>) -> Self {
        Self::MalformedAnimationSpec {
            attribute: attribute.to_string(),
            reason: reason.into(),
        }
    }

    /// Name of the offending attribute for malformed declarations.
    pub fn attribute(&self) -> Option<&str> {
        match self {
            Self::MalformedAnimationSpec { attribute, .. } => Some(attribute),
            Self::Json(_) => None,
        }
    }
}

impl From<serde_json::Error> for CompositorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CompositorError>;
