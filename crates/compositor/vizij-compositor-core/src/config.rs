//! Core configuration for vizij-compositor-core.

use serde::{Deserialize, Serialize};

/// Numerical tolerances shared by every animation built against an engine.
/// Keep this minimal; expand as needed without breaking API.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Accepted x-axis error when inverting a keySpline cubic.
    pub spline_tolerance: f32,
    /// Upper bound on bisection steps for keySpline inversion.
    pub spline_max_iterations: u32,
    /// Accuracy passed to arc-length queries on motion paths.
    pub path_accuracy: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spline_tolerance: 1e-3,
            spline_max_iterations: 30,
            path_accuracy: 1e-4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: Config = serde_json::from_str(r#"{ "splineTolerance": 0.01 }"#).unwrap();
        assert_eq!(cfg.spline_tolerance, 0.01);
        assert_eq!(cfg.spline_max_iterations, 30);
        assert_eq!(cfg.path_accuracy, 1e-4);
    }
}
