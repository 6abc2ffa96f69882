/// Numeric and resource configuration shared by every engine in the crate.
///
/// All geometric comparisons go through [`GeomConfig::tolerance`]; the
/// algorithms themselves carry no hardcoded epsilons. Callers that need a
/// different strictness build a config with [`GeomConfig::with_tolerance`]
/// or set fields directly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeomConfig {
    /// Absolute tolerance for distance, orientation, and inclusion decisions.
    pub tolerance: f64,
    /// Iteration cap for Lloyd refinement in k-means.
    pub max_iterations: usize,
    /// Lower clamp on the number of boundary samples taken by the skeleton.
    pub min_samples: usize,
    /// Upper clamp on the number of boundary samples taken by the skeleton.
    pub max_samples: usize,
}

impl Default for GeomConfig {
    fn default() -> Self {
        GeomConfig {
            tolerance: 1e-9,
            max_iterations: 100,
            min_samples: 32,
            max_samples: 512,
        }
    }
}

impl GeomConfig {
    /// Default caps with a caller-chosen absolute tolerance.
    pub fn with_tolerance(tolerance: f64) -> Self {
        GeomConfig {
            tolerance,
            ..GeomConfig::default()
        }
    }
}
