use std::fmt;

/// Result alias used by every fallible operation in the crate.
pub type GeomResult<T> = Result<T, GeomError>;

/// Failure taxonomy shared by all engines.
///
/// Every variant is an expected, recoverable outcome of feeding real-world
/// data to a geometric algorithm: callers can retry with a relaxed tolerance,
/// fall back to another strategy, or report the condition upstream. Nothing
/// in the crate panics on bad input.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum GeomError {
    /// Too few input elements for the requested algorithm.
    InvalidCount {
        op: &'static str,
        required: usize,
        actual: usize,
    },

    /// A numeric parameter is outside its valid range.
    InvalidParameter {
        op: &'static str,
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// No strategy exists for this pairing of element kinds.
    UnsupportedCombination {
        source: &'static str,
        query: &'static str,
    },

    /// Coincident, collinear, or coplanar input defeats the construction.
    DegenerateGeometry { op: &'static str, context: String },

    /// An internal invariant failed and the partial result is unusable.
    AlgorithmFailure { op: &'static str, context: String },

    /// The medial axis requires a single closed planar boundary loop.
    NonPlanar { context: String },
}

impl fmt::Display for GeomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeomError::InvalidCount {
                op,
                required,
                actual,
            } => write!(f, "{op}: requires at least {required} elements, got {actual}"),
            GeomError::InvalidParameter {
                op,
                name,
                value,
                reason,
            } => write!(f, "{op}: invalid {name} = {value} ({reason})"),
            GeomError::UnsupportedCombination { source, query } => {
                write!(f, "no overlap strategy for {source} paired with {query}")
            }
            GeomError::DegenerateGeometry { op, context } => {
                write!(f, "{op}: degenerate geometry ({context})")
            }
            GeomError::AlgorithmFailure { op, context } => {
                write!(f, "{op}: algorithm failure ({context})")
            }
            GeomError::NonPlanar { context } => {
                write!(f, "boundary is not planar: {context}")
            }
        }
    }
}

impl std::error::Error for GeomError {}

impl GeomError {
    /// Stable machine-readable code, for dispatching on failures across a
    /// logging or serialization boundary without parsing messages.
    pub fn code(&self) -> &'static str {
        match self {
            GeomError::InvalidCount { .. } => "invalid_count",
            GeomError::InvalidParameter { .. } => "invalid_parameter",
            GeomError::UnsupportedCombination { .. } => "unsupported_combination",
            GeomError::DegenerateGeometry { .. } => "degenerate_geometry",
            GeomError::AlgorithmFailure { .. } => "algorithm_failure",
            GeomError::NonPlanar { .. } => "non_planar",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let err = GeomError::InvalidParameter {
            op: "dbscan",
            name: "epsilon",
            value: -1.0,
            reason: "must be positive",
        };
        assert_eq!(err.code(), "invalid_parameter");
        let text = err.to_string();
        assert!(text.contains("dbscan"), "missing op in: {}", text);
        assert!(text.contains("epsilon"), "missing name in: {}", text);
    }

    #[test]
    fn codes_are_distinct() {
        let errors = [
            GeomError::InvalidCount {
                op: "t",
                required: 3,
                actual: 0,
            },
            GeomError::UnsupportedCombination {
                source: "points",
                query: "boxes",
            },
            GeomError::DegenerateGeometry {
                op: "t",
                context: String::new(),
            },
            GeomError::AlgorithmFailure {
                op: "t",
                context: String::new(),
            },
            GeomError::NonPlanar {
                context: String::new(),
            },
        ];
        for (i, a) in errors.iter().enumerate() {
            for b in errors.iter().skip(i + 1) {
                assert_ne!(a.code(), b.code());
            }
        }
    }
}
