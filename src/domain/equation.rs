// ============================================================
// Layer 3 — Operator Coefficient Forms
// ============================================================
// The PDE term language itself lives in the solver, not here.
// The cache only needs a thin view of an operator's terms so the
// matrix-mode bridge can normalize coefficients before a cached
// proxy is compared against a new problem:
//
//   - coefficients given as values over grid points are reshaped
//     to a single column, so the same coefficient stored from
//     grids of different layouts compares equal
//   - coefficients given as callables cannot be compared by
//     value at all; they are flagged with a logged warning, not
//     rejected

use std::fmt;
use std::sync::Arc;

/// A coefficient attached to one operator term.
#[derive(Clone)]
pub enum Coefficient {
    /// A plain scalar constant.
    Constant(f64),
    /// Values over grid points, with the layout they were produced in.
    /// Normalization flattens `shape` to a single column.
    PointValues { values: Vec<f64>, shape: Vec<usize> },
    /// A grid-dependent function. Unreliable for cache matching:
    /// two closures cannot be compared by value.
    Function(Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>),
}

impl fmt::Debug for Coefficient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coefficient::Constant(c) => write!(f, "Constant({c})"),
            Coefficient::PointValues { values, shape } => {
                write!(f, "PointValues(len={}, shape={:?})", values.len(), shape)
            }
            Coefficient::Function(_) => write!(f, "Function(..)"),
        }
    }
}

impl PartialEq for Coefficient {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Coefficient::Constant(a), Coefficient::Constant(b)) => a == b,
            (
                Coefficient::PointValues { values: a, .. },
                Coefficient::PointValues { values: b, .. },
            ) => a == b,
            // Callables never compare equal, even to themselves.
            _ => false,
        }
    }
}

/// One term of the governing operator, as far as the cache cares:
/// a label and a coefficient.
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorTerm {
    pub label: String,
    pub coeff: Coefficient,
}

/// The operator view handed to the matrix-mode bridge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Operator {
    pub terms: Vec<OperatorTerm>,
}

impl Operator {
    pub fn new(terms: Vec<OperatorTerm>) -> Self {
        Self { terms }
    }

    /// Normalized copy: grid-shaped coefficient values become a single
    /// column; callable coefficients stay as-is but emit a warning
    /// because they may lead to a wrong cache item choice.
    pub fn normalized(&self) -> Operator {
        let terms = self
            .terms
            .iter()
            .map(|term| {
                let coeff = match &term.coeff {
                    Coefficient::PointValues { values, .. } => Coefficient::PointValues {
                        values: values.clone(),
                        shape: vec![values.len(), 1],
                    },
                    Coefficient::Function(f) => {
                        tracing::warn!(
                            term = %term.label,
                            "coefficient is callable, it may lead to wrong cache item choice"
                        );
                        Coefficient::Function(f.clone())
                    }
                    Coefficient::Constant(c) => Coefficient::Constant(*c),
                };
                OperatorTerm { label: term.label.clone(), coeff }
            })
            .collect();
        Operator { terms }
    }

    /// True when any term's coefficient cannot be compared by value.
    pub fn has_unreliable_coefficients(&self) -> bool {
        self.terms
            .iter()
            .any(|t| matches!(t.coeff, Coefficient::Function(_)))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_reshapes_point_values_to_column() {
        let op = Operator::new(vec![OperatorTerm {
            label: "d2u/dx2".into(),
            coeff: Coefficient::PointValues {
                values: vec![1.0, 2.0, 3.0, 4.0],
                shape: vec![2, 2],
            },
        }]);
        let norm = op.normalized();
        match &norm.terms[0].coeff {
            Coefficient::PointValues { shape, values } => {
                assert_eq!(shape, &vec![4, 1]);
                assert_eq!(values, &vec![1.0, 2.0, 3.0, 4.0]);
            }
            other => panic!("unexpected coefficient {other:?}"),
        }
    }

    #[test]
    fn callable_coefficients_are_flagged_not_rejected() {
        let op = Operator::new(vec![OperatorTerm {
            label: "du/dt".into(),
            coeff: Coefficient::Function(Arc::new(|x: &[f64]| x[0].sin())),
        }]);
        assert!(op.has_unreliable_coefficients());
        // normalization keeps the term and succeeds
        assert_eq!(op.normalized().terms.len(), 1);
    }

    #[test]
    fn callables_never_compare_equal() {
        let f: Arc<dyn Fn(&[f64]) -> f64 + Send + Sync> = Arc::new(|_| 0.0);
        let a = Coefficient::Function(f.clone());
        let b = Coefficient::Function(f);
        assert_ne!(a, b);
        assert_eq!(Coefficient::Constant(2.0), Coefficient::Constant(2.0));
    }
}
