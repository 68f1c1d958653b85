// ============================================================
// Layer 3 — Collaborator Abstractions
// ============================================================
// The cache never computes the residual/boundary loss of the
// governing equation itself — that belongs to the solver. It
// consumes an externally supplied evaluator and treats it as an
// opaque, possibly expensive, black-box function.
//
// The trait is generic over the model representation so the same
// abstraction serves parametric models during selection and the
// dense grid matrix when the final projected result is re-scored.

use anyhow::Result;

/// Scalar loss of a model against the current problem instance,
/// with an optional normalized variant for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LossReport {
    pub loss: f64,
    pub normalized: Option<f64>,
}

impl LossReport {
    pub fn raw(loss: f64) -> Self {
        Self { loss, normalized: None }
    }

    pub fn normalized(loss: f64, normalized: f64) -> Self {
        Self { loss, normalized: Some(normalized) }
    }
}

// ─── LossEvaluator ────────────────────────────────────────────────────────────
/// Any component that can score a model against the current problem.
///
/// Implementations:
///   - the solver's residual/boundary loss over grid and operator
///   - plain closures in tests and the demo command
///
/// An `Err` from `evaluate` marks the candidate as unusable for this
/// pass; the selector skips it and keeps going.
pub trait LossEvaluator<M> {
    fn evaluate(&self, model: &M) -> Result<LossReport>;
}

/// Closures evaluate models directly; this keeps call sites free of
/// wrapper types.
impl<M, F> LossEvaluator<M> for F
where
    F: Fn(&M) -> Result<LossReport>,
{
    fn evaluate(&self, model: &M) -> Result<LossReport> {
        self(model)
    }
}
