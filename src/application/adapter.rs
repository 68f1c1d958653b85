// ============================================================
// Layer 2 — Candidate Adapter
// ============================================================
// Turns the selected candidate into a model of the target's
// declared architecture.
//
// Two paths:
//   - exact reuse: the candidate's typed signature equals the
//     target's. Only plain, strictly sequential linear MLPs live
//     in the store, so signature equality is also the "ordinary
//     architecture" gate the narrow special case requires. The
//     candidate's parameters are used as-is; no optimization.
//   - regression adaptation (default): distill the candidate's
//     learned function into the target architecture by pointwise
//     mean-squared regression over the problem's grid points.
//
// Either way the returned model has exactly the target's
// declared architecture — adaptation changes parameters, never
// shape.

use burn::{prelude::*, tensor::backend::AutodiffBackend};

use super::selector::Candidate;
use crate::ml::model::Mlp;
use crate::ml::regression::{fit_pointwise, RegressionOutcome, RegressionSchedule};

/// Which path `adapt` took, plus the regression outcome when the
/// distillation path ran.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptReport {
    pub reused_directly: bool,
    pub regression: Option<RegressionOutcome>,
}

/// Resolve `candidate` into the shape of `target`.
pub fn adapt<B: AutodiffBackend>(
    candidate: Candidate<B>,
    target: Mlp<B>,
    grid: &Tensor<B, 2>,
    schedule: &RegressionSchedule,
    verbose: bool,
) -> (Mlp<B>, AdaptReport) {
    if candidate.model.signature() == target.signature() {
        if verbose {
            println!("using model from cache");
        }
        tracing::debug!(candidate = %candidate.name, "exact architecture match, reusing cached parameters");
        return (
            candidate.model,
            AdaptReport { reused_directly: true, regression: None },
        );
    }

    tracing::debug!(
        candidate = %candidate.name,
        "architectures differ, distilling the cached function into the target"
    );
    // The candidate only provides regression targets; detaching keeps
    // its parameters out of the gradient graph.
    let targets = candidate.model.forward(grid.clone()).detach();
    let (model, outcome) = fit_pointwise(target, grid.clone(), targets, schedule, verbose);
    (
        model,
        AdaptReport { reused_directly: false, regression: Some(outcome) },
    )
}
