// ============================================================
// Layer 2 — Candidate Selector
// ============================================================
// Walks the stored pool (or a random subset of it), filters out
// structurally incompatible entries, and ranks the rest with
// the externally supplied residual-loss evaluator.
//
// Selection is approximate-match by evaluated loss, never exact
// key lookup: the "right" candidate is simply the one whose
// learned function scores best on the new problem instance.
//
// Skip policy:
//   - unreadable/corrupt entry        → skip, debug log
//   - input/output feature mismatch   → skip silently (expected
//     and common, not a fault)
//   - evaluator error on a candidate  → skip, debug log
// None of these abort the pass. An empty or all-incompatible
// pool yields the sentinel outcome with +infinity loss.

use burn::prelude::*;
use rand::{seq::index, Rng};

use crate::domain::signature::StructuralSignature;
use crate::domain::traits::LossEvaluator;
use crate::infra::store::{ModelStore, OptimizerSnapshot};
use crate::ml::model::Mlp;

/// A stored entry loaded for evaluation, with its score against the
/// current problem instance.
#[derive(Debug)]
pub struct Candidate<B: Backend> {
    pub name: String,
    pub model: Mlp<B>,
    pub optimizer: OptimizerSnapshot,
    pub loss: f64,
    pub normalized_loss: Option<f64>,
}

/// The best checkpoint found by a selection pass, or the sentinel
/// "none" when the pool was empty or nothing was compatible.
#[derive(Debug)]
pub struct SelectionOutcome<B: Backend> {
    pub best: Option<Candidate<B>>,
}

impl<B: Backend> SelectionOutcome<B> {
    pub fn none() -> Self {
        Self { best: None }
    }

    /// Loss of the best candidate; +infinity for the sentinel, so the
    /// caller can compare without special-casing the empty pool.
    pub fn loss(&self) -> f64 {
        self.best.as_ref().map(|c| c.loss).unwrap_or(f64::INFINITY)
    }
}

/// Search the pool for the best warm-start candidate.
///
/// With `sample_size` unset the entire pool is considered; otherwise
/// `sample_size` entries are drawn uniformly at random without
/// replacement (clamped to the pool size). The rng is injected so
/// callers wanting deterministic lookups can seed it.
pub fn select<B, E, R>(
    store: &ModelStore,
    target: &StructuralSignature,
    evaluator: &E,
    sample_size: Option<usize>,
    verbose: bool,
    device: &B::Device,
    rng: &mut R,
) -> SelectionOutcome<B>
where
    B: Backend,
    E: LossEvaluator<Mlp<B>>,
    R: Rng + ?Sized,
{
    let names = store.list();
    if names.is_empty() {
        return SelectionOutcome::none();
    }

    let picks: Vec<usize> = match sample_size {
        None => (0..names.len()).collect(),
        Some(n) => index::sample(rng, names.len(), n.min(names.len())).into_vec(),
    };

    let mut best: Option<Candidate<B>> = None;
    let mut min_loss = f64::INFINITY;

    for i in picks {
        let name = &names[i];
        let entry = match store.load::<B>(name, device) {
            Ok(entry) => entry,
            Err(error) => {
                tracing::debug!(%name, "skipping unreadable cache entry: {error:#}");
                continue;
            }
        };

        if !entry.model.signature().compatible_with(target) {
            continue;
        }

        let report = match evaluator.evaluate(&entry.model) {
            Ok(report) => report,
            Err(error) => {
                tracing::debug!(%name, "skipping candidate that failed evaluation: {error:#}");
                continue;
            }
        };

        // Strict improvement only — first-encountered order wins ties.
        if report.loss < min_loss {
            min_loss = report.loss;
            if verbose {
                println!(
                    "best model: {name}, loss={:.6e}, normalized_loss={:?}",
                    report.loss, report.normalized
                );
            }
            best = Some(Candidate {
                name: name.clone(),
                model: entry.model,
                optimizer: entry.optimizer,
                loss: report.loss,
                normalized_loss: report.normalized,
            });
        }
    }

    SelectionOutcome { best }
}
