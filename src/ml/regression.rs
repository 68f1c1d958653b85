// ============================================================
// Layer 5 — Pointwise Regression
// ============================================================
// One loop, two callers:
//
//   - the adapter distills a cached model's learned function
//     into a target architecture of a different shape
//   - the matrix-mode bridge fits a parametric proxy to dense
//     values on a grid
//
// Both are supervised regression against fixed targets, not a
// solve of the governing equation: the loop only needs to
// reproduce a function's values over the grid, so plain
// mean-squared error with Adam is enough.
//
// Termination: loss below `tolerance` or `max_steps` reached —
// there is no other cancellation mechanism, a run that neither
// converges nor exhausts the cap keeps blocking the caller.

use burn::{
    nn::loss::{MseLoss, Reduction},
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use serde::{Deserialize, Serialize};

use super::model::Mlp;

/// Tunable constants of the regression loop. The defaults are used
/// throughout the cache: stop below 1e-5 mean squared error or after
/// 1e5 Adam steps, whichever comes first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionSchedule {
    pub lr: f64,
    pub tolerance: f64,
    pub max_steps: usize,
    /// Verbose progress is printed every `log_every` steps.
    pub log_every: usize,
}

impl Default for RegressionSchedule {
    fn default() -> Self {
        Self {
            lr: 1e-3,
            tolerance: 1e-5,
            max_steps: 100_000,
            log_every: 1_000,
        }
    }
}

/// What the loop did: how many steps ran, where the loss ended up,
/// and whether the tolerance was reached before the step cap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionOutcome {
    pub steps: usize,
    pub final_loss: f64,
    pub converged: bool,
}

/// Fit `model` so that `model(inputs) ≈ targets` in mean squared error.
///
/// A fresh Adam optimizer is built over the model's parameters; the
/// targets are detached so no gradient flows into whatever produced
/// them. Returns the trained model together with the loop outcome.
pub fn fit_pointwise<B: AutodiffBackend>(
    mut model: Mlp<B>,
    inputs: Tensor<B, 2>,
    targets: Tensor<B, 2>,
    schedule: &RegressionSchedule,
    verbose: bool,
) -> (Mlp<B>, RegressionOutcome) {
    let mut optim = AdamConfig::new().init();
    let mse = MseLoss::new();
    let targets = targets.detach();

    let mut loss_value = f64::INFINITY;
    let mut steps = 0;
    while loss_value > schedule.tolerance && steps < schedule.max_steps {
        let prediction = model.forward(inputs.clone());
        let loss = mse.forward(prediction, targets.clone(), Reduction::Mean);
        loss_value = loss.clone().into_scalar().elem::<f64>();

        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &model);
        model = optim.step(schedule.lr, model, grads);
        steps += 1;

        if verbose && steps % schedule.log_every == 0 {
            println!("Interpolate from trained model t={steps}, loss={loss_value}");
        }
    }

    let converged = loss_value <= schedule.tolerance;
    if verbose {
        println!("Interpolation finished t={steps}, loss={loss_value}");
    }
    tracing::debug!(steps, loss = loss_value, converged, "pointwise regression done");

    (model, RegressionOutcome { steps, final_loss: loss_value, converged })
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::MlpConfig;
    use burn::tensor::TensorData;

    type B = burn::backend::Autodiff<burn::backend::NdArray>;

    #[test]
    fn default_schedule_matches_documented_constants() {
        let s = RegressionSchedule::default();
        assert_eq!(s.tolerance, 1e-5);
        assert_eq!(s.max_steps, 100_000);
    }

    #[test]
    fn zero_step_cap_returns_unconverged() {
        let device = Default::default();
        let model = MlpConfig::new(vec![1, 4, 1]).init::<B>(&device);
        let inputs = Tensor::<B, 2>::zeros([3, 1], &device);
        let targets = Tensor::<B, 2>::ones([3, 1], &device);
        let schedule = RegressionSchedule { max_steps: 0, ..Default::default() };
        let (_, outcome) = fit_pointwise(model, inputs, targets, &schedule, false);
        assert_eq!(outcome.steps, 0);
        assert!(!outcome.converged);
    }

    #[test]
    fn fits_a_linear_function() {
        let device = Default::default();
        let model = MlpConfig::new(vec![1, 8, 1]).init::<B>(&device);
        let xs: Vec<f32> = (0..20).map(|i| i as f32 / 20.0).collect();
        let ys: Vec<f32> = xs.iter().map(|x| 2.0 * x - 0.5).collect();
        let inputs = Tensor::<B, 2>::from_data(TensorData::new(xs, [20, 1]), &device);
        let targets = Tensor::<B, 2>::from_data(TensorData::new(ys, [20, 1]), &device);
        let schedule = RegressionSchedule {
            lr: 1e-2,
            tolerance: 1e-3,
            max_steps: 5_000,
            ..Default::default()
        };
        let (_, outcome) = fit_pointwise(model, inputs, targets, &schedule, false);
        assert!(
            outcome.converged,
            "expected convergence, got loss {} after {} steps",
            outcome.final_loss, outcome.steps
        );
    }
}
