// ============================================================
// Layer 2 — Matrix-Mode Bridge
// ============================================================
// The selector and adapter only understand parametric models. A
// matrix-mode solution — dense values on a fixed grid — crosses
// that gap through a feed-forward proxy:
//
//   matrix values ──fit──► proxy MLP ──cache/select/adapt──►
//   resolved proxy ──evaluate at grid──► matrix values again
//
// The proxy is fitted by the same pointwise regression the
// adapter uses. Its default architecture (three hidden tanh
// layers of width 100) is sized to the grid's input dimension
// and the matrix's output dimension.

use anyhow::{bail, Result};
use burn::{prelude::*, tensor::backend::AutodiffBackend};

use crate::infra::store::{ModelStore, OptimizerSnapshot, SaveOutcome};
use crate::ml::model::{Mlp, MlpConfig};
use crate::ml::regression::{fit_pointwise, RegressionOutcome, RegressionSchedule};

/// Hidden width of the default proxy architecture.
pub const DEFAULT_PROXY_WIDTH: usize = 100;

/// Default proxy: three hidden layers of `width`, tanh activation.
pub fn default_proxy(in_features: usize, out_features: usize, width: usize) -> MlpConfig {
    MlpConfig::new(vec![in_features, width, width, width, out_features])
}

/// Fit a parametric proxy to dense grid values.
///
/// `values` is [n_points, out_features], `grid` is [n_points,
/// in_features]. A dimension mismatch between grid, values, and a
/// supplied proxy architecture is a caller bug and a hard error —
/// unlike pool candidates, there is nothing to skip to.
pub fn bridge<B: AutodiffBackend>(
    values: &Tensor<B, 2>,
    grid: &Tensor<B, 2>,
    proxy: Option<MlpConfig>,
    schedule: &RegressionSchedule,
    verbose: bool,
    device: &B::Device,
) -> Result<(Mlp<B>, RegressionOutcome)> {
    let [n_points, in_features] = grid.dims();
    let [n_values, out_features] = values.dims();
    if n_points != n_values {
        bail!("grid has {n_points} points but the matrix holds {n_values} rows");
    }

    let config =
        proxy.unwrap_or_else(|| default_proxy(in_features, out_features, DEFAULT_PROXY_WIDTH));
    if config.layer_sizes.first() != Some(&in_features)
        || config.layer_sizes.last() != Some(&out_features)
    {
        bail!(
            "proxy architecture {:?} does not fit a {in_features}-in/{out_features}-out problem",
            config.layer_sizes
        );
    }

    let proxy_model = config.init::<B>(device);
    let (proxy_model, outcome) =
        fit_pointwise(proxy_model, grid.clone(), values.clone().detach(), schedule, verbose);
    Ok((proxy_model, outcome))
}

/// Project a parametric model back onto the grid: evaluate it at
/// every grid point and return the dense values.
pub fn project<B: AutodiffBackend>(model: &Mlp<B>, grid: &Tensor<B, 2>) -> Tensor<B, 2> {
    model.forward(grid.clone()).detach()
}

/// Matrix-mode save: fit a proxy to the solved grid values, then
/// persist the proxy like any parametric entry. The stored optimizer
/// snapshot records the regression's learning rate and step count.
pub fn save_matrix<B: AutodiffBackend>(
    store: &ModelStore,
    values: &Tensor<B, 2>,
    grid: &Tensor<B, 2>,
    proxy: Option<MlpConfig>,
    name: Option<&str>,
    schedule: &RegressionSchedule,
    verbose: bool,
    device: &B::Device,
) -> Result<SaveOutcome> {
    let (proxy_model, outcome) = bridge(values, grid, proxy, schedule, verbose, device)?;
    let optimizer = OptimizerSnapshot {
        lr: schedule.lr,
        steps: outcome.steps,
        ..Default::default()
    };
    Ok(store.save(&proxy_model, optimizer, None, name))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    type B = burn::backend::Autodiff<burn::backend::NdArray>;

    #[test]
    fn mismatched_point_counts_are_rejected() {
        let device = Default::default();
        let grid = Tensor::<B, 2>::zeros([10, 1], &device);
        let values = Tensor::<B, 2>::zeros([9, 1], &device);
        let schedule = RegressionSchedule::default();
        assert!(bridge(&values, &grid, None, &schedule, false, &device).is_err());
    }

    #[test]
    fn mismatched_proxy_architecture_is_rejected() {
        let device = Default::default();
        let grid = Tensor::<B, 2>::zeros([10, 2], &device);
        let values = Tensor::<B, 2>::zeros([10, 1], &device);
        let proxy = MlpConfig::new(vec![3, 8, 1]); // wrong input width
        let schedule = RegressionSchedule::default();
        assert!(bridge(&values, &grid, Some(proxy), &schedule, false, &device).is_err());
    }

    #[test]
    fn default_proxy_has_three_hidden_layers() {
        let config = default_proxy(2, 1, DEFAULT_PROXY_WIDTH);
        assert_eq!(config.layer_sizes, vec![2, 100, 100, 100, 1]);
    }
}
