// ============================================================
// Layer 2 — Warm-Start Orchestrator
// ============================================================
// The entry point the solver glue calls before starting its
// optimization loop. Dispatch by solving mode:
//
//   parametric — select + adapt directly on the target model
//   matrix     — bridge the dense grid values into a parametric
//                proxy first, run the same pipeline on it, then
//                project the resolved proxy back onto the grid
//
// After adaptation — including the exact-reuse path — a bounded
// symmetric perturbation is applied to every weight and bias, so
// a cache hit never replays an identical previously-converged
// optimum.
//
// All randomness (candidate sampling and perturbation) flows
// from one rng owned here; `with_seed` makes a whole pipeline
// run reproducible.

use anyhow::Result;
use burn::{prelude::*, tensor::backend::AutodiffBackend};
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::adapter::{adapt, AdaptReport};
use super::bridge::{bridge, default_proxy, project, DEFAULT_PROXY_WIDTH};
use super::selector::select;
use crate::domain::equation::Operator;
use crate::domain::traits::{LossEvaluator, LossReport};
use crate::infra::store::{GradScalerSnapshot, ModelStore, OptimizerSnapshot, SaveOutcome};
use crate::ml::model::{Mlp, MlpConfig};
use crate::ml::regression::RegressionSchedule;

// ─── Cache Configuration ─────────────────────────────────────────────────────
// The full configuration surface of the cache subsystem. Serializable
// so solver glue can persist or log the exact settings of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Storage location; created if missing.
    pub cache_dir: String,
    /// Bound on candidates evaluated per lookup; `None` = exhaustive.
    pub sample_size: Option<usize>,
    /// Per-candidate diagnostic output.
    pub verbose: bool,
    /// Epsilon of the post-selection perturbation.
    pub randomize_eps: f64,
    /// Persist every successful solve regardless of improvement.
    pub save_always: bool,
    /// Full proxy architecture override for matrix mode.
    pub proxy: Option<MlpConfig>,
    /// Hidden width of the default matrix-mode proxy.
    pub proxy_width: usize,
    /// Convergence policy shared by adapter and bridge regression.
    pub schedule: RegressionSchedule,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: "cache".to_string(),
            sample_size: None,
            verbose: false,
            randomize_eps: 0.01,
            save_always: false,
            proxy: None,
            proxy_width: DEFAULT_PROXY_WIDTH,
            schedule: RegressionSchedule::default(),
        }
    }
}

/// Outcome of a parametric warm start: the ready-to-optimize model,
/// the loss of the selected candidate (+infinity when the pool gave
/// nothing), and what the adapter did.
#[derive(Debug)]
pub struct WarmStartResult<B: Backend> {
    pub model: Mlp<B>,
    pub selection_loss: f64,
    pub adapt: Option<AdaptReport>,
}

/// Outcome of a matrix-mode warm start: grid values ready to hand to
/// the solver, the re-evaluated residual of those values (when a
/// candidate was used), the normalized operator view, and the
/// selection loss.
#[derive(Debug)]
pub struct MatrixWarmStartResult<B: Backend> {
    pub values: Tensor<B, 2>,
    pub residual: Option<LossReport>,
    pub proxy_operator: Operator,
    pub selection_loss: f64,
}

// ─── WarmStart ───────────────────────────────────────────────────────────────
/// Owns the store, the configuration, and the random source for one
/// solving session.
pub struct WarmStart<B: AutodiffBackend> {
    store: ModelStore,
    config: CacheConfig,
    device: B::Device,
    rng: StdRng,
}

impl<B: AutodiffBackend> WarmStart<B> {
    pub fn new(config: CacheConfig, device: B::Device) -> Self {
        let store = ModelStore::new(&config.cache_dir);
        Self { store, config, device, rng: StdRng::from_entropy() }
    }

    /// Deterministic variant: candidate sampling and perturbation both
    /// replay for the same seed and pool.
    pub fn with_seed(config: CacheConfig, device: B::Device, seed: u64) -> Self {
        let store = ModelStore::new(&config.cache_dir);
        Self { store, config, device, rng: StdRng::seed_from_u64(seed) }
    }

    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Warm-start a parametric solve: search the pool for the best
    /// compatible candidate, adapt it into the target's architecture,
    /// and perturb the result. With an empty or useless pool the
    /// target itself is returned (perturbed), and `selection_loss` is
    /// +infinity — "no warm start available", not an error.
    pub fn parametric<E>(
        &mut self,
        target: Mlp<B>,
        grid: &Tensor<B, 2>,
        evaluator: &E,
    ) -> WarmStartResult<B>
    where
        E: LossEvaluator<Mlp<B>>,
    {
        let outcome = select::<B, _, _>(
            &self.store,
            &target.signature(),
            evaluator,
            self.config.sample_size,
            self.config.verbose,
            &self.device,
            &mut self.rng,
        );
        let selection_loss = outcome.loss();

        let (model, report) = match outcome.best {
            Some(candidate) => {
                let (model, report) =
                    adapt(candidate, target, grid, &self.config.schedule, self.config.verbose);
                (model, Some(report))
            }
            None => {
                tracing::debug!("no warm start available, keeping the fresh model");
                (target, None)
            }
        };

        let model = model.randomize(self.config.randomize_eps, &mut self.rng);
        WarmStartResult { model, selection_loss, adapt: report }
    }

    /// Warm-start a matrix-mode solve. The dense `values` are bridged
    /// into a parametric proxy, the parametric pipeline runs on the
    /// proxy, and the resolved proxy is projected back onto the grid.
    ///
    /// `proxy_evaluator` ranks candidates (it scores parametric
    /// models); `residual_evaluator` re-scores the final projected
    /// values for reporting. When the pool yields nothing the input
    /// values come back unchanged.
    pub fn matrix<EP, EM>(
        &mut self,
        values: Tensor<B, 2>,
        grid: &Tensor<B, 2>,
        operator: &Operator,
        proxy_evaluator: &EP,
        residual_evaluator: &EM,
    ) -> Result<MatrixWarmStartResult<B>>
    where
        EP: LossEvaluator<Mlp<B>>,
        EM: LossEvaluator<Tensor<B, 2>>,
    {
        let [_, in_features] = grid.dims();
        let [_, out_features] = values.dims();
        let proxy_config = self.config.proxy.clone().unwrap_or_else(|| {
            default_proxy(in_features, out_features, self.config.proxy_width)
        });

        let (proxy, fit) = bridge(
            &values,
            grid,
            Some(proxy_config),
            &self.config.schedule,
            self.config.verbose,
            &self.device,
        )?;
        tracing::debug!(steps = fit.steps, loss = fit.final_loss, "proxy fitted to grid values");

        // Column-normalize coefficient views (and warn about callable
        // coefficients) before any candidate comparison happens.
        let proxy_operator = operator.normalized();

        let outcome = select::<B, _, _>(
            &self.store,
            &proxy.signature(),
            proxy_evaluator,
            self.config.sample_size,
            self.config.verbose,
            &self.device,
            &mut self.rng,
        );
        let selection_loss = outcome.loss();

        let Some(candidate) = outcome.best else {
            tracing::debug!("no warm start available for matrix mode, keeping the input values");
            return Ok(MatrixWarmStartResult {
                values,
                residual: None,
                proxy_operator,
                selection_loss,
            });
        };

        let (resolved, _report) =
            adapt(candidate, proxy, grid, &self.config.schedule, self.config.verbose);
        let resolved = resolved.randomize(self.config.randomize_eps, &mut self.rng);
        let projected = project(&resolved, grid);

        let residual = match residual_evaluator.evaluate(&projected) {
            Ok(report) => Some(report),
            Err(error) => {
                tracing::warn!("failed to re-evaluate the projected warm start: {error:#}");
                None
            }
        };

        Ok(MatrixWarmStartResult {
            values: projected,
            residual,
            proxy_operator,
            selection_loss,
        })
    }

    /// Post-solve save policy: persist when the solve improved on its
    /// warm start, or unconditionally under `save_always`. Returns
    /// `None` when nothing was persisted.
    pub fn save_after_solve(
        &self,
        model: &Mlp<B>,
        optimizer: OptimizerSnapshot,
        scaler: Option<GradScalerSnapshot>,
        improved: bool,
    ) -> Option<SaveOutcome> {
        if self.config.save_always || improved {
            Some(self.store.save(model, optimizer, scaler, None))
        } else {
            None
        }
    }
}
