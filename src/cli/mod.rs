// ============================================================
// Layer 1 — Command-Line Interface
// ============================================================
// Parses arguments with clap and dispatches to the application
// layer. The demo command runs the whole warm-start pipeline on
// a small synthetic problem: fitting sin(x) on a uniform grid
// over [0, 2π], which stands in for a solver's training loop.

pub mod commands;

use anyhow::Result;
use burn::nn::loss::{MseLoss, Reduction};
use burn::prelude::*;
use clap::Parser;
use std::path::Path;

use crate::application::bridge::save_matrix;
use crate::application::warm_start::{CacheConfig, WarmStart};
use crate::domain::equation::Operator;
use crate::domain::traits::LossReport;
use crate::domain::SolveMode;
use crate::infra::store::{ModelStore, OptimizerSnapshot};
use crate::ml::model::{Mlp, MlpConfig};
use crate::ml::regression::fit_pointwise;
use commands::{CacheDirArgs, Commands, DemoArgs};

/// CPU backend with autodiff for the demo's regression loops.
type DemoBackend = burn::backend::Autodiff<burn::backend::NdArray>;

#[derive(Parser, Debug)]
#[command(
    name = "bvp-cache",
    version,
    about = "Warm-start model cache for neural boundary-value problem solvers"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Demo(args) => run_demo(args),
            Commands::List(args) => run_list(args),
            Commands::Clear(args) => run_clear(args),
        }
    }
}

fn run_list(args: CacheDirArgs) -> Result<()> {
    let store = ModelStore::new(&args.cache_dir);
    let names = store.list();
    if names.is_empty() {
        println!("cache '{}' is empty", args.cache_dir);
    } else {
        for name in names {
            println!("{name}");
        }
    }
    Ok(())
}

fn run_clear(args: CacheDirArgs) -> Result<()> {
    let removed = ModelStore::clear_dir(Path::new(&args.cache_dir));
    println!("removed {removed} files from '{}'", args.cache_dir);
    Ok(())
}

fn run_demo(args: DemoArgs) -> Result<()> {
    let device = burn::backend::ndarray::NdArrayDevice::default();
    let config = CacheConfig::from(&args);
    let schedule = config.schedule.clone();

    // Uniform grid on [0, 2π]; sin(x) plays the exact solution.
    let n = args.grid_points.max(2);
    let step = std::f32::consts::TAU / (n - 1) as f32;
    let xs: Vec<f32> = (0..n).map(|i| i as f32 * step).collect();
    let ys: Vec<f32> = xs.iter().map(|x| x.sin()).collect();
    let grid = Tensor::<DemoBackend, 2>::from_data(TensorData::new(xs, [n, 1]), &device);
    let truth = Tensor::<DemoBackend, 2>::from_data(TensorData::new(ys, [n, 1]), &device);

    // Candidates are ranked by their mean squared mismatch against
    // the reference solution, the same score a solver would get from
    // its residual. The normalized variant is the mismatch relative
    // to the reference's own mean square.
    let scale = truth
        .clone()
        .powf_scalar(2.0)
        .mean()
        .into_scalar()
        .elem::<f64>();
    let eval_grid = grid.clone();
    let eval_truth = truth.clone();
    let evaluator = move |model: &Mlp<DemoBackend>| -> Result<LossReport> {
        let loss = MseLoss::new()
            .forward(
                model.forward(eval_grid.clone()),
                eval_truth.clone(),
                Reduction::Mean,
            )
            .into_scalar()
            .elem::<f64>();
        Ok(LossReport::normalized(loss, loss / scale))
    };

    let mut warm = WarmStart::<DemoBackend>::new(config, device);
    println!(
        "cache '{}' holds {} entries",
        args.cache_dir,
        warm.store().list().len()
    );

    match SolveMode::from(args.mode) {
        SolveMode::Parametric => {
            let target =
                MlpConfig::new(vec![1, args.hidden, args.hidden, 1]).init::<DemoBackend>(&device);
            let started = warm.parametric(target, &grid, &evaluator);
            println!("warm start selection loss: {:.6e}", started.selection_loss);
            if let Some(report) = &started.adapt {
                if report.reused_directly {
                    println!("cached parameters reused without adaptation");
                }
            }

            // A plain pointwise fit stands in for the solver here.
            let (solved, outcome) =
                fit_pointwise(started.model, grid, truth, &schedule, args.verbose);
            println!(
                "solve finished after {} steps, final loss {:.6e}",
                outcome.steps, outcome.final_loss
            );

            let improved = outcome.final_loss < started.selection_loss;
            let optimizer = OptimizerSnapshot {
                lr: schedule.lr,
                steps: outcome.steps,
                ..Default::default()
            };
            match warm.save_after_solve(&solved, optimizer, None, improved) {
                Some(saved) => println!("saved: {saved:?}"),
                None => println!("result did not improve on the warm start, not saved"),
            }
        }
        SolveMode::Matrix => {
            // Start from a flat guess for the dense solution values.
            let initial = Tensor::<DemoBackend, 2>::zeros([n, 1], &device);
            let res_truth = truth.clone();
            let residual_evaluator = move |values: &Tensor<DemoBackend, 2>| -> Result<LossReport> {
                let loss =
                    MseLoss::new().forward(values.clone(), res_truth.clone(), Reduction::Mean);
                Ok(LossReport::raw(loss.into_scalar().elem::<f64>()))
            };

            let result = warm.matrix(
                initial,
                &grid,
                &Operator::default(),
                &evaluator,
                &residual_evaluator,
            )?;
            println!("warm start selection loss: {:.6e}", result.selection_loss);
            if let Some(residual) = &result.residual {
                println!("projected warm-start residual: {:.6e}", residual.loss);
            }

            // The reference values play the solved matrix; persist them
            // through the bridge so later parametric runs can reuse it.
            let proxy = MlpConfig::new(vec![1, args.hidden, args.hidden, args.hidden, 1]);
            let saved = save_matrix(
                warm.store(),
                &truth,
                &grid,
                Some(proxy),
                Some("demo_matrix"),
                &schedule,
                args.verbose,
                &device,
            )?;
            println!("saved: {saved:?}");
        }
    }
    Ok(())
}
