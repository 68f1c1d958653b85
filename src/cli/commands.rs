// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Three subcommands: `demo`, `list`, and `clear`, with all the
// configurable cache flags.
//
// clap's derive macros generate help text, error messages for
// missing args, and type conversion automatically.

use clap::{Args, Subcommand, ValueEnum};

use crate::application::warm_start::CacheConfig;
use crate::domain::SolveMode;
use crate::ml::regression::RegressionSchedule;

/// The top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run an end-to-end warm-start demonstration on a 1-D sine fit
    Demo(DemoArgs),

    /// List the entries stored in the cache directory
    List(CacheDirArgs),

    /// Delete all files in the cache directory
    Clear(CacheDirArgs),
}

/// Shared argument for the commands that only need the directory.
#[derive(Args, Debug)]
pub struct CacheDirArgs {
    /// Cache directory holding the model pool
    #[arg(long, default_value = "cache")]
    pub cache_dir: String,
}

/// All arguments for the `demo` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Cache directory holding the model pool
    #[arg(long, default_value = "cache")]
    pub cache_dir: String,

    /// Maximal number of candidates evaluated per lookup
    /// (the entire pool when omitted)
    #[arg(long)]
    pub nmodels: Option<usize>,

    /// Epsilon of the post-selection parameter perturbation
    #[arg(long, default_value_t = 0.01)]
    pub randomize_eps: f64,

    /// Persist the solve result even when it did not improve
    #[arg(long)]
    pub save_always: bool,

    /// Per-candidate progress output
    #[arg(long)]
    pub verbose: bool,

    /// Solving mode to demonstrate
    #[arg(long, value_enum, default_value = "parametric")]
    pub mode: ModeArg,

    /// Number of grid points on [0, 2π]
    #[arg(long, default_value_t = 50)]
    pub grid_points: usize,

    /// Hidden width of the target model (and of the demo's proxy)
    #[arg(long, default_value_t = 32)]
    pub hidden: usize,

    /// Step cap for the demo's regression loops
    #[arg(long, default_value_t = 20_000)]
    pub max_steps: usize,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    Parametric,
    Matrix,
}

impl From<ModeArg> for SolveMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Parametric => SolveMode::Parametric,
            ModeArg::Matrix => SolveMode::Matrix,
        }
    }
}

/// Convert CLI DemoArgs into the application-layer CacheConfig.
/// This is the boundary between Layer 1 and Layer 2 — the
/// application layer never sees clap types.
impl From<&DemoArgs> for CacheConfig {
    fn from(a: &DemoArgs) -> Self {
        CacheConfig {
            cache_dir: a.cache_dir.clone(),
            sample_size: a.nmodels,
            verbose: a.verbose,
            randomize_eps: a.randomize_eps,
            save_always: a.save_always,
            proxy: None,
            // a small proxy keeps the matrix-mode demo quick
            proxy_width: a.hidden,
            schedule: RegressionSchedule {
                lr: 1e-2,
                tolerance: 1e-4,
                max_steps: a.max_steps,
                log_every: 1_000,
            },
        }
    }
}
