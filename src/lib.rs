// ============================================================
// bvp-cache — warm-start model cache for neural BVP solvers
// ============================================================
// Solving a family of related boundary-value problems from
// scratch is expensive. This crate persists previously trained
// models, searches that pool for a good starting point for a
// new problem instance, adapts structurally mismatched
// candidates by pointwise regression, and perturbs the result
// so repeated lookups do not replay the same local optimum.
//
// Layer map (dependencies point downward):
//
//   cli          → argument parsing, dispatch
//   application  → selector, adapter, bridge, orchestrator
//   domain       → signatures, loss reports, operator terms
//   ml           → burn MLP model + pointwise regression
//   infra        → cache entry store (recorder persistence)

pub mod application;
pub mod cli;
pub mod domain;
pub mod infra;
pub mod ml;

pub use application::selector::{select, Candidate, SelectionOutcome};
pub use application::warm_start::{CacheConfig, WarmStart};
pub use domain::signature::StructuralSignature;
pub use domain::traits::{LossEvaluator, LossReport};
pub use infra::store::ModelStore;
pub use ml::model::{Mlp, MlpConfig};
