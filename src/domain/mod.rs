// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types describing what the cache reasons about:
// model shapes, loss reports, and operator coefficients.
//
// Rules for this layer:
//   - NO burn framework types allowed here
//   - NO file I/O
//   - Only plain structs, enums, and traits
//
// Keeping this layer framework-free means signature and
// coefficient logic is unit-testable without a tensor backend.

// Architecture-level shape descriptions used for reuse decisions
pub mod signature;

// Thin operator/coefficient forms the matrix-mode bridge normalizes
pub mod equation;

// Collaborator abstractions (the external residual-loss evaluator)
pub mod traits;

use serde::{Deserialize, Serialize};

/// The two solving modes the orchestrator dispatches on.
///
/// `Parametric` covers solvers that train a function model directly;
/// `Matrix` covers solvers whose solution is dense values on a fixed
/// grid, which the bridge converts into a parametric proxy first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveMode {
    Parametric,
    Matrix,
}
