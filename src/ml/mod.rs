// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All burn-framework model code lives here:
//
//   model.rs      — The sequential MLP used as the trainable
//                   function representation: a stack of linear
//                   layers with a pointwise nonlinearity between
//                   them. Knows how to derive its structural
//                   signature and how to perturb its parameters.
//
//   regression.rs — The pointwise regression loop shared by the
//                   adapter (distilling a cached function into a
//                   new architecture) and the matrix-mode bridge
//                   (fitting a proxy to dense grid values).
//
// The cache never trains against the governing equation here —
// regression only reproduces a function's values over the grid,
// which is why plain mean-squared error suffices.

/// Sequential MLP model and parameter perturbation
pub mod model;

/// Pointwise (supervised) regression with Adam
pub mod regression;
