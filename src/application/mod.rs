// ============================================================
// Layer 2 — Application / Warm-Start Pipeline
// ============================================================
// Orchestrates the cache pipeline for one new problem instance:
//
//   store ──► selector ──► [exact reuse | adapter regression]
//                                   │
//                            randomization
//                                   │
//                           ready-to-optimize model
//
// Matrix-mode problems first pass through the bridge, which
// fits a parametric proxy to the dense grid values so the same
// selector/adapter machinery applies, then project the resolved
// proxy back onto the grid.
//
// Every failure inside the pipeline degrades to "skip this
// candidate" or "no warm start available" — nothing in here is
// allowed to abort the caller's solve.

// Ranks stored candidates by an external loss evaluation
pub mod selector;

// Reuses or distills the chosen candidate into the target shape
pub mod adapter;

// Converts dense grid solutions into parametric proxies and back
pub mod bridge;

// Mode dispatch, post-selection randomization, save policy
pub mod warm_start;
