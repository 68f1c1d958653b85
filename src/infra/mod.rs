// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Persistence for cache entries:
//
//   store.rs — one named slot per previously trained model in a
//              cache directory. Each slot is a metadata sidecar
//              (model spec, optimizer snapshot, optional grad
//              scaler snapshot) plus a recorded weights file.
//              Saving degrades through a portable fallback
//              format and is never fatal to the caller's solve;
//              loading failures are skippable per entry.
//
// The cache directory is shared mutable state with no locking:
// concurrent writers may race and a reader may see a partially
// written file. That is why every load error is an ordinary,
// non-fatal outcome for the lookup that hit it.

/// Cache entry persistence (save / load / list / clear)
pub mod store;
