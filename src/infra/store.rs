// ============================================================
// Layer 6 — Cache Entry Store
// ============================================================
// Persists a trained model plus its optimizer state to a named
// slot in the cache directory, and restores it later.
//
// What gets saved per entry (name chosen by the caller, or a
// timestamp when omitted):
//   1. {name}.meta.json — model spec, optimizer snapshot,
//                         optional grad-scaler snapshot
//   2. {name}.mpk         — weights via Burn's full-precision recorder
//      (or {name}.json when the mpk save failed and the
//      portable JSON recorder was used instead)
//
// Why save the spec separately?
//   Loading needs the exact architecture (layer sizes and
//   activation) to rebuild the model before the weights can be
//   loaded into it.
//
// Failure policy (this is the important part):
//   - save: mpk recorder → portable JSON recorder → give up
//     with a logged warning. The caller's in-memory solve result
//     is never affected by a failed save.
//   - load: any failure is an error the caller may skip; a
//     corrupt entry must never abort a whole lookup pass.
//   - clear: best-effort per file, logging and continuing past
//     individual deletion failures.

use anyhow::{anyhow, Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkFileRecorder, PrettyJsonFileRecorder, Recorder},
};
use serde::{Deserialize, Serialize};

use crate::domain::signature::StructuralSignature;
use crate::ml::model::{Mlp, MlpConfig};

/// Recognized model forms a cache entry can declare. Deserializing an
/// unrecognized form fails, which downgrades the entry to an ordinary
/// skippable load error — unknown forms are a recognized error, never
/// a silent fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "form")]
pub enum ModelSpec {
    Sequential(MlpConfig),
}

impl ModelSpec {
    pub fn signature(&self) -> StructuralSignature {
        match self {
            ModelSpec::Sequential(config) => {
                StructuralSignature::sequential(&config.layer_sizes, config.activation)
            }
        }
    }
}

/// Optimizer state persisted with an entry. Enough to resume the
/// caller's optimization with the same hyperparameters; the moment
/// estimates themselves are rebuilt from scratch on reuse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizerSnapshot {
    pub lr: f64,
    pub beta_1: f64,
    pub beta_2: f64,
    pub epsilon: f64,
    pub steps: usize,
}

impl Default for OptimizerSnapshot {
    fn default() -> Self {
        Self {
            lr: 1e-3,
            beta_1: 0.9,
            beta_2: 0.999,
            epsilon: 1e-8,
            steps: 0,
        }
    }
}

/// Gradient-scaler state for mixed-precision training runs.
/// Absent when the solve did not use mixed precision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradScalerSnapshot {
    pub scale: f64,
    pub growth_interval: usize,
}

/// The metadata sidecar written next to the weights file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EntryMeta {
    spec: ModelSpec,
    optimizer: OptimizerSnapshot,
    scaler: Option<GradScalerSnapshot>,
    saved_at_unix: u64,
}

/// A cache entry loaded back into memory.
#[derive(Debug)]
pub struct StoredEntry<B: Backend> {
    pub name: String,
    pub model: Mlp<B>,
    pub optimizer: OptimizerSnapshot,
    pub scaler: Option<GradScalerSnapshot>,
}

/// Which weights format a save ended up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightsFormat {
    Mpk,
    Json,
}

/// Result of a save attempt. `Abandoned` is a degraded-but-ok outcome:
/// the failure was logged and the caller's solve result is unaffected.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Saved { name: String, format: WeightsFormat },
    Abandoned,
}

/// Named-slot persistence for trained models in one cache directory.
/// The directory is an explicit constructor argument — there is no
/// process-wide cache path.
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    /// Create a store over `dir`, creating the directory if absent.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write a cache entry. `name` defaults to a timestamp-derived stem.
    ///
    /// Never returns an error: a save that fails in both formats is
    /// abandoned with a warning, because a missed cache write must not
    /// affect the solve that produced the model.
    pub fn save<B: Backend>(
        &self,
        model: &Mlp<B>,
        optimizer: OptimizerSnapshot,
        scaler: Option<GradScalerSnapshot>,
        name: Option<&str>,
    ) -> SaveOutcome {
        // Recorders treat the final dot of a path as an extension
        // boundary, so dots inside entry names would silently change
        // the weights file name.
        let name = name
            .map(|n| n.replace('.', "_"))
            .unwrap_or_else(timestamp_name);

        // The directory may have been cleared since construction.
        fs::create_dir_all(&self.dir).ok();

        let meta = EntryMeta {
            spec: ModelSpec::Sequential(model.config()),
            optimizer,
            scaler,
            saved_at_unix: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
        };
        let meta_path = self.meta_path(&name);
        let meta_json = match serde_json::to_string_pretty(&meta) {
            Ok(json) => json,
            Err(error) => {
                tracing::warn!(%error, "cannot serialize entry metadata, save abandoned");
                return SaveOutcome::Abandoned;
            }
        };
        if let Err(error) = fs::write(&meta_path, meta_json) {
            tracing::warn!(%error, path = %meta_path.display(), "cannot write entry metadata, save abandoned");
            return SaveOutcome::Abandoned;
        }

        let base = self.dir.join(&name);
        match NamedMpkFileRecorder::<FullPrecisionSettings>::new().record(model.clone().into_record(), base.clone()) {
            Ok(()) => {
                // a re-save must not leave the other format's file behind,
                // or load would pair the new metadata with stale weights
                fs::remove_file(self.weights_path(&name, "json")).ok();
                tracing::info!("model is saved in cache as '{name}'");
                SaveOutcome::Saved { name, format: WeightsFormat::Mpk }
            }
            Err(error) => {
                tracing::warn!(%error, "mpk save failed, retrying with the portable json recorder");
                match PrettyJsonFileRecorder::<FullPrecisionSettings>::new()
                    .record(model.clone().into_record(), base)
                {
                    Ok(()) => {
                        fs::remove_file(self.weights_path(&name, "mpk")).ok();
                        tracing::info!("model is saved in cache as '{name}' (json fallback)");
                        SaveOutcome::Saved { name, format: WeightsFormat::Json }
                    }
                    Err(error) => {
                        tracing::warn!(%error, "cannot save model in cache");
                        // do not leave a sidecar pointing at nothing
                        fs::remove_file(&meta_path).ok();
                        SaveOutcome::Abandoned
                    }
                }
            }
        }
    }

    /// Load a named entry. Errors here are per-entry and skippable:
    /// a lookup pass treats any failure as "skip this candidate".
    pub fn load<B: Backend>(&self, name: &str, device: &B::Device) -> Result<StoredEntry<B>> {
        let meta_path = self.meta_path(name);
        let raw = fs::read_to_string(&meta_path)
            .with_context(|| format!("cannot read entry metadata '{}'", meta_path.display()))?;
        let meta: EntryMeta = serde_json::from_str(&raw)
            .with_context(|| format!("malformed entry metadata '{}'", meta_path.display()))?;

        let ModelSpec::Sequential(config) = &meta.spec;

        let mpk = self.weights_path(name, "mpk");
        let json = self.weights_path(name, "json");
        let record = if mpk.exists() {
            NamedMpkFileRecorder::<FullPrecisionSettings>::new().load(mpk, device)
        } else {
            PrettyJsonFileRecorder::<FullPrecisionSettings>::new().load(json, device)
        }
        .map_err(|error| anyhow!("cannot load weights for entry '{name}': {error}"))?;

        let model = config.init::<B>(device).load_record(record);
        Ok(StoredEntry {
            name: name.to_owned(),
            model,
            optimizer: meta.optimizer,
            scaler: meta.scaler,
        })
    }

    /// Sorted stems of every entry in the directory. Enumeration order
    /// carries no meaning beyond determinism for the same directory
    /// contents.
    pub fn list(&self) -> Vec<String> {
        let mut names = Vec::new();
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return names;
        };
        for entry in entries.flatten() {
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if let Some(stem) = file_name.strip_suffix(".meta.json") {
                names.push(stem.to_owned());
            }
        }
        names.sort();
        names
    }

    /// Delete everything in the store's directory. Best effort:
    /// individual failures are logged and skipped. Returns the number
    /// of paths removed.
    pub fn clear(&self) -> usize {
        Self::clear_dir(&self.dir)
    }

    /// Delete everything in an arbitrary directory (explicit
    /// directory-clear is a caller-invoked operation, not part of the
    /// lookup hot path).
    pub fn clear_dir(dir: &Path) -> usize {
        let mut removed = 0;
        let Ok(entries) = fs::read_dir(dir) else {
            tracing::warn!("cannot read cache directory '{}'", dir.display());
            return removed;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let result = if path.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            match result {
                Ok(()) => removed += 1,
                Err(error) => {
                    tracing::warn!("failed to delete '{}': {error}", path.display());
                }
            }
        }
        removed
    }

    fn meta_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.meta.json"))
    }

    fn weights_path(&self, name: &str, ext: &str) -> PathBuf {
        let mut path = self.dir.join(name);
        path.set_extension(ext);
        path
    }
}

/// Unique-enough stem for unnamed saves. Underscore instead of the
/// usual dot so the stem survives extension handling.
fn timestamp_name() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}_{:09}", now.as_secs(), now.subsec_nanos())
}
