//! On-disk cache of fully trained models
//!
//! Artifacts are keyed by everything that shapes the model: the lag width,
//! the resolved family and a SHA-256 fingerprint of the training prices.
//! Stores go through a process-wide lock and are written to a temporary file
//! in the cache directory before being renamed over the target.

use crate::error::{ForecastError, Result};
use crate::models::{ModelFamily, TrainedModel};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

const ARTIFACT_PREFIX: &str = "model-";
const ARTIFACT_EXTENSION: &str = "json";

static WRITE_LOCK: Mutex<()> = Mutex::new(());

/// Identity of a cached model
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub nlags: usize,
    pub family: ModelFamily,
    /// Hex SHA-256 of the training prices
    pub fingerprint: String,
}

impl CacheKey {
    pub fn new(prices: &[f64], nlags: usize, family: ModelFamily) -> Self {
        Self {
            nlags,
            family,
            fingerprint: fingerprint(prices),
        }
    }

    /// File name of the artifact for this key
    pub fn file_name(&self) -> String {
        format!(
            "{}{}-n{}-{}.{}",
            ARTIFACT_PREFIX,
            self.family.as_str(),
            self.nlags,
            self.fingerprint,
            ARTIFACT_EXTENSION
        )
    }
}

/// SHA-256 over the little-endian bytes of every price
pub fn fingerprint(prices: &[f64]) -> String {
    let mut hasher = Sha256::new();
    hasher.update((prices.len() as u64).to_le_bytes());
    for price in prices {
        hasher.update(price.to_le_bytes());
    }
    format!("{:x}", hasher.finalize())
}

#[derive(Serialize)]
struct ArtifactRef<'a> {
    key: &'a CacheKey,
    model: &'a TrainedModel,
}

#[derive(Deserialize)]
struct Artifact {
    key: CacheKey,
    model: TrainedModel,
}

/// Directory-backed model cache
#[derive(Debug, Clone)]
pub struct ModelCache {
    dir: PathBuf,
}

impl ModelCache {
    /// Open a cache rooted at `dir`, creating the directory if needed
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    /// Load the model stored under `key`.
    ///
    /// Missing, unreadable, corrupt or mismatched artifacts are all misses.
    pub fn load(&self, key: &CacheKey) -> Option<TrainedModel> {
        let path = self.path_for(key);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(_) => return None,
        };

        match serde_json::from_str::<Artifact>(&raw) {
            Ok(artifact) if artifact.key == *key && artifact.model.n_features() == key.nlags => {
                debug!(path = %path.display(), "model cache hit");
                Some(artifact.model)
            }
            Ok(_) => {
                warn!(path = %path.display(), "cached model does not match its key, ignoring");
                None
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "corrupt cached model, ignoring");
                None
            }
        }
    }

    /// Atomically write `model` under `key`, replacing any previous artifact
    pub fn store(&self, key: &CacheKey, model: &TrainedModel) -> Result<PathBuf> {
        let _guard = WRITE_LOCK
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let path = self.path_for(key);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        serde_json::to_writer(&mut tmp, &ArtifactRef { key, model })?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path)
            .map_err(|err| ForecastError::CacheError(err.to_string()))?;

        debug!(path = %path.display(), "model cached");
        Ok(path)
    }

    /// Remove every artifact in the cache directory
    pub fn clear(&self) -> Result<usize> {
        let _guard = WRITE_LOCK
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut removed = 0;
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let is_artifact = path
                .file_name()
                .and_then(|name| name.to_str())
                .map_or(false, |name| {
                    name.starts_with(ARTIFACT_PREFIX)
                        && name.ends_with(&format!(".{}", ARTIFACT_EXTENSION))
                });
            if is_artifact {
                fs::remove_file(&path)?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}
