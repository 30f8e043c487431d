//! Stage checkpoints.
//!
//! Expensive stage results are stored under a key and reused on later runs
//! through [`CheckpointStore::get_or_compute`]. Stored results are trusted
//! as-is: nothing checks whether the input they were computed from changed.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Key of the reduced per-path RTT table
pub const REDUCED_PATHS_KEY: &str = "reduced_paths";
/// Key of the filtered path list
pub const FILTERED_PATHS_KEY: &str = "filtered_paths";

const ZSTD_LEVEL: i32 = 3;

/// Errors raised while reading or writing a checkpoint file
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Checkpoint I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Checkpoint {path} could not be encoded or decoded: {source}")]
    Codec {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },
}

/// Key-value store with cache-or-compute semantics
pub trait CheckpointStore {
    /// Return the value stored under `key`, or run `compute`, store its
    /// result and return it.
    fn get_or_compute<T, F>(&self, key: &str, compute: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T>;
}

/// Store that never persists anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCheckpoints;

impl CheckpointStore for NoCheckpoints {
    fn get_or_compute<T, F>(&self, _key: &str, compute: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T>,
    {
        compute()
    }
}

/// One zstd-compressed bincode file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
    dir: PathBuf,
}

impl FileCheckpointStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.bin.zst", key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.path_for(key).is_file()
    }

    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<T, CacheError> {
        let path = self.path_for(key);
        let io_err = |source: std::io::Error| CacheError::Io { path: path.clone(), source };

        let file = File::open(&path).map_err(io_err)?;
        let decoder = zstd::stream::read::Decoder::new(file).map_err(io_err)?;
        bincode::deserialize_from(decoder).map_err(|source| CacheError::Codec { path: path.clone(), source })
    }

    pub fn store<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("zst.tmp");
        let io_err = |source: std::io::Error| CacheError::Io { path: path.clone(), source };

        fs::create_dir_all(&self.dir).map_err(io_err)?;
        let file = File::create(&tmp).map_err(io_err)?;
        let mut encoder = zstd::stream::write::Encoder::new(BufWriter::new(file), ZSTD_LEVEL).map_err(io_err)?;
        bincode::serialize_into(&mut encoder, value)
            .map_err(|source| CacheError::Codec { path: path.clone(), source })?;
        encoder.finish().map_err(io_err)?.into_inner().map_err(|e| io_err(e.into_error()))?;

        // Readers never see a half-written checkpoint
        fs::rename(&tmp, &path).map_err(io_err)?;
        Ok(())
    }
}

impl CheckpointStore for FileCheckpointStore {
    fn get_or_compute<T, F>(&self, key: &str, compute: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T>,
    {
        if self.contains(key) {
            log::info!("Resuming '{}' from {}", key, self.path_for(key).display());
            return self
                .load(key)
                .wrap_err_with(|| format!("Failed to load checkpoint '{}'", key));
        }

        let value = compute()?;
        self.store(key, &value)
            .wrap_err_with(|| format!("Failed to write checkpoint '{}'", key))?;
        log::info!("Stored '{}' at {}", key, self.path_for(key).display());
        Ok(value)
    }
}

/// Store chosen at runtime from the cache settings
#[derive(Debug, Clone)]
pub enum Checkpoints {
    Disabled(NoCheckpoints),
    Files(FileCheckpointStore),
}

impl Checkpoints {
    pub fn new(enabled: bool, dir: &Path) -> Self {
        if enabled {
            Checkpoints::Files(FileCheckpointStore::new(dir))
        } else {
            Checkpoints::Disabled(NoCheckpoints)
        }
    }
}

impl CheckpointStore for Checkpoints {
    fn get_or_compute<T, F>(&self, key: &str, compute: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T>,
    {
        match self {
            Checkpoints::Disabled(store) => store.get_or_compute(key, compute),
            Checkpoints::Files(store) => store.get_or_compute(key, compute),
        }
    }
}
