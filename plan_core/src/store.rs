//! Plan persistence with file locking.
//!
//! The engines never touch storage; callers persist the snapshots they
//! return through a `PlanStore`. The JSON file store reads under a shared
//! lock and replaces the file atomically on save.

use crate::{Error, Plan, Result};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Storage collaborator holding the current plan snapshot
pub trait PlanStore {
    fn load(&self) -> Result<Plan>;
    fn save(&mut self, plan: &Plan) -> Result<()>;
}

/// Plan stored as a single JSON document
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl PlanStore for JsonFileStore {
    fn load(&self) -> Result<Plan> {
        let plan: Plan = read_json(&self.path)?;
        tracing::debug!("Loaded plan {} from {:?}", plan.id, self.path);
        Ok(plan)
    }

    fn save(&mut self, plan: &Plan) -> Result<()> {
        write_json_atomic(&self.path, plan)?;
        tracing::debug!("Saved plan {} to {:?}", plan.id, self.path);
        Ok(())
    }
}

/// Read a JSON document under a shared lock
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path)?;

    // Acquire shared lock for reading
    file.lock_shared()?;

    let mut contents = String::new();
    let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
    file.unlock()?;
    read?;

    Ok(serde_json::from_str(&contents)?)
}

/// Write a JSON document atomically
///
/// 1. Write to a temp file in the same directory
/// 2. Sync to disk
/// 3. Rename over the original
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;

    // Acquire exclusive lock on the temp file to serialize concurrent writers
    temp.as_file().lock_exclusive()?;

    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        let contents = serde_json::to_string_pretty(value)?;
        writer.write_all(contents.as_bytes())?;
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;

    // Atomically replace old file
    temp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}
