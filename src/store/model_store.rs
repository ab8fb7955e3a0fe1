//! Durable storage of the last fitted model per series.

use super::error::StoreError;
use super::file::{entry_path, read_json, write_json_atomic};
use crate::core::{LinearModel, SeriesId};
use std::collections::HashMap;
use std::path::PathBuf;

/// One live model per series, valid until replaced by a retrain.
pub trait ModelStore {
    fn load(&self, series_id: &SeriesId) -> Result<Option<LinearModel>, StoreError>;

    /// Store `model`, replacing any earlier model for its series.
    fn persist(&mut self, model: &LinearModel) -> Result<(), StoreError>;
}

/// In-process model store.
#[derive(Debug, Default)]
pub struct MemoryModelStore {
    models: HashMap<SeriesId, LinearModel>,
}

impl MemoryModelStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ModelStore for MemoryModelStore {
    fn load(&self, series_id: &SeriesId) -> Result<Option<LinearModel>, StoreError> {
        Ok(self.models.get(series_id).cloned())
    }

    fn persist(&mut self, model: &LinearModel) -> Result<(), StoreError> {
        self.models.insert(model.series_id.clone(), model.clone());
        Ok(())
    }
}

/// Model store persisted as `model-<series>.json` files.
#[derive(Debug, Clone)]
pub struct FileModelStore {
    dir: PathBuf,
}

impl FileModelStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, series_id: &SeriesId) -> PathBuf {
        entry_path(&self.dir, "model", series_id)
    }
}

impl ModelStore for FileModelStore {
    fn load(&self, series_id: &SeriesId) -> Result<Option<LinearModel>, StoreError> {
        read_json(&self.path(series_id))
    }

    fn persist(&mut self, model: &LinearModel) -> Result<(), StoreError> {
        write_json_atomic(&self.path(&model.series_id), model)
    }
}
