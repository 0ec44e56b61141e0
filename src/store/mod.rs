mod file;
mod snapshot;

use thiserror::Error;

pub use file::{JsonFileStore, export_to_dir, import_file};
pub use snapshot::{Snapshot, export_file_name};

/// Persistence errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Expected a JSON object at the top level")]
    NotAnObject,

    #[error("Could not determine data directory")]
    NoDataDirectory,
}

/// Where the app keeps its snapshot between runs
pub trait SnapshotStore {
    /// Load the saved snapshot, `None` when there is no usable data
    fn load(&self) -> Result<Option<Snapshot>, StoreError>;

    /// Replace the saved snapshot
    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError>;
}

/// Store kept in memory (for testing)
#[cfg(test)]
#[derive(Default, Clone)]
pub struct MemoryStore {
    pub saved: std::rc::Rc<std::cell::RefCell<Option<Snapshot>>>,
}

#[cfg(test)]
impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<Snapshot>, StoreError> {
        Ok(self.saved.borrow().clone())
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        *self.saved.borrow_mut() = Some(snapshot.clone());
        Ok(())
    }
}
