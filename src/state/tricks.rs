//! Saved tricks and their JSON export

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

/// A named, user-authored sequence of primitive command labels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrickDefinition {
    pub name: String,
    pub steps: Vec<String>,
}

/// Errors reading or writing the trick export file
#[derive(Debug, thiserror::Error)]
pub enum TrickStoreError {
    #[error("failed to access trick file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed trick file: {0}")]
    Format(#[from] serde_json::Error),
}

/// On-disk layout of the export file
#[derive(Debug, Default, Serialize, Deserialize)]
struct TrickFile {
    tricks: Vec<TrickDefinition>,
}

/// Session table of saved tricks, keyed by name
#[derive(Debug, Default, Clone)]
pub struct TrickTable {
    tricks: BTreeMap<String, TrickDefinition>,
}

impl TrickTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a trick, overwriting one with the same name. Returns true if
    /// an existing trick was replaced.
    pub fn insert(&mut self, trick: TrickDefinition) -> bool {
        self.tricks.insert(trick.name.clone(), trick).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&TrickDefinition> {
        self.tricks.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tricks.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrickDefinition> {
        self.tricks.values()
    }

    pub fn len(&self) -> usize {
        self.tricks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tricks.is_empty()
    }

    /// Load an export file; a missing file yields an empty table
    pub fn load(path: &Path) -> Result<Self, TrickStoreError> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let bytes = std::fs::read(path)?;
        let file: TrickFile = serde_json::from_slice(&bytes)?;

        let mut table = Self::new();
        for trick in file.tricks.into_iter().filter(|t| !t.steps.is_empty()) {
            table.insert(trick);
        }

        info!(?path, count = table.len(), "tricks loaded");
        Ok(table)
    }

    /// Write the table as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), TrickStoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = TrickFile {
            tricks: self.tricks.values().cloned().collect(),
        };
        std::fs::write(path, serde_json::to_vec_pretty(&file)?)?;

        info!(?path, count = self.len(), "tricks saved");
        Ok(())
    }
}
