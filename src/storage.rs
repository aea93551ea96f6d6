//! On-disk block diagram storage.
//!
//! Visual programs ("block diagrams") are saved one JSON file per design
//! under the configured storage directory. Design names are sanitized for
//! use as file names, and uploaded files get a numeric suffix when the
//! name is already taken.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Storage failures.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying filesystem error.
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    /// No stored diagram matches the requested id.
    #[error("no block diagram matching {0:?}")]
    NotFound(String),
    /// A stored or uploaded diagram is not valid JSON.
    #[error("malformed block diagram: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A saved visual program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDiagram {
    /// Human-chosen design name, also the file stem once sanitized.
    #[serde(rename = "designName")]
    pub design_name: String,
    /// The serialized diagram body, opaque to the rover.
    #[serde(rename = "bdString")]
    pub bd_string: String,
}

/// File-per-design store rooted at one directory.
#[derive(Debug, Clone)]
pub struct DiagramStore {
    dir: PathBuf,
}

/// Make a design name safe as a file stem.
fn sanitize(name: &str) -> String {
    name.replace([' ', '.'], "_")
}

impl DiagramStore {
    /// Open (and create if needed) a store at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, stem: &str) -> PathBuf {
        self.dir.join(format!("{stem}.json"))
    }

    /// Names of every stored design.
    pub fn list(&self) -> Result<Vec<String>, StorageError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") || !path.is_file() {
                continue;
            }
            // A stray corrupt file must not take every listing down.
            match serde_json::from_str::<BlockDiagram>(&fs::read_to_string(&path)?) {
                Ok(diagram) => names.push(diagram.design_name),
                Err(err) => {
                    warn!(path = %path.display(), %err, "skipping unreadable block diagram");
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Save a design, overwriting any previous version of the same name.
    ///
    /// Returns the sanitized name the design was stored under.
    pub fn save(&self, design_name: &str, bd_string: &str) -> Result<String, StorageError> {
        let stem = sanitize(design_name);
        let diagram = BlockDiagram {
            design_name: stem.clone(),
            bd_string: bd_string.to_owned(),
        };
        fs::write(self.path_for(&stem), serde_json::to_string_pretty(&diagram)?)?;
        debug!(design = %stem, "block diagram saved");
        Ok(stem)
    }

    /// Fetch the first stored design whose file name contains `id`.
    pub fn get(&self, id: &str) -> Result<BlockDiagram, StorageError> {
        let needle = sanitize(id);
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let matches = path
                .file_name()
                .and_then(|f| f.to_str())
                .is_some_and(|f| f.contains(&needle));
            if matches {
                return Ok(serde_json::from_str(&fs::read_to_string(&path)?)?);
            }
        }
        Err(StorageError::NotFound(id.to_owned()))
    }

    /// Raw bytes of a stored file, addressed by exact file name.
    ///
    /// Only plain file names are accepted; anything with a path separator
    /// or a `..` component cannot name a stored design and is reported as
    /// not found, so a crafted request can never read outside the store.
    pub fn download(&self, file_name: &str) -> Result<Vec<u8>, StorageError> {
        if file_name.contains(['/', '\\']) || file_name.contains("..") {
            return Err(StorageError::NotFound(file_name.to_owned()));
        }
        let path = self.dir.join(file_name);
        if !path.is_file() {
            return Err(StorageError::NotFound(file_name.to_owned()));
        }
        Ok(fs::read(path)?)
    }

    /// Store an uploaded diagram, uniquifying the name when taken.
    ///
    /// `file_name` supplies the initial design name (extension stripped).
    /// On collision a `_1`, `_2`, ... suffix is tried until a free name is
    /// found, and the stored design name is rewritten to match the final
    /// file stem. Returns that stem.
    pub fn upload(&self, file_name: &str, contents: &[u8]) -> Result<String, StorageError> {
        let mut diagram: BlockDiagram = serde_json::from_slice(contents)?;

        let base = Path::new(file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(file_name);
        let mut stem = sanitize(base);
        let original = stem.clone();
        let mut suffix = 0u32;
        while self.path_for(&stem).is_file() {
            suffix += 1;
            stem = format!("{original}_{suffix}");
        }

        diagram.design_name = stem.clone();
        fs::write(self.path_for(&stem), serde_json::to_string_pretty(&diagram)?)?;
        debug!(design = %stem, "block diagram uploaded");
        Ok(stem)
    }
}
