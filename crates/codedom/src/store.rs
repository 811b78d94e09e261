use std::fs;
use std::io;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::snapshot::{CodeTreeSnapshot, SnapshotError};
use crate::tree::CodeTree;
use crate::util::write_atomic;

/// Output settings for [`CodeTreeStore`].  
/// [`CodeTreeStore`] 的輸出設定。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    /// Indent the JSON payload.
    pub pretty: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self { pretty: true }
    }
}

/// Persists `CodeTree` snapshots to disk using JSON + atomic writes.  
/// 以 JSON 搭配原子寫入方式儲存 `CodeTree` 快照。
#[derive(Debug)]
pub struct CodeTreeStore {
    path: PathBuf,
    options: StoreOptions,
}

impl CodeTreeStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self::with_options(path, StoreOptions::default())
    }

    pub fn with_options(path: impl AsRef<Path>, options: StoreOptions) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            options,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Loads a code tree from disk, returning `Ok(None)` when the file is absent.  
    /// 從磁碟載入程式碼樹；若檔案不存在則回傳 `Ok(None)`。
    pub fn load(&self) -> Result<Option<CodeTree>, CodeTreeStoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let snapshot: CodeTreeSnapshot = serde_json::from_str(&contents)
                    .map_err(|err| CodeTreeStoreError::Invalid(err.to_string()))?;
                let tree = CodeTree::from_snapshot(snapshot)?;
                debug!(path = %self.path.display(), nodes = tree.len(), "loaded code tree");
                Ok(Some(tree))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(CodeTreeStoreError::Io(err)),
        }
    }

    /// Saves the provided code tree atomically to disk.  
    /// 將傳入的程式碼樹以原子方式寫入磁碟。
    pub fn save(&self, tree: &CodeTree) -> Result<(), CodeTreeStoreError> {
        let snapshot = tree.snapshot();
        let encoded = if self.options.pretty {
            serde_json::to_vec_pretty(&snapshot)
        } else {
            serde_json::to_vec(&snapshot)
        };
        let payload = encoded.map_err(|err| CodeTreeStoreError::Invalid(err.to_string()))?;
        write_atomic(&self.path, &payload)?;
        debug!(path = %self.path.display(), nodes = tree.len(), "saved code tree");
        Ok(())
    }
}

/// Errors emitted by [`CodeTreeStore`].  
/// [`CodeTreeStore`] 可能拋出的錯誤。
#[derive(Debug, Error)]
pub enum CodeTreeStoreError {
    #[error("code tree IO error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid code tree payload: {0}")]
    Invalid(String),
    #[error("unusable code tree snapshot: {0}")]
    Snapshot(#[from] SnapshotError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::DataValue;
    use crate::tree::{ChildSlot, NodeDraft};
    use tempfile::tempdir;

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let store = CodeTreeStore::new(dir.path().join("tree.json"));

        let mut tree = CodeTree::new();
        let namespace = tree.insert(NodeDraft::namespace("Acme.Tools"));
        let class = tree.insert(NodeDraft::class("Hammer"));
        tree.append(namespace, ChildSlot::Types, class).unwrap();

        store.save(&tree).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.revision(), tree.revision());
        assert_eq!(loaded.len(), 2);
        let root = loaded.roots().next().unwrap();
        assert_eq!(loaded.children(root, ChildSlot::Types).unwrap().len(), 1);
    }

    #[test]
    fn load_missing_returns_none() {
        let dir = tempdir().unwrap();
        let store = CodeTreeStore::new(dir.path().join("absent.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn compact_output_is_single_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("tree.json");
        let store = CodeTreeStore::with_options(&path, StoreOptions { pretty: false });
        let mut tree = CodeTree::new();
        tree.insert(NodeDraft::compilation_unit());
        store.save(&tree).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(!contents.contains('\n'));
        assert!(!dir.path().join("nested").join("tree.json.tmp").exists());
    }

    #[test]
    fn non_finite_float_metadata_survives_roundtrip() {
        let dir = tempdir().unwrap();
        let store = CodeTreeStore::new(dir.path().join("tree.json"));

        let mut tree = CodeTree::new();
        let class = tree.insert(NodeDraft::class("Gauge"));
        let data = tree.get_mut(class).unwrap().data_mut();
        data.insert("reading", f64::NAN);
        data.insert("ceiling", f64::INFINITY);
        data.insert("floor", f64::NEG_INFINITY);
        data.insert("scale", 0.25_f64);

        store.save(&tree).unwrap();
        let loaded = store.load().unwrap().unwrap();
        let root = loaded.roots().next().unwrap();
        let data = loaded.get(root).unwrap().data();
        let float = |key: &str| data.get(key).and_then(DataValue::as_float).unwrap();
        assert!(float("reading").is_nan());
        assert_eq!(float("ceiling"), f64::INFINITY);
        assert_eq!(float("floor"), f64::NEG_INFINITY);
        assert_eq!(float("scale"), 0.25);
    }

    #[test]
    fn garbage_payload_is_invalid() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tree.json");
        fs::write(&path, "{ not json").unwrap();
        let err = CodeTreeStore::new(&path).load().unwrap_err();
        assert!(matches!(err, CodeTreeStoreError::Invalid(_)));
    }
}
