//! Directory-backed object storage

use super::ObjectStore;
use eyre::{Context, Result};
use std::path::{Path, PathBuf};

/// Treats a local directory as a bucket
///
/// Keys are paths relative to the directory, joined with `/` on every
/// platform. Useful for offline runs against a synced copy of a bucket.
pub struct DirectoryObjectStore {
    root: PathBuf,
}

impl DirectoryObjectStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Collect every file below the root as a key
    fn walk(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let entries = std::fs::read_dir(&dir)
                .with_context(|| format!("Failed to read directory: {}", dir.display()))?;

            for entry in entries {
                let path = entry?.path();
                if path.is_dir() {
                    pending.push(path);
                } else if let Ok(relative) = path.strip_prefix(&self.root) {
                    let key = relative
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy())
                        .collect::<Vec<_>>()
                        .join("/");
                    keys.push(key);
                }
            }
        }

        keys.sort();
        Ok(keys)
    }
}

impl ObjectStore for DirectoryObjectStore {
    fn location(&self) -> String {
        self.root.display().to_string()
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let keys = self.walk()?;
        Ok(keys.into_iter().filter(|k| k.starts_with(prefix)).collect())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let path = key
            .split('/')
            .fold(self.root.clone(), |path, segment| path.join(segment));

        std::fs::read(&path).with_context(|| format!("Failed to read object: {}", path.display()))
    }
}
