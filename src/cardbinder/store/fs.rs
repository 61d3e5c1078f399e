use super::KeyValueStore;
use crate::error::{BinderError, Result};
use std::fs;
use std::path::PathBuf;

/// File-backed key-value store: each key is a `<key>.json` file in `root`.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(BinderError::Store(format!("Invalid store key: {}", key)));
        }
        Ok(self.root.join(format!("{}.json", key)))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(BinderError::Io)?;
        }
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(BinderError::Io)?;
        Ok(Some(content))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.ensure_dir()?;
        let path = self.key_path(key)?;
        // Written to a sibling temp file, then renamed over the key.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(BinderError::Io)?;
        fs::rename(&tmp, &path).map_err(BinderError::Io)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.key_path(key)?;
        if path.exists() {
            fs::remove_file(path).map_err(BinderError::Io)?;
        }
        Ok(())
    }
}
