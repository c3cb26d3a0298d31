use std::{marker::PhantomData, path::{Path, PathBuf}};
use tokio::fs;

use crate::errors::ServiceError;

/// JSON file mirror of an ordered list.
///
/// The whole list is rewritten on every save as a pretty-printed JSON array.
/// Writes go to a sibling `.tmp` file first and are renamed over the target,
/// so a reader never sees a half-written document.
#[derive(Debug, Clone)]
pub struct JsonListStore<T> {
    file_path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonListStore<T>
where
    T: serde::Serialize + serde::de::DeserializeOwned,
{
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { file_path: path.into(), _marker: PhantomData }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Read the list from disk.
    ///
    /// Returns `Ok(None)` when the file does not exist and `Err(Storage)` when it
    /// cannot be read or does not hold a JSON array of `T`.
    pub async fn load(&self) -> Result<Option<Vec<T>>, ServiceError> {
        let bytes = match fs::read(&self.file_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ServiceError::storage(format!("read {}: {e}", self.file_path.display()))),
        };
        let items: Vec<T> = serde_json::from_slice(&bytes)
            .map_err(|e| ServiceError::storage(format!("parse {}: {e}", self.file_path.display())))?;
        Ok(Some(items))
    }

    /// Replace the file contents with `items`.
    pub async fn save(&self, items: &[T]) -> Result<(), ServiceError> {
        let data = serde_json::to_vec_pretty(items).map_err(ServiceError::storage)?;
        let tmp = self.tmp_path();
        fs::write(&tmp, data)
            .await
            .map_err(|e| ServiceError::storage(format!("write {}: {e}", tmp.display())))?;
        if let Err(e) = fs::rename(&tmp, &self.file_path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(ServiceError::storage(format!("replace {}: {e}", self.file_path.display())));
        }
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.file_path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.file_path.with_file_name(name)
    }
}
