use std::io::{self, Write};

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use directories::BaseDirs;

use crate::error::DexError;

/// String-blob persistence with no transactional guarantees.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, DexError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), DexError>;
}

/// Stores each key as `<root>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: Utf8PathBuf,
}

impl FileStore {
    pub fn new_with_root(root: Utf8PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn path_for(&self, key: &str) -> Utf8PathBuf {
        let file_name: String = key
            .chars()
            .map(|ch| {
                if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                    ch
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(format!("{file_name}.json"))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, DexError> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(path.as_std_path()).await {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(DexError::StorageRead(format!("{path}: {err}"))),
        }
    }

    /// Each write goes to its own temp file in the store root and is then
    /// renamed over the target, so concurrent writers never share a file.
    async fn set(&self, key: &str, value: &str) -> Result<(), DexError> {
        let root = self.root.clone();
        let path = self.path_for(key);
        let value = value.to_string();
        tokio::task::spawn_blocking(move || write_atomic(&root, &path, value.as_bytes()))
            .await
            .map_err(|err| DexError::StorageWrite(err.to_string()))?
    }
}

fn write_atomic(root: &Utf8Path, path: &Utf8Path, bytes: &[u8]) -> Result<(), DexError> {
    std::fs::create_dir_all(root.as_std_path())
        .map_err(|err| DexError::StorageWrite(format!("{root}: {err}")))?;
    let mut temp = tempfile::Builder::new()
        .prefix(".pokedex-write")
        .tempfile_in(root.as_std_path())
        .map_err(|err| DexError::StorageWrite(format!("{root}: {err}")))?;
    temp.write_all(bytes)
        .and_then(|()| temp.as_file().sync_all())
        .map_err(|err| DexError::StorageWrite(format!("{path}: {err}")))?;
    temp.persist(path.as_std_path())
        .map_err(|err| DexError::StorageWrite(format!("{path}: {err}")))?;
    Ok(())
}

pub fn default_data_dir() -> Result<Utf8PathBuf, DexError> {
    BaseDirs::new()
        .and_then(|dirs| Utf8PathBuf::from_path_buf(dirs.data_local_dir().join("pokedex")).ok())
        .ok_or_else(|| DexError::StorageRead("unable to resolve data directory".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_for_sanitizes_key() {
        let store = FileStore::new_with_root(Utf8PathBuf::from("/tmp/dex"));
        assert_eq!(
            store.path_for("pokedex_favourites"),
            Utf8PathBuf::from("/tmp/dex/pokedex_favourites.json")
        );
        assert_eq!(
            store.path_for("../escape"),
            Utf8PathBuf::from("/tmp/dex/___escape.json")
        );
    }
}
