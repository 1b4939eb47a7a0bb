use std::ffi::OsString;
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

use ciborium::value::Value;

use super::{ByteStore, StoreError};

/// SVR database file: a single CBOR map from resource name to the
/// resource's CBOR value.
#[derive(Debug, Clone)]
pub struct FileByteStore {
    path: PathBuf,
}

impl FileByteStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name: OsString = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| OsString::from("svrdb"));
        name.push(suffix);
        self.path.with_file_name(name)
    }

    /// Read every top-level entry. A missing or empty file is an empty database.
    fn read_entries(&self) -> Result<Vec<(Value, Value)>, StoreError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if bytes.is_empty() {
            return Ok(Vec::new());
        }
        let value: Value = ciborium::from_reader(bytes.as_slice())
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        match value {
            Value::Map(entries) => Ok(entries),
            _ => Err(StoreError::Corrupt("top-level value is not a map".into())),
        }
    }

    /// Write to a sibling temp file, then rename over the database.
    fn write_entries(&self, entries: Vec<(Value, Value)>) -> Result<(), StoreError> {
        let mut buf = Vec::new();
        ciborium::into_writer(&Value::Map(entries), &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let tmp = self.sibling(".tmp");
        std::fs::write(&tmp, &buf)?;
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

fn is_named(key: &Value, name: &str) -> bool {
    matches!(key, Value::Text(k) if k == name)
}

impl ByteStore for FileByteStore {
    fn get(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        let entries = self.read_entries()?;
        let value = entries
            .iter()
            .find(|(k, _)| is_named(k, name))
            .map(|(_, v)| v)
            .filter(|v| !v.is_null())
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;

        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    fn put(&mut self, name: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let value: Value = ciborium::from_reader(bytes)
            .map_err(|e| StoreError::Serialization(format!("{name} payload is not CBOR: {e}")))?;

        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.sibling(".lock"))?;
        let mut lock = fd_lock::RwLock::new(lock_file);
        let _guard = lock.write()?;

        let mut entries = self.read_entries()?;
        match entries.iter_mut().find(|(k, _)| is_named(k, name)) {
            Some((_, slot)) => *slot = value,
            None => entries.push((Value::Text(name.to_string()), value)),
        }
        self.write_entries(entries)?;
        tracing::debug!(path = %self.path.display(), resource = name, "Resource written");
        Ok(())
    }
}
