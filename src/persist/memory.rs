use std::collections::HashMap;

use super::{ByteStore, StoreError};

/// In-process byte store, keyed by resource name.
#[derive(Debug, Default, Clone)]
pub struct MemoryByteStore {
    blobs: HashMap<String, Vec<u8>>,
}

impl MemoryByteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, bytes: Vec<u8>) -> Self {
        self.blobs.insert(name.to_string(), bytes);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.blobs.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Vec<u8>> {
        self.blobs.remove(name)
    }
}

impl ByteStore for MemoryByteStore {
    fn get(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        match self.blobs.get(name) {
            Some(bytes) if !bytes.is_empty() => Ok(bytes.clone()),
            _ => Err(StoreError::NotFound(name.to_string())),
        }
    }

    fn put(&mut self, name: &str, bytes: &[u8]) -> Result<(), StoreError> {
        self.blobs.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_and_empty_are_not_found() {
        let store = MemoryByteStore::new().with("acl", Vec::new());
        assert!(matches!(store.get("acl"), Err(StoreError::NotFound(n)) if n == "acl"));
        assert!(matches!(store.get("cred"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_put_overwrites() {
        let mut store = MemoryByteStore::new();
        store.put("doxm", b"one").unwrap();
        store.put("doxm", b"two").unwrap();
        assert_eq!(store.get("doxm").unwrap(), b"two");
    }
}
