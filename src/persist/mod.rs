pub mod disk;
pub mod memory;

use std::fmt;

pub use disk::FileByteStore;
pub use memory::MemoryByteStore;

/// The four secure virtual resources kept in an SVR database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Cred,
    Acl,
    Doxm,
    Pstat,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Cred,
        ResourceKind::Acl,
        ResourceKind::Doxm,
        ResourceKind::Pstat,
    ];

    /// Name the resource is stored under.
    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::Cred => "cred",
            ResourceKind::Acl => "acl",
            ResourceKind::Doxm => "doxm",
            ResourceKind::Pstat => "pstat",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Named byte-blob persistence.
pub trait ByteStore {
    /// Serialized bytes of `name`; `StoreError::NotFound` when absent or empty.
    fn get(&self, name: &str) -> Result<Vec<u8>, StoreError>;

    fn put(&mut self, name: &str, bytes: &[u8]) -> Result<(), StoreError>;
}

impl<T: ByteStore + ?Sized> ByteStore for Box<T> {
    fn get(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        (**self).get(name)
    }

    fn put(&mut self, name: &str, bytes: &[u8]) -> Result<(), StoreError> {
        (**self).put(name, bytes)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialize: {0}")]
    Serialization(String),
    #[error("Corrupt: {0}")]
    Corrupt(String),
    #[error("Not found: {0}")]
    NotFound(String),
}
