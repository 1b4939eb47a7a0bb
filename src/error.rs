#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Store: {0}")]
    Store(#[from] crate::persist::StoreError),
    #[error("Codec: {0}")]
    Codec(#[from] crate::codec::CodecError),
    #[error("Credential: {0}")]
    Credential(#[from] crate::cred::CredError),
    #[error("ACL: {0}")]
    Acl(#[from] crate::acl::AclError),
    #[error("Certificate chain: {0}")]
    CertChain(#[from] crate::x509::CertChainError),
    #[error("Session: {0}")]
    Session(#[from] crate::session::SessionError),
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Internal(String),
}

impl Error {
    /// Lookup misses by credential id or resource name.
    pub fn is_not_found(&self) -> bool {
        use crate::cred::CredError;
        use crate::persist::StoreError;

        match self {
            Error::Store(StoreError::NotFound(_))
            | Error::Credential(CredError::NotFound(_)) => true,
            Error::Session(e) => e.is_not_found(),
            _ => false,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
