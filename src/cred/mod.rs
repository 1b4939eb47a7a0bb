pub mod credential;
pub mod index;
pub mod request;

pub use credential::{
    usage, CredField, CredType, Credential, CredentialData, Encoding, KeyData, OptionalData,
    SignedKeyData,
};
pub use index::CredentialStore;
pub use request::CredentialRequest;

#[derive(Debug, thiserror::Error)]
pub enum CredError {
    #[error("{cred_type} credential is missing {field}")]
    MissingField {
        cred_type: CredType,
        field: &'static str,
    },
    #[error("{0} credentials are not supported yet")]
    Unsupported(CredType),
    #[error("credential usage {0:?} is not supported yet")]
    UnsupportedUsage(String),
    #[error("{field} does not accept {encoding} encoding")]
    InvalidEncoding {
        field: &'static str,
        encoding: Encoding,
    },
    #[error("PIN is longer than {max} bytes")]
    PinTooLong { max: usize },
    #[error("credential {0} not found")]
    NotFound(u16),
    #[error("credential ids exhausted")]
    IdsExhausted,
    #[error("credential {id}: invalid base64 {field}: {reason}")]
    Base64 {
        id: u16,
        field: CredField,
        reason: String,
    },
}
