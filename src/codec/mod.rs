pub(crate) mod cbor;
mod acl;
mod cred;
mod doxm;
mod pstat;

use uuid::Uuid;

use crate::acl::Acl;
use crate::cred::Credential;
use crate::svr::{Doxm, Pstat};

/// Decoded credential resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredResource {
    pub creds: Vec<Credential>,
    pub rowner: Uuid,
}

/// Mapping between each resource's in-memory form and its serialized bytes.
pub trait SvrCodec {
    fn decode_cred(&self, bytes: &[u8]) -> Result<CredResource, CodecError>;
    fn encode_cred(&self, creds: &[Credential], rowner: &Uuid) -> Result<Vec<u8>, CodecError>;

    fn decode_acl(&self, bytes: &[u8]) -> Result<Acl, CodecError>;
    fn encode_acl(&self, acl: &Acl) -> Result<Vec<u8>, CodecError>;

    fn decode_doxm(&self, bytes: &[u8]) -> Result<Doxm, CodecError>;
    fn encode_doxm(&self, doxm: &Doxm) -> Result<Vec<u8>, CodecError>;

    fn decode_pstat(&self, bytes: &[u8]) -> Result<Pstat, CodecError>;
    fn encode_pstat(&self, pstat: &Pstat) -> Result<Vec<u8>, CodecError>;
}

/// CBOR mapping with OCF property names.
#[derive(Debug, Clone, Copy, Default)]
pub struct CborCodec;

impl SvrCodec for CborCodec {
    fn decode_cred(&self, bytes: &[u8]) -> Result<CredResource, CodecError> {
        cred::decode(bytes)
    }

    fn encode_cred(&self, creds: &[Credential], rowner: &Uuid) -> Result<Vec<u8>, CodecError> {
        cred::encode(creds, rowner)
    }

    fn decode_acl(&self, bytes: &[u8]) -> Result<Acl, CodecError> {
        acl::decode(bytes)
    }

    fn encode_acl(&self, acl: &Acl) -> Result<Vec<u8>, CodecError> {
        acl::encode(acl)
    }

    fn decode_doxm(&self, bytes: &[u8]) -> Result<Doxm, CodecError> {
        doxm::decode(bytes)
    }

    fn encode_doxm(&self, doxm: &Doxm) -> Result<Vec<u8>, CodecError> {
        doxm::encode(doxm)
    }

    fn decode_pstat(&self, bytes: &[u8]) -> Result<Pstat, CodecError> {
        pstat::decode(bytes)
    }

    fn encode_pstat(&self, pstat: &Pstat) -> Result<Vec<u8>, CodecError> {
        pstat::encode(pstat)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("cbor: {0}")]
    Cbor(String),
    #[error("missing {0}")]
    Missing(&'static str),
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl CodecError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        CodecError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
