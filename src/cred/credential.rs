use std::borrow::Cow;
use std::fmt;

use base64::Engine;
use serde::{Serialize, Serializer};

use super::CredError;
use crate::subject::Subject;

/// Well-known credential usages for signed asymmetric keys.
pub mod usage {
    pub const TRUST_CA: &str = "oic.sec.cred.trustca";
    pub const PRIMARY_CERT: &str = "oic.sec.cred.cert";
    pub const MF_TRUST_CA: &str = "oic.sec.cred.mfgtrustca";
    pub const MF_PRIMARY_CERT: &str = "oic.sec.cred.mfgcert";

    pub fn is_trust_anchor(usage: &str) -> bool {
        usage == TRUST_CA || usage == MF_TRUST_CA
    }

    pub fn is_primary_cert(usage: &str) -> bool {
        usage == PRIMARY_CERT || usage == MF_PRIMARY_CERT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CredType {
    SymmetricPairwiseKey,
    SymmetricGroupKey,
    AsymmetricKey,
    SignedAsymmetricKey,
    PinPassword,
    AsymmetricEncryptionKey,
}

impl CredType {
    pub const ALL: [CredType; 6] = [
        CredType::SymmetricPairwiseKey,
        CredType::SymmetricGroupKey,
        CredType::AsymmetricKey,
        CredType::SignedAsymmetricKey,
        CredType::PinPassword,
        CredType::AsymmetricEncryptionKey,
    ];

    /// OCF `credtype` bit value.
    pub fn bits(self) -> u8 {
        match self {
            CredType::SymmetricPairwiseKey => 1,
            CredType::SymmetricGroupKey => 2,
            CredType::AsymmetricKey => 4,
            CredType::SignedAsymmetricKey => 8,
            CredType::PinPassword => 16,
            CredType::AsymmetricEncryptionKey => 32,
        }
    }

    pub fn from_bits(bits: u64) -> Option<Self> {
        CredType::ALL.into_iter().find(|t| u64::from(t.bits()) == bits)
    }

    /// Types the credential edit workflow can build.
    pub fn is_editable(self) -> bool {
        matches!(self, CredType::SignedAsymmetricKey | CredType::PinPassword)
    }
}

impl fmt::Display for CredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CredType::SymmetricPairwiseKey => "SYMMETRIC_PAIR_WISE_KEY",
            CredType::SymmetricGroupKey => "SYMMETRIC_GROUP_KEY",
            CredType::AsymmetricKey => "ASYMMETRIC_KEY",
            CredType::SignedAsymmetricKey => "SIGNED_ASYMMETRIC_KEY",
            CredType::PinPassword => "PIN_PASSWORD",
            CredType::AsymmetricEncryptionKey => "ASYMMETRIC_ENCRYPTION_KEY",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    Raw,
    Base64,
    Pem,
    Der,
}

impl Encoding {
    pub fn ocf_name(self) -> &'static str {
        match self {
            Encoding::Raw => "oic.sec.encoding.raw",
            Encoding::Base64 => "oic.sec.encoding.base64",
            Encoding::Pem => "oic.sec.encoding.pem",
            Encoding::Der => "oic.sec.encoding.der",
        }
    }

    pub fn from_ocf_name(name: &str) -> Option<Self> {
        [Encoding::Raw, Encoding::Base64, Encoding::Pem, Encoding::Der]
            .into_iter()
            .find(|e| e.ocf_name() == name)
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Encoding::Raw => "OIC_ENCODING_RAW",
            Encoding::Base64 => "OIC_ENCODING_BASE64",
            Encoding::Pem => "OIC_ENCODING_PEM",
            Encoding::Der => "OIC_ENCODING_DER",
        };
        f.write_str(name)
    }
}

fn hex_bytes<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(data))
}

/// Key material tagged with the encoding it is stored in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyData {
    pub encoding: Encoding,
    #[serde(serialize_with = "hex_bytes")]
    pub data: Vec<u8>,
}

impl KeyData {
    pub fn new(encoding: Encoding, data: impl Into<Vec<u8>>) -> Self {
        Self {
            encoding,
            data: data.into(),
        }
    }

    pub fn raw(data: impl Into<Vec<u8>>) -> Self {
        Self::new(Encoding::Raw, data)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Stored bytes with base64 undone; other encodings pass through.
    pub fn decoded(&self) -> Result<Cow<'_, [u8]>, base64::DecodeError> {
        if self.encoding != Encoding::Base64 {
            return Ok(Cow::Borrowed(&self.data));
        }
        // Stored base64 text may carry a NUL terminator or line breaks.
        let text: Vec<u8> = self
            .data
            .iter()
            .copied()
            .filter(|b| *b != 0 && !b.is_ascii_whitespace())
            .collect();
        base64::engine::general_purpose::STANDARD
            .decode(text)
            .map(Cow::Owned)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionalData {
    #[serde(flatten)]
    pub key: KeyData,
    pub revoked: bool,
}

impl OptionalData {
    pub fn new(key: KeyData) -> Self {
        Self {
            key,
            revoked: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignedKeyData {
    pub usage: String,
    pub private: Option<KeyData>,
    pub public: Option<KeyData>,
    pub optional: Option<OptionalData>,
}

/// Fields present for each credential type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "credtype", rename_all = "kebab-case")]
pub enum CredentialData {
    SymmetricPairwiseKey {
        private: KeyData,
    },
    SymmetricGroupKey {
        private: KeyData,
    },
    AsymmetricKey {
        public: KeyData,
        private: Option<KeyData>,
    },
    SignedAsymmetricKey(SignedKeyData),
    PinPassword {
        private: KeyData,
    },
    AsymmetricEncryptionKey {
        private: KeyData,
        public: Option<KeyData>,
    },
}

/// Field selector for key-material scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredField {
    Private,
    Public,
    Optional,
}

impl fmt::Display for CredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CredField::Private => "privatedata",
            CredField::Public => "publicdata",
            CredField::Optional => "optionaldata",
        })
    }
}

fn present(field: Option<&KeyData>) -> bool {
    field.is_some_and(|k| !k.is_empty())
}

impl CredentialData {
    pub fn cred_type(&self) -> CredType {
        match self {
            CredentialData::SymmetricPairwiseKey { .. } => CredType::SymmetricPairwiseKey,
            CredentialData::SymmetricGroupKey { .. } => CredType::SymmetricGroupKey,
            CredentialData::AsymmetricKey { .. } => CredType::AsymmetricKey,
            CredentialData::SignedAsymmetricKey(_) => CredType::SignedAsymmetricKey,
            CredentialData::PinPassword { .. } => CredType::PinPassword,
            CredentialData::AsymmetricEncryptionKey { .. } => CredType::AsymmetricEncryptionKey,
        }
    }

    pub fn usage(&self) -> Option<&str> {
        match self {
            CredentialData::SignedAsymmetricKey(signed) => Some(&signed.usage),
            _ => None,
        }
    }

    pub fn private_data(&self) -> Option<&KeyData> {
        match self {
            CredentialData::SymmetricPairwiseKey { private }
            | CredentialData::SymmetricGroupKey { private }
            | CredentialData::PinPassword { private }
            | CredentialData::AsymmetricEncryptionKey { private, .. } => Some(private),
            CredentialData::AsymmetricKey { private, .. } => private.as_ref(),
            CredentialData::SignedAsymmetricKey(signed) => signed.private.as_ref(),
        }
    }

    pub fn public_data(&self) -> Option<&KeyData> {
        match self {
            CredentialData::AsymmetricKey { public, .. } => Some(public),
            CredentialData::AsymmetricEncryptionKey { public, .. } => public.as_ref(),
            CredentialData::SignedAsymmetricKey(signed) => signed.public.as_ref(),
            _ => None,
        }
    }

    pub fn optional_data(&self) -> Option<&OptionalData> {
        match self {
            CredentialData::SignedAsymmetricKey(signed) => signed.optional.as_ref(),
            _ => None,
        }
    }

    pub fn field(&self, field: CredField) -> Option<&KeyData> {
        match field {
            CredField::Private => self.private_data(),
            CredField::Public => self.public_data(),
            CredField::Optional => self.optional_data().map(|o| &o.key),
        }
    }

    /// Every field the type requires must be non-empty.
    pub fn validate(&self) -> Result<(), CredError> {
        let cred_type = self.cred_type();
        let missing = |field: &'static str| CredError::MissingField { cred_type, field };

        match self {
            CredentialData::SymmetricPairwiseKey { private }
            | CredentialData::SymmetricGroupKey { private }
            | CredentialData::PinPassword { private }
            | CredentialData::AsymmetricEncryptionKey { private, .. } => {
                if private.is_empty() {
                    return Err(missing("privatedata"));
                }
            }
            CredentialData::AsymmetricKey { public, .. } => {
                if public.is_empty() {
                    return Err(missing("publicdata"));
                }
            }
            CredentialData::SignedAsymmetricKey(signed) => {
                if signed.usage.is_empty() {
                    return Err(missing("credusage"));
                }
                if usage::is_trust_anchor(&signed.usage) {
                    if !present(signed.optional.as_ref().map(|o| &o.key)) {
                        return Err(missing("optionaldata"));
                    }
                } else if usage::is_primary_cert(&signed.usage) {
                    if !present(signed.private.as_ref()) {
                        return Err(missing("privatedata"));
                    }
                    if !present(signed.public.as_ref()) {
                        return Err(missing("publicdata"));
                    }
                } else if !present(signed.private.as_ref())
                    && !present(signed.public.as_ref())
                    && !present(signed.optional.as_ref().map(|o| &o.key))
                {
                    return Err(missing("key material"));
                }
            }
        }
        Ok(())
    }
}

/// One secret or key-material record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credential {
    /// Assigned by the credential store; zero until added.
    #[serde(rename = "credid")]
    pub id: u16,
    pub subject: Subject,
    #[serde(flatten)]
    pub data: CredentialData,
}

impl Credential {
    pub fn new(subject: Subject, data: CredentialData) -> Self {
        Self {
            id: 0,
            subject,
            data,
        }
    }

    pub fn cred_type(&self) -> CredType {
        self.data.cred_type()
    }

    pub fn usage(&self) -> Option<&str> {
        self.data.usage()
    }

    pub fn validate(&self) -> Result<(), CredError> {
        self.data.validate()
    }
}
