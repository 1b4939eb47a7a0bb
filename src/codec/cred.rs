use ciborium::value::Value;
use uuid::Uuid;

use super::cbor::{self, iv, tv, uuid_value, Map};
use super::{CodecError, CredResource};
use crate::cred::{
    CredType, Credential, CredentialData, Encoding, KeyData, OptionalData, SignedKeyData,
};
use crate::subject::Subject;

const CREDS: &str = "creds";
const CRED_ID: &str = "credid";
const SUBJECT: &str = "subjectuuid";
const CRED_TYPE: &str = "credtype";
const CRED_USAGE: &str = "credusage";
const PRIVATE_DATA: &str = "privatedata";
const PUBLIC_DATA: &str = "publicdata";
const OPTIONAL_DATA: &str = "optionaldata";
const ENCODING: &str = "encoding";
const DATA: &str = "data";
const REVSTAT: &str = "revstat";
const ROWNER: &str = "rowneruuid";

pub(crate) fn decode(bytes: &[u8]) -> Result<CredResource, CodecError> {
    let root = cbor::parse_map(bytes)?;
    let creds = match cbor::get(&root, CREDS) {
        Some(v) => cbor::array(v, CREDS)?
            .iter()
            .map(|item| decode_credential(cbor::map(item, CREDS)?))
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };
    Ok(CredResource {
        creds,
        rowner: cbor::uuid_or_nil(&root, ROWNER)?,
    })
}

fn decode_credential(m: &[(Value, Value)]) -> Result<Credential, CodecError> {
    let id = match cbor::get(m, CRED_ID) {
        Some(v) => cbor::u16_field(v, CRED_ID)?,
        None => 0,
    };
    let subject = cbor::text(cbor::require(m, SUBJECT)?, SUBJECT)?
        .parse::<Subject>()
        .map_err(|e| CodecError::invalid(SUBJECT, e.reason))?;
    let bits = cbor::uint(cbor::require(m, CRED_TYPE)?, CRED_TYPE)?;
    let cred_type = CredType::from_bits(bits)
        .ok_or_else(|| CodecError::invalid(CRED_TYPE, format!("unknown credential type {bits}")))?;

    let private = key_block(m, PRIVATE_DATA)?;
    let public = key_block(m, PUBLIC_DATA)?;
    let optional = optional_data(m)?;
    // Required blocks that are absent decode as empty; the store rejects them.
    let or_empty = |k: Option<KeyData>| k.unwrap_or_else(|| KeyData::raw(Vec::new()));

    let data = match cred_type {
        CredType::SymmetricPairwiseKey => CredentialData::SymmetricPairwiseKey {
            private: or_empty(private),
        },
        CredType::SymmetricGroupKey => CredentialData::SymmetricGroupKey {
            private: or_empty(private),
        },
        CredType::AsymmetricKey => CredentialData::AsymmetricKey {
            public: or_empty(public),
            private,
        },
        CredType::SignedAsymmetricKey => {
            let usage = match cbor::get(m, CRED_USAGE) {
                Some(v) => cbor::text(v, CRED_USAGE)?,
                None => String::new(),
            };
            CredentialData::SignedAsymmetricKey(SignedKeyData {
                usage,
                private,
                public,
                optional,
            })
        }
        CredType::PinPassword => CredentialData::PinPassword {
            private: or_empty(private),
        },
        CredType::AsymmetricEncryptionKey => CredentialData::AsymmetricEncryptionKey {
            private: or_empty(private),
            public,
        },
    };

    Ok(Credential { id, subject, data })
}

fn key_block(m: &[(Value, Value)], key: &'static str) -> Result<Option<KeyData>, CodecError> {
    let Some(v) = cbor::get(m, key) else {
        return Ok(None);
    };
    let block = cbor::map(v, key)?;
    let name = cbor::text(cbor::require(block, ENCODING)?, ENCODING)?;
    let encoding = Encoding::from_ocf_name(&name)
        .ok_or_else(|| CodecError::invalid(ENCODING, format!("unknown encoding {name:?}")))?;
    let data = match cbor::get(block, DATA) {
        Some(v) => cbor::bytes(v, DATA)?,
        None => Vec::new(),
    };
    Ok(Some(KeyData::new(encoding, data)))
}

fn optional_data(m: &[(Value, Value)]) -> Result<Option<OptionalData>, CodecError> {
    let Some(key) = key_block(m, OPTIONAL_DATA)? else {
        return Ok(None);
    };
    // key_block already checked that the value is a map.
    let block = cbor::map(cbor::require(m, OPTIONAL_DATA)?, OPTIONAL_DATA)?;
    let revoked = match cbor::get(block, REVSTAT) {
        Some(v) => cbor::boolean(v, REVSTAT)?,
        None => false,
    };
    Ok(Some(OptionalData { key, revoked }))
}

pub(crate) fn encode(creds: &[Credential], rowner: &Uuid) -> Result<Vec<u8>, CodecError> {
    let list = creds.iter().map(encode_credential).collect();
    cbor::encode(vec![
        (tv(CREDS), Value::Array(list)),
        (tv(ROWNER), uuid_value(rowner)),
    ])
}

fn encode_credential(cred: &Credential) -> Value {
    let mut m: Map = vec![
        (tv(CRED_ID), iv(u64::from(cred.id))),
        (tv(SUBJECT), tv(&cred.subject.to_string())),
        (tv(CRED_TYPE), iv(u64::from(cred.cred_type().bits()))),
    ];
    if let Some(usage) = cred.usage() {
        m.push((tv(CRED_USAGE), tv(usage)));
    }
    if let Some(private) = cred.data.private_data() {
        m.push((tv(PRIVATE_DATA), Value::Map(key_block_value(private))));
    }
    if let Some(public) = cred.data.public_data() {
        m.push((tv(PUBLIC_DATA), Value::Map(key_block_value(public))));
    }
    if let Some(optional) = cred.data.optional_data() {
        let mut block = key_block_value(&optional.key);
        block.push((tv(REVSTAT), Value::Bool(optional.revoked)));
        m.push((tv(OPTIONAL_DATA), Value::Map(block)));
    }
    Value::Map(m)
}

/// Base64 and PEM payloads go out as text when they are valid UTF-8.
fn key_block_value(key: &KeyData) -> Map {
    let data = match key.encoding {
        Encoding::Base64 | Encoding::Pem => match std::str::from_utf8(&key.data) {
            Ok(s) => tv(s),
            Err(_) => Value::Bytes(key.data.clone()),
        },
        Encoding::Raw | Encoding::Der => Value::Bytes(key.data.clone()),
    };
    vec![(tv(ENCODING), tv(key.encoding.ocf_name())), (tv(DATA), data)]
}
