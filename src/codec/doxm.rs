use ciborium::value::Value;

use super::cbor::{self, iv, tv, uuid_value};
use super::CodecError;
use crate::svr::Doxm;

const OXMS: &str = "oxms";
const OXM_SEL: &str = "oxmsel";
const SCT: &str = "sct";
const OWNED: &str = "owned";
const DEVICE_ID: &str = "deviceuuid";
const OWNER: &str = "devowneruuid";
const ROWNER: &str = "rowneruuid";

pub(crate) fn decode(bytes: &[u8]) -> Result<Doxm, CodecError> {
    let m = cbor::parse_map(bytes)?;
    let oxms = match cbor::get(&m, OXMS) {
        Some(v) => cbor::array(v, OXMS)?
            .iter()
            .map(|o| cbor::u16_field(o, OXMS))
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };
    let small = |key: &'static str| match cbor::get(&m, key) {
        Some(v) => cbor::u16_field(v, key),
        None => Ok(0),
    };
    Ok(Doxm {
        oxms,
        oxm_sel: small(OXM_SEL)?,
        sct: small(SCT)?,
        owned: match cbor::get(&m, OWNED) {
            Some(v) => cbor::boolean(v, OWNED)?,
            None => false,
        },
        device_id: cbor::uuid(cbor::require(&m, DEVICE_ID)?, DEVICE_ID)?,
        owner: cbor::uuid_or_nil(&m, OWNER)?,
        rowner: cbor::uuid_or_nil(&m, ROWNER)?,
    })
}

pub(crate) fn encode(doxm: &Doxm) -> Result<Vec<u8>, CodecError> {
    let oxms = doxm.oxms.iter().map(|o| iv(u64::from(*o))).collect();
    cbor::encode(vec![
        (tv(OXMS), Value::Array(oxms)),
        (tv(OXM_SEL), iv(u64::from(doxm.oxm_sel))),
        (tv(SCT), iv(u64::from(doxm.sct))),
        (tv(OWNED), Value::Bool(doxm.owned)),
        (tv(DEVICE_ID), uuid_value(&doxm.device_id)),
        (tv(OWNER), uuid_value(&doxm.owner)),
        (tv(ROWNER), uuid_value(&doxm.rowner)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_doxm_survives_encode_decode() {
        let doxm = Doxm {
            oxms: vec![0, 1, 2],
            oxm_sel: 2,
            sct: 9,
            owned: true,
            device_id: Uuid::from_u128(1),
            owner: Uuid::from_u128(2),
            rowner: Uuid::from_u128(3),
        };
        assert_eq!(decode(&encode(&doxm).unwrap()).unwrap(), doxm);
    }

    #[test]
    fn test_device_id_is_required() {
        let bytes = cbor::encode(vec![(tv(OWNED), Value::Bool(false))]).unwrap();
        assert!(matches!(decode(&bytes), Err(CodecError::Missing(DEVICE_ID))));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let bytes = cbor::encode(vec![
            (tv(DEVICE_ID), tv("61646d69-6e44-6576-6963-655575696430")),
            (tv("dpc"), Value::Bool(true)),
        ])
        .unwrap();
        let doxm = decode(&bytes).unwrap();
        assert!(!doxm.owned);
        assert!(doxm.owner.is_nil());
    }
}
