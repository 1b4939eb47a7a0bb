use ciborium::value::Value;

use super::cbor::{self, iv, tv, uuid_value};
use super::CodecError;
use crate::svr::{Dpm, Dpom, Pstat};

const IS_OP: &str = "isop";
const CM: &str = "cm";
const TM: &str = "tm";
const OM: &str = "om";
const SM: &str = "sm";
const ROWNER: &str = "rowneruuid";

pub(crate) fn decode(bytes: &[u8]) -> Result<Pstat, CodecError> {
    let m = cbor::parse_map(bytes)?;
    let bits = |key: &'static str| match cbor::get(&m, key) {
        Some(v) => cbor::u16_field(v, key),
        None => Ok(0),
    };
    let sm = match cbor::get(&m, SM) {
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| cbor::u16_field(v, SM).map(Dpom))
            .collect::<Result<Vec<_>, _>>()?,
        // Older databases carry a single mode.
        Some(v) => vec![Dpom(cbor::u16_field(v, SM)?)],
        None => Vec::new(),
    };
    Ok(Pstat {
        is_op: match cbor::get(&m, IS_OP) {
            Some(v) => cbor::boolean(v, IS_OP)?,
            None => false,
        },
        cm: Dpm(bits(CM)?),
        tm: Dpm(bits(TM)?),
        om: Dpom(bits(OM)?),
        sm,
        rowner: cbor::uuid_or_nil(&m, ROWNER)?,
    })
}

pub(crate) fn encode(pstat: &Pstat) -> Result<Vec<u8>, CodecError> {
    let sm = pstat.sm.iter().map(|d| iv(u64::from(d.0))).collect();
    cbor::encode(vec![
        (tv(IS_OP), Value::Bool(pstat.is_op)),
        (tv(CM), iv(u64::from(pstat.cm.0))),
        (tv(TM), iv(u64::from(pstat.tm.0))),
        (tv(OM), iv(u64::from(pstat.om.0))),
        (tv(SM), Value::Array(sm)),
        (tv(ROWNER), uuid_value(&pstat.rowner)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_pstat_survives_encode_decode() {
        let pstat = Pstat {
            is_op: true,
            cm: Dpm(Dpm::NORMAL),
            tm: Dpm(Dpm::PROVISION_ACLS),
            om: Dpom(Dpom::SINGLE_SERVICE_CLIENT_DRIVEN),
            sm: vec![Dpom(Dpom::SINGLE_SERVICE_CLIENT_DRIVEN)],
            rowner: Uuid::from_u128(7),
        };
        assert_eq!(decode(&encode(&pstat).unwrap()).unwrap(), pstat);
    }

    #[test]
    fn test_scalar_sm_accepted() {
        let bytes = cbor::encode(vec![(tv(SM), iv(4))]).unwrap();
        assert_eq!(decode(&bytes).unwrap().sm, vec![Dpom(4)]);
    }

    #[test]
    fn test_wrong_type_is_invalid() {
        let bytes = cbor::encode(vec![(tv(IS_OP), iv(1))]).unwrap();
        assert!(matches!(
            decode(&bytes),
            Err(CodecError::Invalid { field: IS_OP, .. })
        ));
    }
}
