use ciborium::value::Value;

use super::cbor::{self, iv, text_list_value, tv, uuid_value, Map};
use super::CodecError;
use crate::acl::{Ace, AceResource, Acl, Permission, Validity};
use crate::subject::Subject;

const ACLIST: &str = "aclist2";
const ACE_ID: &str = "aceid";
const SUBJECT: &str = "subject";
const SUBJECT_UUID: &str = "uuid";
const RESOURCES: &str = "resources";
const HREF: &str = "href";
const REL: &str = "rel";
const RT: &str = "rt";
const IF: &str = "if";
const PERMISSION: &str = "permission";
const VALIDITY: &str = "validity";
const ROWNER: &str = "rowneruuid";

pub(crate) fn decode(bytes: &[u8]) -> Result<Acl, CodecError> {
    let root = cbor::parse_map(bytes)?;
    let aces = match cbor::get(&root, ACLIST) {
        Some(v) => cbor::array(v, ACLIST)?
            .iter()
            .map(|item| decode_ace(cbor::map(item, ACLIST)?))
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };
    Ok(Acl {
        aces,
        rowner: cbor::uuid_or_nil(&root, ROWNER)?,
    })
}

fn decode_ace(m: &[(Value, Value)]) -> Result<Ace, CodecError> {
    let subject_map = cbor::map(cbor::require(m, SUBJECT)?, SUBJECT)?;
    let subject = cbor::text(cbor::require(subject_map, SUBJECT_UUID)?, SUBJECT_UUID)?
        .parse::<Subject>()
        .map_err(|e| CodecError::invalid(SUBJECT_UUID, e.reason))?;

    let permission = Permission(cbor::u16_field(cbor::require(m, PERMISSION)?, PERMISSION)?);
    if permission.bits() > Permission::FULL_CONTROL.bits() {
        return Err(CodecError::invalid(
            PERMISSION,
            format!("unknown bits in {}", permission.bits()),
        ));
    }

    // Every ACE governs at least one resource.
    let resources = cbor::array(cbor::require(m, RESOURCES)?, RESOURCES)?
        .iter()
        .map(|item| decode_resource(cbor::map(item, RESOURCES)?))
        .collect::<Result<Vec<_>, _>>()?;
    if resources.is_empty() {
        return Err(CodecError::invalid(RESOURCES, "ACE has no resources"));
    }

    let validities = match cbor::get(m, VALIDITY) {
        Some(v) => cbor::array(v, VALIDITY)?
            .iter()
            .map(decode_validity)
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    Ok(Ace {
        subject,
        permission,
        resources,
        validities,
    })
}

fn decode_resource(m: &[(Value, Value)]) -> Result<AceResource, CodecError> {
    let rel = match cbor::get(m, REL) {
        Some(v) => Some(cbor::text(v, REL)?),
        None => None,
    };
    let list = |key: &'static str| match cbor::get(m, key) {
        Some(v) => cbor::text_list(v, key),
        None => Ok(Vec::new()),
    };
    Ok(AceResource {
        href: cbor::text(cbor::require(m, HREF)?, HREF)?,
        rel,
        types: list(RT)?,
        interfaces: list(IF)?,
    })
}

/// `[period, [recurrence, ...]]`
fn decode_validity(v: &Value) -> Result<Validity, CodecError> {
    let pair = cbor::array(v, VALIDITY)?;
    let period = pair
        .first()
        .ok_or_else(|| CodecError::invalid(VALIDITY, "missing period"))?;
    let recurrences = match pair.get(1) {
        Some(r) => cbor::text_list(r, VALIDITY)?,
        None => Vec::new(),
    };
    Ok(Validity {
        period: cbor::text(period, VALIDITY)?,
        recurrences,
    })
}

pub(crate) fn encode(acl: &Acl) -> Result<Vec<u8>, CodecError> {
    let list = acl
        .aces
        .iter()
        .enumerate()
        .map(|(i, ace)| encode_ace(i + 1, ace))
        .collect();
    cbor::encode(vec![
        (tv(ACLIST), Value::Array(list)),
        (tv(ROWNER), uuid_value(&acl.rowner)),
    ])
}

fn encode_ace(ace_id: usize, ace: &Ace) -> Value {
    let resources = ace.resources.iter().map(encode_resource).collect();
    let mut m: Map = vec![
        (tv(ACE_ID), iv(ace_id as u64)),
        (tv(SUBJECT), Value::Map(vec![(tv(SUBJECT_UUID), tv(&ace.subject.to_string()))])),
        (tv(RESOURCES), Value::Array(resources)),
        (tv(PERMISSION), iv(u64::from(ace.permission.bits()))),
    ];
    if !ace.validities.is_empty() {
        let validities = ace
            .validities
            .iter()
            .map(|v| Value::Array(vec![tv(&v.period), text_list_value(&v.recurrences)]))
            .collect();
        m.push((tv(VALIDITY), Value::Array(validities)));
    }
    Value::Map(m)
}

fn encode_resource(rsrc: &AceResource) -> Value {
    let mut m: Map = vec![(tv(HREF), tv(&rsrc.href))];
    if let Some(rel) = &rsrc.rel {
        m.push((tv(REL), tv(rel)));
    }
    m.push((tv(RT), text_list_value(&rsrc.types)));
    m.push((tv(IF), text_list_value(&rsrc.interfaces)));
    Value::Map(m)
}
