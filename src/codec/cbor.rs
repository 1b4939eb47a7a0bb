use ciborium::value::Value;
use uuid::Uuid;

use super::CodecError;

pub(crate) type Map = Vec<(Value, Value)>;

pub(crate) fn parse_map(data: &[u8]) -> Result<Map, CodecError> {
    let value: Value =
        ciborium::from_reader(data).map_err(|e| CodecError::Cbor(e.to_string()))?;
    match value {
        Value::Map(map) => Ok(map),
        _ => Err(CodecError::Cbor("expected map".into())),
    }
}

pub(crate) fn encode(map: Map) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::new();
    ciborium::into_writer(&Value::Map(map), &mut buf)
        .map_err(|e| CodecError::Cbor(e.to_string()))?;
    Ok(buf)
}

pub(crate) fn get<'a>(map: &'a [(Value, Value)], key: &str) -> Option<&'a Value> {
    map.iter()
        .find(|(k, _)| matches!(k, Value::Text(s) if s == key))
        .map(|(_, v)| v)
}

pub(crate) fn require<'a>(map: &'a [(Value, Value)], key: &'static str) -> Result<&'a Value, CodecError> {
    get(map, key).ok_or(CodecError::Missing(key))
}

pub(crate) fn text(v: &Value, key: &'static str) -> Result<String, CodecError> {
    match v {
        Value::Text(s) => Ok(s.clone()),
        _ => Err(CodecError::invalid(key, "expected text")),
    }
}

pub(crate) fn boolean(v: &Value, key: &'static str) -> Result<bool, CodecError> {
    match v {
        Value::Bool(b) => Ok(*b),
        _ => Err(CodecError::invalid(key, "expected bool")),
    }
}

pub(crate) fn uint(v: &Value, key: &'static str) -> Result<u64, CodecError> {
    match v {
        Value::Integer(i) => u64::try_from(*i).map_err(|_| CodecError::invalid(key, "out of range")),
        _ => Err(CodecError::invalid(key, "expected integer")),
    }
}

pub(crate) fn u16_field(v: &Value, key: &'static str) -> Result<u16, CodecError> {
    u16::try_from(uint(v, key)?).map_err(|_| CodecError::invalid(key, "out of range"))
}

pub(crate) fn array<'a>(v: &'a Value, key: &'static str) -> Result<&'a [Value], CodecError> {
    match v {
        Value::Array(a) => Ok(a),
        _ => Err(CodecError::invalid(key, "expected array")),
    }
}

pub(crate) fn map<'a>(v: &'a Value, key: &'static str) -> Result<&'a [(Value, Value)], CodecError> {
    match v {
        Value::Map(m) => Ok(m),
        _ => Err(CodecError::invalid(key, "expected map")),
    }
}

/// Byte string, or the UTF-8 bytes of a text string.
pub(crate) fn bytes(v: &Value, key: &'static str) -> Result<Vec<u8>, CodecError> {
    match v {
        Value::Bytes(b) => Ok(b.clone()),
        Value::Text(s) => Ok(s.as_bytes().to_vec()),
        _ => Err(CodecError::invalid(key, "expected bytes")),
    }
}

pub(crate) fn text_list(v: &Value, key: &'static str) -> Result<Vec<String>, CodecError> {
    array(v, key)?.iter().map(|item| text(item, key)).collect()
}

pub(crate) fn uuid(v: &Value, key: &'static str) -> Result<Uuid, CodecError> {
    let s = text(v, key)?;
    Uuid::parse_str(&s).map_err(|e| CodecError::invalid(key, e.to_string()))
}

/// Optional uuid key; absent reads as nil.
pub(crate) fn uuid_or_nil(map: &[(Value, Value)], key: &'static str) -> Result<Uuid, CodecError> {
    get(map, key).map_or(Ok(Uuid::nil()), |v| uuid(v, key))
}

pub(crate) fn tv(s: &str) -> Value {
    Value::Text(s.to_string())
}

pub(crate) fn iv(i: u64) -> Value {
    Value::Integer(i.into())
}

pub(crate) fn uuid_value(id: &Uuid) -> Value {
    tv(&id.hyphenated().to_string())
}

pub(crate) fn text_list_value(items: &[String]) -> Value {
    Value::Array(items.iter().map(|s| tv(s)).collect())
}
