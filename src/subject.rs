use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use uuid::Uuid;

/// Byte form of the wildcard subject: `'*'` followed by zeros.
pub const WILDCARD_SUBJECT_BYTES: [u8; 16] = [
    b'*', 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
];
pub const WILDCARD_SUBJECT_TEXT: &str = "*";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subject {
    /// Applies to every subject.
    Wildcard,
    Id(Uuid),
}

#[derive(Debug, thiserror::Error)]
#[error("invalid subject {input:?}: {reason}")]
pub struct SubjectParseError {
    pub input: String,
    pub reason: String,
}

impl Subject {
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        if bytes == WILDCARD_SUBJECT_BYTES {
            Subject::Wildcard
        } else {
            Subject::Id(Uuid::from_bytes(bytes))
        }
    }

    pub fn to_bytes(&self) -> [u8; 16] {
        match self {
            Subject::Wildcard => WILDCARD_SUBJECT_BYTES,
            Subject::Id(id) => *id.as_bytes(),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Subject::Wildcard)
    }
}

impl From<Uuid> for Subject {
    fn from(id: Uuid) -> Self {
        Subject::from_bytes(*id.as_bytes())
    }
}

impl FromStr for Subject {
    type Err = SubjectParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == WILDCARD_SUBJECT_TEXT {
            return Ok(Subject::Wildcard);
        }
        Uuid::parse_str(s)
            .map(Subject::from)
            .map_err(|e| SubjectParseError {
                input: s.to_string(),
                reason: e.to_string(),
            })
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Wildcard => f.write_str(WILDCARD_SUBJECT_TEXT),
            Subject::Id(id) => write!(f, "{}", id.hyphenated()),
        }
    }
}

impl Serialize for Subject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
