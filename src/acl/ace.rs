use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use uuid::Uuid;

use super::AclError;
use crate::config::MAX_ENTITIES;
use crate::subject::Subject;

/// CRUDN permission bitmask; zero grants nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Permission(pub u16);

impl Permission {
    pub const NONE: Permission = Permission(0);
    pub const CREATE: Permission = Permission(0x01);
    pub const READ: Permission = Permission(0x02);
    pub const WRITE: Permission = Permission(0x04);
    pub const DELETE: Permission = Permission(0x08);
    pub const NOTIFY: Permission = Permission(0x10);
    pub const FULL_CONTROL: Permission = Permission(0x1F);

    const NAMED: [(Permission, &'static str, char); 5] = [
        (Permission::CREATE, "CREATE", 'c'),
        (Permission::READ, "READ", 'r'),
        (Permission::WRITE, "WRITE", 'w'),
        (Permission::DELETE, "DELETE", 'd'),
        (Permission::NOTIFY, "NOTIFY", 'n'),
    ];

    pub fn bits(self) -> u16 {
        self.0
    }

    pub fn contains(self, other: Permission) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn names(self) -> Vec<&'static str> {
        Self::NAMED
            .iter()
            .filter(|(p, _, _)| self.contains(*p))
            .map(|(_, name, _)| *name)
            .collect()
    }
}

impl std::ops::BitOr for Permission {
    type Output = Permission;

    fn bitor(self, rhs: Permission) -> Permission {
        Permission(self.0 | rhs.0)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "0 (NO PERMISSION)");
        }
        write!(f, "{} ({})", self.0, self.names().join(" "))
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid permission {0:?}: expected a number or letters from \"crwdn\"")]
pub struct PermissionParseError(pub String);

impl FromStr for Permission {
    type Err = PermissionParseError;

    /// Accepts decimal bits, `full`, `none`, or any subset of `crwdn`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "full" => return Ok(Permission::FULL_CONTROL),
            "none" => return Ok(Permission::NONE),
            _ => {}
        }
        if let Ok(bits) = s.parse::<u16>() {
            if bits & !Permission::FULL_CONTROL.0 != 0 {
                return Err(PermissionParseError(s.to_string()));
            }
            return Ok(Permission(bits));
        }
        let mut perm = Permission::NONE;
        for ch in s.chars() {
            let (p, _, _) = Self::NAMED
                .iter()
                .find(|(_, _, letter)| *letter == ch.to_ascii_lowercase())
                .ok_or_else(|| PermissionParseError(s.to_string()))?;
            perm = perm | *p;
        }
        Ok(perm)
    }
}

/// A resource governed by an ACE.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct AceResource {
    pub href: String,
    pub rel: Option<String>,
    #[serde(rename = "rt")]
    pub types: Vec<String>,
    #[serde(rename = "if")]
    pub interfaces: Vec<String>,
}

impl AceResource {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, rt: impl Into<String>) -> Self {
        self.types.push(rt.into());
        self
    }

    pub fn with_interface(mut self, iface: impl Into<String>) -> Self {
        self.interfaces.push(iface.into());
        self
    }
}

/// Time window an ACE applies in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validity {
    pub period: String,
    pub recurrences: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ace {
    pub subject: Subject,
    pub permission: Permission,
    pub resources: Vec<AceResource>,
    pub validities: Vec<Validity>,
}

impl Ace {
    pub fn new(subject: Subject, permission: Permission) -> Self {
        Self {
            subject,
            permission,
            resources: Vec::new(),
            validities: Vec::new(),
        }
    }

    pub fn with_resource(mut self, resource: AceResource) -> Self {
        self.resources.push(resource);
        self
    }

    pub fn with_validity(mut self, validity: Validity) -> Self {
        self.validities.push(validity);
        self
    }

    /// Entry rules for a newly added ACE.
    pub fn validate(&self) -> Result<(), AclError> {
        if self.resources.is_empty() {
            return Err(AclError::NoResources);
        }
        if self.resources.len() > MAX_ENTITIES {
            return Err(AclError::TooMany {
                what: "resources",
                count: self.resources.len(),
            });
        }
        for rsrc in &self.resources {
            if rsrc.href.is_empty() {
                return Err(AclError::EmptyHref);
            }
            for (what, list) in [("resource types", &rsrc.types), ("interfaces", &rsrc.interfaces)] {
                if list.is_empty() {
                    return Err(AclError::Missing {
                        what,
                        href: rsrc.href.clone(),
                    });
                }
                if list.len() > MAX_ENTITIES {
                    return Err(AclError::TooMany {
                        what,
                        count: list.len(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// An ordered ACE list plus its resource owner.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Acl {
    pub aces: Vec<Ace>,
    pub rowner: Uuid,
}
