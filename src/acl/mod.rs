pub mod ace;
pub mod list;

pub use ace::{Ace, AceResource, Acl, Permission, Validity};
pub use list::AclStore;

#[derive(Debug, thiserror::Error)]
pub enum AclError {
    #[error("ACE must reference at least one resource")]
    NoResources,
    #[error("resource href is empty")]
    EmptyHref,
    #[error("resource {href} has no {what}")]
    Missing { what: &'static str, href: String },
    #[error("too many {what}: {count}")]
    TooMany { what: &'static str, count: usize },
    #[error("ACE #{index} out of range (1..={count})")]
    IndexOutOfRange { index: usize, count: usize },
}
