use uuid::Uuid;

use super::{Ace, AclError, Acl};

/// Live access-control list.
#[derive(Debug, Default)]
pub struct AclStore {
    acl: Acl,
}

impl AclStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and append; returns the entry's 1-based position.
    pub fn add_entry(&mut self, ace: Ace) -> Result<usize, AclError> {
        ace.validate()?;
        self.acl.aces.push(ace);
        tracing::debug!(index = self.acl.aces.len(), "ACE added");
        Ok(self.acl.aces.len())
    }

    /// Remove by 1-based position in current list order.
    pub fn remove_entry(&mut self, index: usize) -> Result<Ace, AclError> {
        let count = self.acl.aces.len();
        if index == 0 || index > count {
            return Err(AclError::IndexOutOfRange { index, count });
        }
        tracing::debug!(index, "ACE removed");
        Ok(self.acl.aces.remove(index - 1))
    }

    /// Swap in a freshly loaded list; the previous one is dropped.
    pub fn replace_all(&mut self, acl: Acl) {
        self.acl = acl;
    }

    pub fn entries(&self) -> &[Ace] {
        &self.acl.aces
    }

    pub fn acl(&self) -> &Acl {
        &self.acl
    }

    pub fn len(&self) -> usize {
        self.acl.aces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.acl.aces.is_empty()
    }

    pub fn rowner(&self) -> Uuid {
        self.acl.rowner
    }
}
