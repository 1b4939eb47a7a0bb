use uuid::Uuid;

use super::{CredError, CredField, CredType, Credential};
use crate::x509::CertChain;

/// Live credential list in insertion order.
#[derive(Debug)]
pub struct CredentialStore {
    creds: Vec<Credential>,
    next_id: u32,
    rowner: Uuid,
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore {
    pub fn new() -> Self {
        Self {
            creds: Vec::new(),
            next_id: 1,
            rowner: Uuid::nil(),
        }
    }

    /// Validate, assign the next id and append. Ids are never handed out twice.
    pub fn add(&mut self, mut cred: Credential) -> Result<u16, CredError> {
        cred.validate()?;
        let id = u16::try_from(self.next_id).map_err(|_| CredError::IdsExhausted)?;
        self.next_id += 1;
        cred.id = id;
        tracing::debug!(id, cred_type = %cred.cred_type(), "Credential added");
        self.creds.push(cred);
        Ok(id)
    }

    pub fn remove_by_id(&mut self, id: u16) -> Result<Credential, CredError> {
        let pos = self
            .creds
            .iter()
            .position(|c| c.id == id)
            .ok_or(CredError::NotFound(id))?;
        tracing::debug!(id, "Credential removed");
        Ok(self.creds.remove(pos))
    }

    /// Snapshot of the current list, in insertion order.
    pub fn list(&self) -> &[Credential] {
        &self.creds
    }

    pub fn get_by_id(&self, id: u16) -> Option<&Credential> {
        self.creds.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.creds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.creds.is_empty()
    }

    pub fn rowner(&self) -> Uuid {
        self.rowner
    }

    pub fn set_rowner(&mut self, rowner: Uuid) {
        self.rowner = rowner;
    }

    /// Concatenate `field` of every signed asymmetric key matching `usage` and
    /// `id`, in list order, undoing base64 where stored that way. No match
    /// yields an empty buffer.
    pub fn collect_by_usage(
        &self,
        usage: &str,
        id: u16,
        field: CredField,
    ) -> Result<Vec<u8>, CredError> {
        let mut out = Vec::new();
        let matching = self.creds.iter().filter(|c| {
            c.cred_type() == CredType::SignedAsymmetricKey && c.usage() == Some(usage) && c.id == id
        });
        for cred in matching {
            let Some(key) = cred.data.field(field) else {
                continue;
            };
            let bytes = key.decoded().map_err(|e| CredError::Base64 {
                id: cred.id,
                field,
                reason: e.to_string(),
            })?;
            out.extend_from_slice(&bytes);
        }
        if out.is_empty() {
            tracing::info!(usage, id, field = %field, "No key material found");
        }
        Ok(out)
    }

    /// Trust-anchor chain stored in optional data.
    pub fn certificate_chain(&self, usage: &str, id: u16) -> crate::Result<CertChain> {
        self.parse_field(usage, id, CredField::Optional)
    }

    /// Device certificate stored in public data.
    pub fn own_certificate(&self, usage: &str, id: u16) -> crate::Result<CertChain> {
        self.parse_field(usage, id, CredField::Public)
    }

    pub fn private_key(&self, usage: &str, id: u16) -> Result<Vec<u8>, CredError> {
        self.collect_by_usage(usage, id, CredField::Private)
    }

    fn parse_field(&self, usage: &str, id: u16, field: CredField) -> crate::Result<CertChain> {
        let buf = self.collect_by_usage(usage, id, field)?;
        let mut chain = CertChain::new();
        chain.parse_into(&buf)?;
        Ok(chain)
    }
}
