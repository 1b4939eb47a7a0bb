use crate::acl::{Ace, AclError, AclStore};
use crate::codec::{CborCodec, CodecError, SvrCodec};
use crate::cred::{CredError, Credential, CredentialRequest, CredentialStore};
use crate::persist::{ByteStore, ResourceKind, StoreError};
use crate::subject::Subject;
use crate::svr::{Doxm, Pstat};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("{kind}: storage: {source}")]
    Store {
        kind: ResourceKind,
        #[source]
        source: StoreError,
    },
    #[error("{kind}: codec: {source}")]
    Codec {
        kind: ResourceKind,
        #[source]
        source: CodecError,
    },
    #[error("Credential: {0}")]
    Credential(#[from] CredError),
    #[error("ACL: {0}")]
    Acl(#[from] AclError),
    #[error("{0} is not loaded")]
    NotLoaded(ResourceKind),
}

impl SessionError {
    /// Lookup misses, as opposed to validation or I/O failures.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SessionError::Store {
                source: StoreError::NotFound(_),
                ..
            } | SessionError::Credential(CredError::NotFound(_))
        )
    }
}

/// Per-kind outcome of one refresh call. `Ok` carries the number of entries
/// loaded for that kind.
#[derive(Debug, Default)]
pub struct RefreshReport {
    outcomes: Vec<(ResourceKind, Result<usize, SessionError>)>,
}

impl RefreshReport {
    pub fn get(&self, kind: ResourceKind) -> Option<&Result<usize, SessionError>> {
        self.outcomes.iter().find(|(k, _)| *k == kind).map(|(_, r)| r)
    }

    pub fn is_ok(&self) -> bool {
        self.outcomes.iter().all(|(_, r)| r.is_ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (ResourceKind, &SessionError)> {
        self.outcomes
            .iter()
            .filter_map(|(k, r)| r.as_ref().err().map(|e| (*k, e)))
    }

    pub fn iter(&self) -> impl Iterator<Item = &(ResourceKind, Result<usize, SessionError>)> {
        self.outcomes.iter()
    }
}

/// Result of an in-memory edit followed by a commit. The edit is kept even
/// when `persisted` is an error.
#[derive(Debug)]
#[must_use]
pub struct Mutation<T> {
    pub value: T,
    pub persisted: Result<(), SessionError>,
}

impl<T> Mutation<T> {
    /// Value of a fully persisted edit; the commit error otherwise.
    pub fn into_persisted(self) -> Result<T, SessionError> {
        self.persisted.map(|()| self.value)
    }
}

/// Live SVR state plus the storage it was loaded from.
#[derive(Debug)]
pub struct SvrSession<S, C = CborCodec> {
    storage: S,
    codec: C,
    creds: CredentialStore,
    acl: AclStore,
    doxm: Option<Doxm>,
    pstat: Option<Pstat>,
}

impl<S: ByteStore> SvrSession<S> {
    pub fn new(storage: S) -> Self {
        Self::with_codec(storage, CborCodec)
    }
}

impl<S: ByteStore, C: SvrCodec> SvrSession<S, C> {
    pub fn with_codec(storage: S, codec: C) -> Self {
        Self {
            storage,
            codec,
            creds: CredentialStore::new(),
            acl: AclStore::new(),
            doxm: None,
            pstat: None,
        }
    }

    /// Load each requested kind independently. A failing kind keeps its
    /// previous in-memory state and does not stop the others.
    pub fn refresh(&mut self, kinds: &[ResourceKind]) -> RefreshReport {
        let mut report = RefreshReport::default();
        for &kind in kinds {
            let outcome = self.refresh_one(kind);
            match &outcome {
                Ok(count) => tracing::debug!(kind = %kind, count, "Resource refreshed"),
                Err(e) => tracing::warn!(kind = %kind, error = %e, "Refresh failed"),
            }
            report.outcomes.push((kind, outcome));
        }
        report
    }

    fn refresh_one(&mut self, kind: ResourceKind) -> Result<usize, SessionError> {
        let bytes = self
            .storage
            .get(kind.name())
            .map_err(|source| SessionError::Store { kind, source })?;
        let codec_err = |source| SessionError::Codec { kind, source };

        match kind {
            ResourceKind::Cred => {
                let decoded = self.codec.decode_cred(&bytes).map_err(codec_err)?;
                self.creds.set_rowner(decoded.rowner);
                // Merge through the regular add path; earlier adds stay if one fails.
                let mut added = 0;
                for cred in decoded.creds {
                    self.creds.add(cred)?;
                    added += 1;
                }
                Ok(added)
            }
            ResourceKind::Acl => {
                let acl = self.codec.decode_acl(&bytes).map_err(codec_err)?;
                let count = acl.aces.len();
                self.acl.replace_all(acl);
                Ok(count)
            }
            ResourceKind::Doxm => {
                self.doxm = Some(self.codec.decode_doxm(&bytes).map_err(codec_err)?);
                Ok(1)
            }
            ResourceKind::Pstat => {
                self.pstat = Some(self.codec.decode_pstat(&bytes).map_err(codec_err)?);
                Ok(1)
            }
        }
    }

    /// Serialize the in-memory state of `kind` and store it.
    pub fn commit(&mut self, kind: ResourceKind) -> Result<(), SessionError> {
        let codec_err = |source| SessionError::Codec { kind, source };
        let bytes = match kind {
            ResourceKind::Cred => self
                .codec
                .encode_cred(self.creds.list(), &self.creds.rowner())
                .map_err(codec_err)?,
            ResourceKind::Acl => self.codec.encode_acl(self.acl.acl()).map_err(codec_err)?,
            ResourceKind::Doxm => {
                let doxm = self.doxm.as_ref().ok_or(SessionError::NotLoaded(kind))?;
                self.codec.encode_doxm(doxm).map_err(codec_err)?
            }
            ResourceKind::Pstat => {
                let pstat = self.pstat.as_ref().ok_or(SessionError::NotLoaded(kind))?;
                self.codec.encode_pstat(pstat).map_err(codec_err)?
            }
        };
        self.storage
            .put(kind.name(), &bytes)
            .map_err(|source| SessionError::Store { kind, source })?;
        tracing::debug!(kind = %kind, len = bytes.len(), "Resource committed");
        Ok(())
    }

    fn commit_logged(&mut self, kind: ResourceKind) -> Result<(), SessionError> {
        let res = self.commit(kind);
        if let Err(e) = &res {
            tracing::warn!(kind = %kind, error = %e, "Edit kept in memory but not persisted");
        }
        res
    }

    // ---- credentials ----

    /// Build a credential from user input, add it and persist the list.
    pub fn add_credential(
        &mut self,
        request: CredentialRequest,
    ) -> Result<Mutation<u16>, SessionError> {
        let device_id = if request.needs_device_id() {
            self.device_id().ok_or(SessionError::NotLoaded(ResourceKind::Doxm))?
        } else {
            // Only certificate credentials take the device id.
            Subject::Wildcard
        };
        let cred = request.build(device_id)?;
        self.insert_credential(cred)
    }

    /// Add an already built credential and persist the list.
    pub fn insert_credential(&mut self, cred: Credential) -> Result<Mutation<u16>, SessionError> {
        let id = self.creds.add(cred)?;
        Ok(Mutation {
            value: id,
            persisted: self.commit_logged(ResourceKind::Cred),
        })
    }

    pub fn remove_credential(&mut self, id: u16) -> Result<Mutation<Credential>, SessionError> {
        let cred = self.creds.remove_by_id(id)?;
        Ok(Mutation {
            value: cred,
            persisted: self.commit_logged(ResourceKind::Cred),
        })
    }

    // ---- acl ----

    /// Append an ACE and persist the list. Returns its 1-based position.
    pub fn add_ace(&mut self, ace: Ace) -> Result<Mutation<usize>, SessionError> {
        let index = self.acl.add_entry(ace)?;
        Ok(Mutation {
            value: index,
            persisted: self.commit_logged(ResourceKind::Acl),
        })
    }

    /// Remove the ACE at 1-based `index` and persist the list.
    pub fn remove_ace(&mut self, index: usize) -> Result<Mutation<Ace>, SessionError> {
        let ace = self.acl.remove_entry(index)?;
        Ok(Mutation {
            value: ace,
            persisted: self.commit_logged(ResourceKind::Acl),
        })
    }

    // ---- accessors ----

    pub fn credentials(&self) -> &CredentialStore {
        &self.creds
    }

    pub fn acl(&self) -> &AclStore {
        &self.acl
    }

    pub fn doxm(&self) -> Option<&Doxm> {
        self.doxm.as_ref()
    }

    pub fn pstat(&self) -> Option<&Pstat> {
        self.pstat.as_ref()
    }

    /// Device id from doxm, the subject of the device's own certificates.
    pub fn device_id(&self) -> Option<Subject> {
        self.doxm.as_ref().map(|d| Subject::from(d.device_id))
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }
}
