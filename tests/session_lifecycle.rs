use svrdb::acl::{Ace, AceResource, Acl, Permission};
use svrdb::codec::{CborCodec, SvrCodec};
use svrdb::cred::{usage, CredType, Credential, CredentialData, CredentialRequest, Encoding, KeyData};
use svrdb::persist::{ByteStore, FileByteStore, MemoryByteStore, ResourceKind, StoreError};
use svrdb::session::{SessionError, SvrSession};
use svrdb::subject::Subject;
use svrdb::svr::{Doxm, Pstat};
use uuid::Uuid;

const DEVICE: u128 = 0x6164_6d69_6e44_6576_6963_6555_7569_6430;

/// Memory store whose writes can be switched off.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryByteStore,
    fail_puts: bool,
}

impl ByteStore for FlakyStore {
    fn get(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        self.inner.get(name)
    }

    fn put(&mut self, name: &str, bytes: &[u8]) -> Result<(), StoreError> {
        if self.fail_puts {
            return Err(StoreError::Io(std::io::Error::other("disk full")));
        }
        self.inner.put(name, bytes)
    }
}

fn pin(secret: &str) -> Credential {
    Credential::new(
        Subject::Wildcard,
        CredentialData::PinPassword {
            private: KeyData::raw(secret.as_bytes().to_vec()),
        },
    )
}

fn light_ace() -> Ace {
    Ace::new(Subject::Wildcard, Permission::READ | Permission::WRITE).with_resource(
        AceResource::new("/a/light")
            .with_type("oic.r.switch.binary")
            .with_interface("oic.if.a"),
    )
}

fn seeded_store() -> MemoryByteStore {
    let codec = CborCodec;
    let creds = codec
        .encode_cred(&[pin("1111"), pin("2222")], &Uuid::from_u128(DEVICE))
        .unwrap();
    let acl = codec
        .encode_acl(&Acl {
            aces: vec![light_ace()],
            rowner: Uuid::from_u128(DEVICE),
        })
        .unwrap();
    let doxm = codec
        .encode_doxm(&Doxm {
            oxms: vec![0],
            device_id: Uuid::from_u128(DEVICE),
            ..Doxm::default()
        })
        .unwrap();
    let pstat = codec.encode_pstat(&Pstat::default()).unwrap();
    MemoryByteStore::new()
        .with("cred", creds)
        .with("acl", acl)
        .with("doxm", doxm)
        .with("pstat", pstat)
}

// ---- refresh ----

#[test]
fn test_refresh_loads_every_kind() {
    let mut session = SvrSession::new(seeded_store());
    let report = session.refresh(&ResourceKind::ALL);
    assert!(report.is_ok());
    assert!(matches!(report.get(ResourceKind::Cred), Some(Ok(2))));
    assert_eq!(session.credentials().len(), 2);
    assert_eq!(session.credentials().rowner(), Uuid::from_u128(DEVICE));
    assert_eq!(session.acl().len(), 1);
    assert_eq!(session.device_id(), Some(Subject::Id(Uuid::from_u128(DEVICE))));
    assert!(session.pstat().is_some());
}

#[test]
fn test_cred_refresh_appends() {
    let mut session = SvrSession::new(seeded_store());
    session.refresh(&[ResourceKind::Cred]);
    session.refresh(&[ResourceKind::Cred]);

    let creds = session.credentials().list();
    assert_eq!(creds.len(), 4);
    let ids: Vec<u16> = creds.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
    assert_eq!(creds[0].data, creds[2].data);
}

#[test]
fn test_acl_refresh_replaces() {
    let mut session = SvrSession::new(seeded_store());
    session.refresh(&[ResourceKind::Acl]);
    let first = session.acl().acl().clone();
    session.refresh(&[ResourceKind::Acl]);
    assert_eq!(session.acl().len(), 1);
    assert_eq!(session.acl().acl(), &first);
}

#[test]
fn test_bad_kind_does_not_block_others() {
    let store = seeded_store().with("acl", b"\x01garbage".to_vec());
    let mut session = SvrSession::new(store);
    let report = session.refresh(&ResourceKind::ALL);

    assert!(matches!(
        report.get(ResourceKind::Acl),
        Some(Err(SessionError::Codec { kind: ResourceKind::Acl, .. }))
    ));
    assert_eq!(report.failures().count(), 1);
    assert_eq!(session.credentials().len(), 2);
    assert!(session.doxm().is_some());
    assert!(session.pstat().is_some());
    assert!(session.acl().is_empty());
}

#[test]
fn test_failed_refresh_keeps_previous_snapshot() {
    let mut session = SvrSession::new(seeded_store());
    session.refresh(&[ResourceKind::Acl]);
    session.storage_mut().remove("acl");

    let report = session.refresh(&[ResourceKind::Acl]);
    assert!(report.get(ResourceKind::Acl).unwrap().as_ref().unwrap_err().is_not_found());
    assert_eq!(session.acl().len(), 1);
}

#[test]
fn test_ace_without_resources_is_not_installed() {
    use ciborium::value::Value;

    let mut session = SvrSession::new(seeded_store());
    session.refresh(&[ResourceKind::Acl]);

    let bare = Value::Map(vec![(
        Value::Text("aclist2".into()),
        Value::Array(vec![Value::Map(vec![
            (
                Value::Text("subject".into()),
                Value::Map(vec![(Value::Text("uuid".into()), Value::Text("*".into()))]),
            ),
            (Value::Text("permission".into()), Value::Integer(2.into())),
        ])]),
    )]);
    let mut bytes = Vec::new();
    ciborium::into_writer(&bare, &mut bytes).unwrap();
    session.storage_mut().put("acl", &bytes).unwrap();

    let report = session.refresh(&[ResourceKind::Acl]);
    assert!(matches!(
        report.get(ResourceKind::Acl),
        Some(Err(SessionError::Codec { kind: ResourceKind::Acl, .. }))
    ));
    assert_eq!(session.acl().entries(), &[light_ace()]);
}

#[test]
fn test_cred_merge_stops_at_invalid_entry() {
    let bytes = CborCodec
        .encode_cred(&[pin("1111"), pin(""), pin("3333")], &Uuid::nil())
        .unwrap();
    let mut session = SvrSession::new(MemoryByteStore::new().with("cred", bytes));
    let report = session.refresh(&[ResourceKind::Cred]);

    assert!(matches!(
        report.get(ResourceKind::Cred),
        Some(Err(SessionError::Credential(_)))
    ));
    assert_eq!(session.credentials().len(), 1);
}

// ---- edits ----

#[test]
fn test_commit_failure_keeps_memory_edit() {
    let mut session = SvrSession::new(FlakyStore::default());
    let first = session.add_ace(light_ace()).unwrap();
    assert!(first.persisted.is_ok());

    session.storage_mut().fail_puts = true;
    let second = session.add_ace(light_ace()).unwrap();
    assert_eq!(second.value, 2);
    assert!(matches!(
        second.persisted,
        Err(SessionError::Store { kind: ResourceKind::Acl, .. })
    ));
    assert_eq!(session.acl().len(), 2);

    // Persisted copy still has the first entry only.
    let stored = CborCodec
        .decode_acl(&session.storage().get("acl").unwrap())
        .unwrap();
    assert_eq!(stored.aces.len(), 1);
}

#[test]
fn test_remove_ace_bounds() {
    let mut session = SvrSession::new(seeded_store());
    session.refresh(&[ResourceKind::Acl]);

    for index in [0, 2] {
        let err = session.remove_ace(index).unwrap_err();
        assert!(matches!(err, SessionError::Acl(_)));
    }
    assert_eq!(session.acl().len(), 1);

    let removed = session.remove_ace(1).unwrap().into_persisted().unwrap();
    assert_eq!(removed.resources[0].href, "/a/light");
    assert!(session.acl().is_empty());
}

#[test]
fn test_trust_anchor_takes_device_id() {
    let mut session = SvrSession::new(seeded_store());
    session.refresh(&[ResourceKind::Doxm]);

    let id = session
        .add_credential(CredentialRequest::TrustAnchor {
            usage: usage::TRUST_CA.into(),
            chain: KeyData::new(Encoding::Pem, b"-----BEGIN CERTIFICATE-----".to_vec()),
        })
        .unwrap()
        .into_persisted()
        .unwrap();

    let cred = session.credentials().get_by_id(id).unwrap();
    assert_eq!(cred.subject, Subject::Id(Uuid::from_u128(DEVICE)));
    assert_eq!(cred.cred_type(), CredType::SignedAsymmetricKey);
    assert_eq!(cred.usage(), Some(usage::TRUST_CA));
}

#[test]
fn test_unsupported_type_rejected_before_store() {
    let mut session = SvrSession::new(MemoryByteStore::new());
    let err = session
        .add_credential(CredentialRequest::Other(CredType::SymmetricGroupKey))
        .unwrap_err();
    assert!(matches!(err, SessionError::Credential(_)));
    assert!(!session.storage().contains("cred"));
}

#[test]
fn test_edits_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("svr.dat");

    {
        let mut session = SvrSession::new(FileByteStore::open(&path));
        session
            .add_credential(CredentialRequest::PinPassword {
                subject: Subject::Id(Uuid::from_u128(5)),
                pin: "24681357".into(),
            })
            .unwrap()
            .into_persisted()
            .unwrap();
        session.add_ace(light_ace()).unwrap().into_persisted().unwrap();
    }

    let mut session = SvrSession::new(FileByteStore::open(&path));
    let report = session.refresh(&[ResourceKind::Cred, ResourceKind::Acl]);
    assert!(report.is_ok());
    let cred = &session.credentials().list()[0];
    assert_eq!(cred.subject, Subject::Id(Uuid::from_u128(5)));
    assert_eq!(cred.data.private_data().unwrap().data, b"24681357");
    assert_eq!(session.acl().entries(), &[light_ace()]);
}
