use std::fmt::Write;

use serde::Serialize;
use uuid::Uuid;

use crate::acl::{Ace, Acl};
use crate::cred::{usage, CredType, Credential, CredentialStore, Encoding, KeyData};
use crate::persist::ByteStore;
use crate::session::SvrSession;
use crate::svr::{Doxm, Pstat};
use crate::x509::CertChain;

/// Bytes per hex dump line.
const HEX_LINE: usize = 32;

pub fn doxm(doxm: Option<&Doxm>) -> String {
    let Some(d) = doxm else {
        return "doxm: not loaded\n".to_string();
    };
    let mut out = String::from("doxm:\n");
    let oxms: Vec<String> = d.oxms.iter().map(u16::to_string).collect();
    let _ = writeln!(out, "  owned       : {}", d.owned);
    let _ = writeln!(out, "  oxms        : [{}]", oxms.join(", "));
    let _ = writeln!(out, "  oxmsel      : {}", d.oxm_sel);
    let _ = writeln!(out, "  sct         : {}", d.sct);
    let _ = writeln!(out, "  deviceuuid  : {}", d.device_id.hyphenated());
    let _ = writeln!(out, "  devowneruuid: {}", d.owner.hyphenated());
    let _ = writeln!(out, "  rowneruuid  : {}", d.rowner.hyphenated());
    out
}

pub fn pstat(pstat: Option<&Pstat>) -> String {
    let Some(p) = pstat else {
        return "pstat: not loaded\n".to_string();
    };
    let mut out = String::from("pstat:\n");
    let sm: Vec<String> = p.sm.iter().map(|m| m.names().join(" | ")).collect();
    let _ = writeln!(out, "  isop        : {}", p.is_op);
    let _ = writeln!(out, "  sm          : [{}]", sm.join(", "));
    let _ = writeln!(out, "  om          : {}", p.om.names().join(" | "));
    let _ = writeln!(out, "  cm          : {}", p.cm.names().join(" | "));
    let _ = writeln!(out, "  tm          : {}", p.tm.names().join(" | "));
    let _ = writeln!(out, "  rowneruuid  : {}", p.rowner.hyphenated());
    out
}

pub fn acl(acl: &Acl) -> String {
    let mut out = format!("acl: {} entr{}\n", acl.aces.len(), if acl.aces.len() == 1 { "y" } else { "ies" });
    for (i, ace) in acl.aces.iter().enumerate() {
        write_ace(&mut out, i + 1, ace);
    }
    let _ = writeln!(out, "  rowneruuid  : {}", acl.rowner.hyphenated());
    out
}

fn write_ace(out: &mut String, index: usize, ace: &Ace) {
    let _ = writeln!(out, "  [{index}] subject: {}", ace.subject);
    let _ = writeln!(out, "      permission: {}", ace.permission);
    for rsrc in &ace.resources {
        let _ = write!(out, "      resource: {}", rsrc.href);
        if let Some(rel) = &rsrc.rel {
            let _ = write!(out, " (rel {rel})");
        }
        out.push('\n');
        let _ = writeln!(out, "        rt: {}", rsrc.types.join(", "));
        let _ = writeln!(out, "        if: {}", rsrc.interfaces.join(", "));
    }
    for v in &ace.validities {
        let _ = writeln!(out, "      validity: {} [{}]", v.period, v.recurrences.join(", "));
    }
}

pub fn credentials(store: &CredentialStore) -> String {
    let mut out = format!("cred: {} credential(s)\n", store.len());
    for cred in store.list() {
        write_credential(&mut out, store, cred);
    }
    let _ = writeln!(out, "  rowneruuid  : {}", store.rowner().hyphenated());
    out
}

fn write_credential(out: &mut String, store: &CredentialStore, cred: &Credential) {
    let cred_type = cred.cred_type();
    let _ = writeln!(
        out,
        "  [{}] {} ({}) subject: {}",
        cred.id,
        cred_type,
        cred_type.bits(),
        cred.subject
    );
    if let Some(u) = cred.usage() {
        let _ = writeln!(out, "      credusage: {u}");
    }
    let pin = cred_type == CredType::PinPassword;
    if let Some(k) = cred.data.private_data() {
        write_key(out, "privatedata", k, pin);
    }
    if let Some(k) = cred.data.public_data() {
        write_key(out, "publicdata", k, false);
    }
    if let Some(opt) = cred.data.optional_data() {
        write_key(out, "optionaldata", &opt.key, false);
        let _ = writeln!(out, "        revstat: {}", opt.revoked);
    }

    let Some(u) = cred.usage() else { return };
    let chain = if usage::is_trust_anchor(u) {
        store.certificate_chain(u, cred.id)
    } else if usage::is_primary_cert(u) {
        store.own_certificate(u, cred.id)
    } else {
        return;
    };
    match chain {
        Ok(chain) => write_chain(out, &chain),
        Err(e) => {
            let _ = writeln!(out, "      certificates: unreadable ({e})");
        }
    }
}

fn write_key(out: &mut String, name: &str, key: &KeyData, as_text: bool) {
    let _ = writeln!(out, "      {name}: {}, {} byte(s)", key.encoding.ocf_name(), key.len());
    if as_text || matches!(key.encoding, Encoding::Pem | Encoding::Base64) {
        if let Ok(text) = std::str::from_utf8(&key.data) {
            for line in text.lines() {
                let _ = writeln!(out, "        {line}");
            }
            return;
        }
    }
    for chunk in key.data.chunks(HEX_LINE) {
        let _ = writeln!(out, "        {}", hex::encode(chunk));
    }
}

pub fn chain(chain: &CertChain) -> String {
    let mut out = String::new();
    write_chain(&mut out, chain);
    out
}

fn write_chain(out: &mut String, chain: &CertChain) {
    let _ = writeln!(out, "      certificates: {}", chain.len());
    for (i, cert) in chain.iter().enumerate() {
        let _ = writeln!(out, "      #{} ({:?})", i + 1, cert.format());
        for line in cert.to_string().lines() {
            let _ = writeln!(out, "        {line}");
        }
    }
}

/// Plain-text dump of every resource.
pub fn all<S: ByteStore>(session: &SvrSession<S>) -> String {
    [
        doxm(session.doxm()),
        pstat(session.pstat()),
        acl(session.acl().acl()),
        credentials(session.credentials()),
    ]
    .join("\n")
}

#[derive(Serialize)]
struct CredDocument<'a> {
    creds: &'a [Credential],
    rowneruuid: Uuid,
}

#[derive(Serialize)]
struct SvrDocument<'a> {
    doxm: Option<&'a Doxm>,
    pstat: Option<&'a Pstat>,
    acl: &'a Acl,
    cred: CredDocument<'a>,
}

pub fn json<S: ByteStore>(session: &SvrSession<S>) -> serde_json::Result<String> {
    let doc = SvrDocument {
        doxm: session.doxm(),
        pstat: session.pstat(),
        acl: session.acl().acl(),
        cred: CredDocument {
            creds: session.credentials().list(),
            rowneruuid: session.credentials().rowner(),
        },
    };
    serde_json::to_string_pretty(&doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acl::{AceResource, Permission};
    use crate::cred::CredentialData;
    use crate::persist::MemoryByteStore;
    use crate::subject::Subject;
    use crate::svr::{Dpm, Dpom};

    #[test]
    fn test_unloaded_snapshots() {
        assert_eq!(doxm(None), "doxm: not loaded\n");
        assert_eq!(pstat(None), "pstat: not loaded\n");
    }

    #[test]
    fn test_pstat_uses_mode_names() {
        let p = Pstat {
            cm: Dpm(Dpm::RESET | Dpm::TAKE_OWNER),
            sm: vec![Dpom(Dpom::SINGLE_SERVICE_CLIENT_DRIVEN)],
            ..Pstat::default()
        };
        let text = pstat(Some(&p));
        assert!(text.contains("cm          : RESET | TAKE_OWNER"));
        assert!(text.contains("tm          : NORMAL"));
        assert!(text.contains("[SINGLE_SERVICE_CLIENT_DRIVEN]"));
    }

    #[test]
    fn test_acl_numbers_entries_from_one() {
        let acl_value = Acl {
            aces: vec![Ace::new(Subject::Wildcard, Permission::READ | Permission::NOTIFY)
                .with_resource(AceResource::new("/oic/d").with_type("oic.wk.d").with_interface("oic.if.r"))],
            rowner: Uuid::nil(),
        };
        let text = acl(&acl_value);
        assert!(text.starts_with("acl: 1 entry\n"));
        assert!(text.contains("[1] subject: *"));
        assert!(text.contains("permission: 18 (READ NOTIFY)"));
        assert!(text.contains("resource: /oic/d"));
    }

    #[test]
    fn test_pin_printed_as_text() {
        let mut store = CredentialStore::new();
        store
            .add(Credential::new(
                Subject::Wildcard,
                CredentialData::PinPassword {
                    private: KeyData::raw(b"12345678".to_vec()),
                },
            ))
            .unwrap();
        let text = credentials(&store);
        assert!(text.contains("privatedata: oic.sec.encoding.raw, 8 byte(s)"));
        assert!(text.contains("        12345678\n"));
    }

    #[test]
    fn test_json_has_every_resource() {
        let session = SvrSession::new(MemoryByteStore::new());
        let doc: serde_json::Value = serde_json::from_str(&json(&session).unwrap()).unwrap();
        assert!(doc["doxm"].is_null());
        assert!(doc["acl"]["aces"].as_array().unwrap().is_empty());
        assert!(doc["cred"]["creds"].as_array().unwrap().is_empty());
    }
}
