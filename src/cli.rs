use std::path::Path;

use anyhow::Context;

use crate::acl::{Ace, AceResource, Permission, Validity};
use crate::config::{AclCommand, Command, CredCommand, EncodingArg};
use crate::cred::{usage, CredentialRequest, KeyData};
use crate::persist::ByteStore;
use crate::render;
use crate::session::{Mutation, SvrSession};
use crate::subject::Subject;

/// Run one command against a refreshed session, returning the text to print.
pub fn dispatch<S: ByteStore>(
    session: &mut SvrSession<S>,
    command: Option<Command>,
) -> anyhow::Result<String> {
    match command.unwrap_or(Command::Print { json: false }) {
        Command::Print { json: false } => Ok(render::all(session)),
        Command::Print { json: true } => render::json(session).context("JSON encoding failed"),
        Command::Cred(cmd) => cred(session, cmd),
        Command::Acl(cmd) => acl(session, cmd),
    }
}

fn cred<S: ByteStore>(session: &mut SvrSession<S>, cmd: CredCommand) -> anyhow::Result<String> {
    match cmd {
        CredCommand::List => Ok(render::credentials(session.credentials())),
        CredCommand::Remove { id } => {
            let removed = durable(session.remove_credential(id)?)?;
            Ok(format!("Removed credential {} ({})\n", removed.id, removed.cred_type()))
        }
        CredCommand::Certs { usage: wanted, id } => {
            let chain = session.credentials().certificate_chain(&wanted, id)?;
            if chain.is_empty() {
                anyhow::bail!("no certificates stored for {wanted} credential {id}");
            }
            Ok(render::chain(&chain))
        }
        CredCommand::AddPin { subject, pin } => {
            let request = CredentialRequest::PinPassword { subject, pin };
            added(session, request)
        }
        CredCommand::AddTrustCa {
            mfg,
            usage: explicit,
            encoding,
            chain,
        } => {
            let request = CredentialRequest::TrustAnchor {
                usage: pick_usage(explicit, mfg, usage::TRUST_CA, usage::MF_TRUST_CA),
                chain: read_key(&chain, encoding)?,
            };
            added(session, request)
        }
        CredCommand::AddCert {
            mfg,
            usage: explicit,
            key,
            key_encoding,
            cert,
            cert_encoding,
        } => {
            let request = CredentialRequest::PrimaryCertificate {
                usage: pick_usage(explicit, mfg, usage::PRIMARY_CERT, usage::MF_PRIMARY_CERT),
                private_key: read_key(&key, key_encoding)?,
                certificate: read_key(&cert, cert_encoding)?,
            };
            added(session, request)
        }
    }
}

fn acl<S: ByteStore>(session: &mut SvrSession<S>, cmd: AclCommand) -> anyhow::Result<String> {
    match cmd {
        AclCommand::List => Ok(render::acl(session.acl().acl())),
        AclCommand::Add {
            subject,
            hrefs,
            types,
            interfaces,
            rel,
            permission,
            period,
            recurrences,
        } => {
            let ace = build_ace(subject, permission, hrefs, &types, &interfaces, rel, period, recurrences);
            let index = durable(session.add_ace(ace)?)?;
            Ok(format!("Added ACE #{index}\n"))
        }
        AclCommand::Remove { index } => {
            let removed = durable(session.remove_ace(index)?)?;
            Ok(format!("Removed ACE #{index} (subject {})\n", removed.subject))
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn build_ace(
    subject: Subject,
    permission: Permission,
    hrefs: Vec<String>,
    types: &[String],
    interfaces: &[String],
    rel: Option<String>,
    period: Option<String>,
    recurrences: Vec<String>,
) -> Ace {
    let mut ace = Ace::new(subject, permission);
    for href in hrefs {
        ace = ace.with_resource(AceResource {
            href,
            rel: rel.clone(),
            types: types.to_vec(),
            interfaces: interfaces.to_vec(),
        });
    }
    if let Some(period) = period {
        ace = ace.with_validity(Validity { period, recurrences });
    }
    ace
}

fn added<S: ByteStore>(
    session: &mut SvrSession<S>,
    request: CredentialRequest,
) -> anyhow::Result<String> {
    let cred_type = request.cred_type();
    let id = durable(session.add_credential(request)?)?;
    Ok(format!("Added {cred_type} credential {id}\n"))
}

/// Surface a failed commit; the edit itself stays in memory.
fn durable<T>(mutation: Mutation<T>) -> anyhow::Result<T> {
    mutation
        .into_persisted()
        .context("edit applied but could not be saved")
}

fn pick_usage(explicit: Option<String>, mfg: bool, normal: &str, manufacturer: &str) -> String {
    explicit.unwrap_or_else(|| (if mfg { manufacturer } else { normal }).to_string())
}

/// Whole contents of a key or certificate file. Empty files are rejected.
pub fn read_key(path: &Path, encoding: EncodingArg) -> anyhow::Result<KeyData> {
    let data = std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
    if data.is_empty() {
        anyhow::bail!("{} is empty", path.display());
    }
    Ok(KeyData::new(encoding.into(), data))
}
