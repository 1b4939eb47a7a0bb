use std::fmt;

use openssl::error::ErrorStack;
use openssl::x509::{X509NameRef, X509};
use sha2::{Digest, Sha256};

/// Armor the certificate was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertFormat {
    Der,
    Pem,
}

/// One decoded X.509 certificate.
#[derive(Clone)]
pub struct Certificate {
    x509: X509,
    format: CertFormat,
}

impl Certificate {
    pub fn from_der(der: &[u8]) -> Result<Self, ErrorStack> {
        Ok(Self {
            x509: X509::from_der(der)?,
            format: CertFormat::Der,
        })
    }

    pub fn from_pem(pem: &[u8]) -> Result<Self, ErrorStack> {
        Ok(Self {
            x509: X509::from_pem(pem)?,
            format: CertFormat::Pem,
        })
    }

    pub fn x509(&self) -> &X509 {
        &self.x509
    }

    pub fn format(&self) -> CertFormat {
        self.format
    }

    pub fn to_der(&self) -> Result<Vec<u8>, ErrorStack> {
        self.x509.to_der()
    }

    pub fn subject(&self) -> String {
        name_to_string(self.x509.subject_name())
    }

    pub fn issuer(&self) -> String {
        name_to_string(self.x509.issuer_name())
    }

    pub fn serial_hex(&self) -> Result<String, ErrorStack> {
        let bn = self.x509.serial_number().to_bn()?;
        Ok(bn.to_hex_str()?.to_string())
    }

    pub fn not_before(&self) -> String {
        self.x509.not_before().to_string()
    }

    pub fn not_after(&self) -> String {
        self.x509.not_after().to_string()
    }

    /// SHA-256 over the DER encoding.
    pub fn fingerprint(&self) -> Result<[u8; 32], ErrorStack> {
        Ok(Sha256::digest(self.to_der()?).into())
    }
}

fn name_to_string(name: &X509NameRef) -> String {
    name.entries()
        .map(|entry| {
            let key = entry.object().nid().short_name().unwrap_or("?");
            let value = String::from_utf8_lossy(entry.data().as_slice());
            format!("{key}={value}")
        })
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Certificate")
            .field("subject", &self.subject())
            .field("issuer", &self.issuer())
            .field("format", &self.format)
            .finish()
    }
}

impl fmt::Display for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "subject     : {}", self.subject())?;
        writeln!(f, "issuer      : {}", self.issuer())?;
        if let Ok(serial) = self.serial_hex() {
            writeln!(f, "serial      : {serial}")?;
        }
        writeln!(f, "not before  : {}", self.not_before())?;
        writeln!(f, "not after   : {}", self.not_after())?;
        if let Ok(fp) = self.fingerprint() {
            writeln!(f, "sha256      : {}", hex::encode(fp))?;
        }
        Ok(())
    }
}
