use super::{
    usage, CredError, CredType, Credential, CredentialData, Encoding, KeyData, OptionalData,
    SignedKeyData,
};
use crate::config::MAX_PIN_LEN;
use crate::subject::Subject;

/// User-supplied values for a new credential, before the type rules apply.
#[derive(Debug, Clone)]
pub enum CredentialRequest {
    /// Certificate chain for a trust-anchor usage.
    TrustAnchor {
        usage: String,
        chain: KeyData,
    },
    /// Device key pair for a primary-certificate usage.
    PrimaryCertificate {
        usage: String,
        private_key: KeyData,
        certificate: KeyData,
    },
    PinPassword {
        subject: Subject,
        pin: String,
    },
    /// Any other credential type; always rejected.
    Other(CredType),
}

impl CredentialRequest {
    pub fn cred_type(&self) -> CredType {
        match self {
            CredentialRequest::TrustAnchor { .. } | CredentialRequest::PrimaryCertificate { .. } => {
                CredType::SignedAsymmetricKey
            }
            CredentialRequest::PinPassword { .. } => CredType::PinPassword,
            CredentialRequest::Other(t) => *t,
        }
    }

    /// Whether building needs the device id from doxm.
    pub fn needs_device_id(&self) -> bool {
        matches!(
            self,
            CredentialRequest::TrustAnchor { .. } | CredentialRequest::PrimaryCertificate { .. }
        )
    }

    /// Apply the per-type input rules. Certificate credentials take the
    /// device id as their subject.
    pub fn build(self, device_id: Subject) -> Result<Credential, CredError> {
        let cred = match self {
            CredentialRequest::TrustAnchor { usage, chain } => {
                if !usage::is_trust_anchor(&usage) {
                    return Err(CredError::UnsupportedUsage(usage));
                }
                Credential::new(
                    device_id,
                    CredentialData::SignedAsymmetricKey(SignedKeyData {
                        usage,
                        private: None,
                        public: None,
                        optional: Some(OptionalData::new(chain)),
                    }),
                )
            }
            CredentialRequest::PrimaryCertificate {
                usage,
                private_key,
                certificate,
            } => {
                if !usage::is_primary_cert(&usage) {
                    return Err(CredError::UnsupportedUsage(usage));
                }
                if private_key.encoding != Encoding::Raw {
                    return Err(CredError::InvalidEncoding {
                        field: "privatedata",
                        encoding: private_key.encoding,
                    });
                }
                if !matches!(certificate.encoding, Encoding::Der | Encoding::Pem) {
                    return Err(CredError::InvalidEncoding {
                        field: "publicdata",
                        encoding: certificate.encoding,
                    });
                }
                Credential::new(
                    device_id,
                    CredentialData::SignedAsymmetricKey(SignedKeyData {
                        usage,
                        private: Some(private_key),
                        public: Some(certificate),
                        optional: None,
                    }),
                )
            }
            CredentialRequest::PinPassword { subject, pin } => {
                if pin.len() > MAX_PIN_LEN {
                    return Err(CredError::PinTooLong { max: MAX_PIN_LEN });
                }
                Credential::new(
                    subject,
                    CredentialData::PinPassword {
                        private: KeyData::raw(pin.into_bytes()),
                    },
                )
            }
            CredentialRequest::Other(t) => return Err(CredError::Unsupported(t)),
        };
        cred.validate()?;
        Ok(cred)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn device() -> Subject {
        Subject::Id(Uuid::from_u128(0x6164_6d69_6e44_6576_6963_6555_7569_6430))
    }

    #[test]
    fn test_unsupported_types_rejected() {
        for t in CredType::ALL.into_iter().filter(|t| !t.is_editable()) {
            let err = CredentialRequest::Other(t).build(device()).unwrap_err();
            assert!(matches!(err, CredError::Unsupported(got) if got == t));
        }
    }

    #[test]
    fn test_trust_anchor_takes_device_subject() {
        let cred = CredentialRequest::TrustAnchor {
            usage: usage::TRUST_CA.into(),
            chain: KeyData::new(Encoding::Pem, b"-----BEGIN".to_vec()),
        }
        .build(device())
        .unwrap();
        assert_eq!(cred.subject, device());
        let optional = cred.data.optional_data().unwrap();
        assert!(!optional.revoked);
        assert_eq!(optional.key.encoding, Encoding::Pem);
    }

    #[test]
    fn test_trust_anchor_with_empty_chain_discarded() {
        let err = CredentialRequest::TrustAnchor {
            usage: usage::MF_TRUST_CA.into(),
            chain: KeyData::new(Encoding::Der, Vec::new()),
        }
        .build(device())
        .unwrap_err();
        assert!(matches!(err, CredError::MissingField { field: "optionaldata", .. }));
    }

    #[test]
    fn test_primary_cert_key_must_be_raw() {
        let err = CredentialRequest::PrimaryCertificate {
            usage: usage::PRIMARY_CERT.into(),
            private_key: KeyData::new(Encoding::Base64, b"a2V5".to_vec()),
            certificate: KeyData::new(Encoding::Der, vec![0x30]),
        }
        .build(device())
        .unwrap_err();
        assert!(matches!(err, CredError::InvalidEncoding { field: "privatedata", .. }));
    }

    #[test]
    fn test_primary_cert_must_be_der_or_pem() {
        let err = CredentialRequest::PrimaryCertificate {
            usage: usage::MF_PRIMARY_CERT.into(),
            private_key: KeyData::raw(b"key".to_vec()),
            certificate: KeyData::raw(b"cert".to_vec()),
        }
        .build(device())
        .unwrap_err();
        assert!(matches!(err, CredError::InvalidEncoding { field: "publicdata", .. }));
    }

    #[test]
    fn test_unknown_usage_rejected() {
        let err = CredentialRequest::TrustAnchor {
            usage: "custom.usage".into(),
            chain: KeyData::raw(b"x".to_vec()),
        }
        .build(device())
        .unwrap_err();
        assert!(matches!(err, CredError::UnsupportedUsage(u) if u == "custom.usage"));
    }

    #[test]
    fn test_pin_keeps_user_subject() {
        let cred = CredentialRequest::PinPassword {
            subject: Subject::Wildcard,
            pin: "12345678".into(),
        }
        .build(device())
        .unwrap();
        assert_eq!(cred.subject, Subject::Wildcard);
        let private = cred.data.private_data().unwrap();
        assert_eq!(private.encoding, Encoding::Raw);
        assert_eq!(private.data, b"12345678");
    }

    #[test]
    fn test_pin_length_limits() {
        let too_long = "9".repeat(MAX_PIN_LEN + 1);
        assert!(matches!(
            CredentialRequest::PinPassword { subject: device(), pin: too_long }.build(device()),
            Err(CredError::PinTooLong { .. })
        ));
        assert!(matches!(
            CredentialRequest::PinPassword { subject: device(), pin: String::new() }.build(device()),
            Err(CredError::MissingField { .. })
        ));
    }
}
