use super::{CertChainError, Certificate};

/// ASN.1 SEQUENCE tag opening every DER certificate.
pub const DER_SEQUENCE_TAG: u8 = 0x30;
/// Long-form length prefix with two length bytes following.
pub const DER_LONG_LEN_2: u8 = 0x82;
/// Tag, length prefix and two length bytes.
const DER_HEADER_LEN: usize = 4;

pub const PEM_CERT_HEADER: &[u8] = b"-----BEGIN CERTIFICATE-----";
pub const PEM_CERT_FOOTER: &[u8] = b"-----END CERTIFICATE-----";

/// Counts from one parse pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseSummary {
    pub decoded: usize,
    pub skipped: usize,
}

/// Ordered certificates, owning every decoded record.
#[derive(Debug, Clone, Default)]
pub struct CertChain {
    certs: Vec<Certificate>,
}

impl CertChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a buffer into a fresh chain.
    pub fn parse(buf: &[u8]) -> Result<Self, CertChainError> {
        let mut chain = Self::new();
        chain.parse_into(buf)?;
        Ok(chain)
    }

    /// Scan `buf` for DER and PEM certificates in any order, appending each
    /// one that decodes. Undecodable certificates are skipped. A bad DER
    /// length or an unterminated PEM block stops the scan with an error;
    /// certificates appended before that point stay in the chain.
    pub fn parse_into(&mut self, buf: &[u8]) -> Result<ParseSummary, CertChainError> {
        let mut summary = ParseSummary::default();
        let mut pos = 0usize;

        while pos < buf.len() {
            let rest = &buf[pos..];

            if rest.len() >= 2 && rest[0] == DER_SEQUENCE_TAG && rest[1] == DER_LONG_LEN_2 {
                let span = der_span(rest).ok_or(CertChainError::BadLength { offset: pos })?;
                match Certificate::from_der(&rest[..span]) {
                    Ok(cert) => {
                        self.certs.push(cert);
                        summary.decoded += 1;
                    }
                    Err(e) => {
                        tracing::warn!(offset = pos, len = span, error = %e, "Skipping undecodable DER certificate");
                        summary.skipped += 1;
                    }
                }
                pos += span;
            } else if rest.len() > PEM_CERT_HEADER.len() && rest.starts_with(PEM_CERT_HEADER) {
                let footer = find(rest, PEM_CERT_FOOTER)
                    .ok_or(CertChainError::MissingPemFooter { offset: pos })?;
                let span = footer + PEM_CERT_FOOTER.len();

                // Terminate the block without touching the caller's buffer.
                let mut block = Vec::with_capacity(span + 1);
                block.extend_from_slice(&rest[..span]);
                block.push(b'\n');

                match Certificate::from_pem(&block) {
                    Ok(cert) => {
                        self.certs.push(cert);
                        summary.decoded += 1;
                    }
                    Err(e) => {
                        tracing::warn!(offset = pos, len = span, error = %e, "Skipping undecodable PEM certificate");
                        summary.skipped += 1;
                    }
                }
                pos += span;
            } else {
                pos += 1;
            }
        }

        tracing::debug!(decoded = summary.decoded, skipped = summary.skipped, "Certificate chain parsed");
        Ok(summary)
    }

    pub fn push(&mut self, cert: Certificate) {
        self.certs.push(cert);
    }

    pub fn len(&self) -> usize {
        self.certs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Certificate> {
        self.certs.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Certificate> {
        self.certs.iter()
    }

    pub fn into_vec(self) -> Vec<Certificate> {
        self.certs
    }
}

impl IntoIterator for CertChain {
    type Item = Certificate;
    type IntoIter = std::vec::IntoIter<Certificate>;

    fn into_iter(self) -> Self::IntoIter {
        self.certs.into_iter()
    }
}

impl<'a> IntoIterator for &'a CertChain {
    type Item = &'a Certificate;
    type IntoIter = std::slice::Iter<'a, Certificate>;

    fn into_iter(self) -> Self::IntoIter {
        self.certs.iter()
    }
}

/// Full span (header + payload) of the DER element at the start of `rest`,
/// or `None` when the length bytes are missing or overrun the buffer.
fn der_span(rest: &[u8]) -> Option<usize> {
    let len_bytes = rest.get(2..DER_HEADER_LEN)?;
    let payload = usize::from(u16::from_be_bytes([len_bytes[0], len_bytes[1]]));
    let span = DER_HEADER_LEN + payload;
    (span <= rest.len()).then_some(span)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---- der_span ----

    #[test]
    fn test_der_span_exact_fit() {
        let buf = [0x30, 0x82, 0x00, 0x02, 0xAA, 0xBB];
        assert_eq!(der_span(&buf), Some(6));
    }

    #[test]
    fn test_der_span_rejects_overrun_and_short_header() {
        assert_eq!(der_span(&[0x30, 0x82, 0x00, 0x05, 0xAA]), None);
        assert_eq!(der_span(&[0x30, 0x82, 0x01]), None);
        assert_eq!(der_span(&[0x30, 0x82]), None);
    }

    // ---- parse_into ----

    #[test]
    fn test_empty_buffer_yields_empty_chain() {
        let chain = CertChain::parse(&[]).unwrap();
        assert!(chain.is_empty());
    }

    #[test]
    fn test_stray_bytes_are_skipped() {
        let mut chain = CertChain::new();
        let summary = chain.parse_into(b"\n\r \0 junk 0\x30").unwrap();
        assert_eq!(summary, ParseSummary::default());
        assert!(chain.is_empty());
    }

    #[test]
    fn test_corrupt_der_is_skipped_not_fatal() {
        let buf = [0x30, 0x82, 0x00, 0x02, 0xAA, 0xBB, b'\n'];
        let mut chain = CertChain::new();
        let summary = chain.parse_into(&buf).unwrap();
        assert_eq!(summary, ParseSummary { decoded: 0, skipped: 1 });
        assert!(chain.is_empty());
    }

    #[test]
    fn test_truncated_der_length_aborts() {
        let err = CertChain::parse(b"xx\x30\x82\x01").unwrap_err();
        assert!(matches!(err, CertChainError::BadLength { offset: 2 }));
    }

    #[test]
    fn test_der_length_past_end_aborts() {
        let err = CertChain::parse(&[0x30, 0x82, 0xFF, 0xFF, 0x00]).unwrap_err();
        assert!(matches!(err, CertChainError::BadLength { offset: 0 }));
    }

    #[test]
    fn test_pem_without_footer_aborts() {
        let mut buf = b"  ".to_vec();
        buf.extend_from_slice(PEM_CERT_HEADER);
        buf.extend_from_slice(b"\nMIIB\n");
        let err = CertChain::parse(&buf).unwrap_err();
        assert!(matches!(err, CertChainError::MissingPemFooter { offset: 2 }));
    }

    #[test]
    fn test_garbage_pem_block_is_skipped() {
        let mut buf = PEM_CERT_HEADER.to_vec();
        buf.extend_from_slice(b"\nnot base64 at all\n");
        buf.extend_from_slice(PEM_CERT_FOOTER);
        let mut chain = CertChain::new();
        let summary = chain.parse_into(&buf).unwrap();
        assert_eq!(summary, ParseSummary { decoded: 0, skipped: 1 });
    }

    #[test]
    fn test_bare_header_at_end_is_not_a_block() {
        // Header must be followed by at least one byte to open a block.
        let chain = CertChain::parse(PEM_CERT_HEADER).unwrap();
        assert!(chain.is_empty());
    }
}
