pub mod certificate;
pub mod chain;

pub use certificate::{CertFormat, Certificate};
pub use chain::{CertChain, ParseSummary};

#[derive(Debug, thiserror::Error)]
pub enum CertChainError {
    #[error("bad DER length at offset {offset}")]
    BadLength { offset: usize },
    #[error("PEM certificate at offset {offset} has no END marker")]
    MissingPemFooter { offset: usize },
}
