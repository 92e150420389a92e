use chrono::{DateTime, Utc};
use x509_parser::pem::parse_x509_pem;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedCertificate {
    pub subject: String,
    pub not_after: DateTime<Utc>,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum DecodeError {
    #[error("malformed certificate: {0}")]
    Malformed(String),
}

/// Extracts the subject DN and the absolute expiry instant from a PEM
/// certificate.
pub fn decode(pem: &str) -> Result<DecodedCertificate, DecodeError> {
    let (_, block) = parse_x509_pem(pem.trim_start().as_bytes())
        .map_err(|e| DecodeError::Malformed(format!("pem: {}", e)))?;
    if block.label != "CERTIFICATE" {
        return Err(DecodeError::Malformed(format!(
            "unexpected pem label {}",
            block.label
        )));
    }
    let cert = block
        .parse_x509()
        .map_err(|e| DecodeError::Malformed(format!("x509: {}", e)))?;

    let ts = cert.validity().not_after.timestamp();
    let not_after = DateTime::<Utc>::from_timestamp(ts, 0)
        .ok_or_else(|| DecodeError::Malformed(format!("notAfter out of range: {}", ts)))?;

    Ok(DecodedCertificate {
        subject: cert.subject().to_string(),
        not_after,
    })
}
