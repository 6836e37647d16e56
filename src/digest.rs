use crate::error::RejectReason;
use ring::digest;

/// Computes `sha-256=<base64>` over the body exactly as received.
pub fn body_digest(body: &[u8]) -> String {
    let d = digest::digest(&digest::SHA256, body);
    format!("sha-256={}", base64::encode(d.as_ref()))
}

/// Compares the computed body digest against the server supplied `Digest`
/// header, byte for byte. A missing header is a mismatch.
///
/// Returns the digest string so it can go into the signing string.
pub fn check_digest(body: &[u8], header: Option<&str>) -> Result<String, RejectReason> {
    let computed = body_digest(body);
    match header {
        Some(expected) if expected == computed => Ok(computed),
        _ => Err(RejectReason::DigestMismatch),
    }
}
