use crate::error::RejectReason;
use crate::key::VerificationKey;

/// Any `Verifier` should be able to check a signature over a message.
/// Building the message (raw body or signing string) is left to the caller
/// so the check itself stays the same for every scheme, and can be stubbed
/// in tests.
pub trait Verifier {
    /// Message signature verification. Returns `Ok(())` or
    /// `SignatureMismatch`.
    fn verify_signature(&self, message: &[u8], sig: &[u8]) -> Result<(), RejectReason>;

    /// Same as `verify_signature` for a base64 encoded signature. A signature
    /// that does not decode is a mismatch, not an error of its own.
    fn verify_encoded(&self, message: &[u8], sig_b64: &str) -> Result<(), RejectReason> {
        let sig = base64::decode(sig_b64.trim())?;
        self.verify_signature(message, &sig)
    }
}

impl Verifier for VerificationKey {
    fn verify_signature(&self, message: &[u8], sig: &[u8]) -> Result<(), RejectReason> {
        // ed25519 is verified as is, rsa keys hash with sha-256 (pkcs#1 v1.5)
        self.public_key().verify(message, sig)?;
        Ok(())
    }
}
