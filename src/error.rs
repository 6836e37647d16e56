use std::fmt::Display;

/// Every way a response can fail authentication.
/// All of them are final for the response at hand, nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// no signature header present
    MissingSignature,
    /// signature header present but not `key="value"` pairs
    MalformedHeader,
    /// algorithm token other than the configured one
    UnsupportedAlgorithm(String),
    /// body hash differs from the `Digest` header (or it is missing)
    DigestMismatch,
    /// key material could not be turned into a verifier key
    KeyDecodeError(String),
    /// the signature check returned false or the signature did not decode
    SignatureMismatch,
}

impl Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::MissingSignature => write!(f, "missing signature header"),
            RejectReason::MalformedHeader => write!(f, "malformed signature header"),
            RejectReason::UnsupportedAlgorithm(alg) => {
                write!(f, "unsupported signature algorithm: {}", alg)
            }
            RejectReason::DigestMismatch => write!(f, "body digest does not match"),
            RejectReason::KeyDecodeError(e) => write!(f, "could not decode key: {}", e),
            RejectReason::SignatureMismatch => write!(f, "signature does not match"),
        }
    }
}

impl std::error::Error for RejectReason {}

impl From<base64::DecodeError> for RejectReason {
    fn from(_: base64::DecodeError) -> Self {
        RejectReason::SignatureMismatch
    }
}

impl From<ring::error::Unspecified> for RejectReason {
    fn from(_: ring::error::Unspecified) -> Self {
        RejectReason::SignatureMismatch
    }
}

impl From<hex::FromHexError> for RejectReason {
    fn from(err: hex::FromHexError) -> Self {
        RejectReason::KeyDecodeError(err.to_string())
    }
}
