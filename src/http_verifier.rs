use crate::config::Config;
use crate::digest::check_digest;
use crate::error::RejectReason;
use crate::key::{SignatureAlgorithm, VerificationKey};
use crate::parse::ParameterizedHeader;
use crate::response::ApiDocument;
use crate::signing_string::SigningContext;
use crate::verifier::Verifier;
use std::sync::Arc;

/// Parameterized signature header (`algorithm="ed25519", signature="..."`)
pub const SIGNATURE_HEADER: &str = "keygen-signature";
/// Legacy header holding a bare base64 signature over the whole body
pub const LEGACY_SIGNATURE_HEADER: &str = "x-signature";
const DIGEST_HEADER: &str = "digest";
const DATE_HEADER: &str = "date";

/// A response as it came off the wire. The body is never decoded before
/// the signature checks are done.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    /// lower-cased names, in wire order
    headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, headers: Vec<(String, String)>, body: Vec<u8>) -> RawResponse {
        let headers = headers
            .into_iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value))
            .collect();
        RawResponse {
            status,
            headers,
            body,
        }
    }

    /// Case-insensitive lookup of the first header called `name`
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Final outcome of authenticating one response.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// every check passed, the body was parsed afterwards
    Verified(ApiDocument),
    Rejected(RejectReason),
}

/// Authenticates API responses against a single configured key.
///
/// Holds no mutable state; clones share the key and can be used from any
/// number of threads at once.
#[derive(Debug, Clone)]
pub struct ResponseAuthenticator {
    key: Arc<VerificationKey>,
    /// host bound into the signing string
    host: String,
}

impl ResponseAuthenticator {
    /// Decodes the configured key. Which scheme responses must use follows
    /// from the kind of key.
    pub fn new(config: &Config) -> Result<ResponseAuthenticator, RejectReason> {
        let key = VerificationKey::from_config(&config.key)?;
        Ok(ResponseAuthenticator::with_key(key, &config.host))
    }

    pub fn with_key(key: VerificationKey, host: &str) -> ResponseAuthenticator {
        ResponseAuthenticator {
            key: Arc::new(key),
            host: host.to_string(),
        }
    }

    pub fn algorithm(&self) -> SignatureAlgorithm {
        self.key.algorithm()
    }

    /// Runs every check for the configured scheme against `response`, which
    /// answered `method request_target`. The body is parsed only once the
    /// response is authenticated.
    pub fn authenticate(
        &self,
        method: &str,
        request_target: &str,
        response: RawResponse,
    ) -> Verdict {
        let checked = match self.key.algorithm() {
            SignatureAlgorithm::Ed25519HttpSignature => {
                self.check_http_signature(method, request_target, &response)
            }
            SignatureAlgorithm::WholeBodyRsa => self.check_whole_body(&response),
        };

        match checked {
            Ok(()) => {
                debug!("response to {} {} verified", method, request_target);
                Verdict::Verified(ApiDocument::from_verified_body(&response.body))
            }
            Err(reason) => {
                warn!(
                    "response to {} {} rejected: {}",
                    method, request_target, reason
                );
                Verdict::Rejected(reason)
            }
        }
    }

    /// header -> algorithm -> digest -> date -> signing string -> signature
    fn check_http_signature(
        &self,
        method: &str,
        request_target: &str,
        response: &RawResponse,
    ) -> Result<(), RejectReason> {
        let header = ParameterizedHeader::parse(response.header(SIGNATURE_HEADER))?;
        let (token, signature) = match (header.get("algorithm"), header.get("signature")) {
            (Some(token), Some(signature)) => (token, signature),
            _ => return Err(RejectReason::MalformedHeader),
        };
        debug!("signature header parsed: {} params", header.len());

        // known but not configured is just as unsupported as unknown
        if token.parse::<SignatureAlgorithm>()? != SignatureAlgorithm::Ed25519HttpSignature {
            return Err(RejectReason::UnsupportedAlgorithm(token.to_string()));
        }

        let digest = check_digest(&response.body, response.header(DIGEST_HEADER))?;
        debug!("body digest matches: {}", digest);

        // the date is part of what was signed, without it there is nothing to check
        let date = response
            .header(DATE_HEADER)
            .ok_or(RejectReason::MalformedHeader)?;
        let signing_string = SigningContext {
            method,
            request_target_path: request_target,
            host: &self.host,
            date,
            digest: &digest,
        }
        .build();

        self.key.verify_encoded(signing_string.as_bytes(), signature)
    }

    /// The raw body is the signed message. Every failure here is reported as
    /// a signature mismatch.
    fn check_whole_body(&self, response: &RawResponse) -> Result<(), RejectReason> {
        let signature = response
            .header(LEGACY_SIGNATURE_HEADER)
            .ok_or(RejectReason::SignatureMismatch)?;
        self.key
            .verify_encoded(&response.body, signature)
            .map_err(|_| RejectReason::SignatureMismatch)
    }
}
