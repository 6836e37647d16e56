use crate::config::KeyMaterial;
use crate::error::RejectReason;
use ring::signature::{self, UnparsedPublicKey, VerificationAlgorithm};
use std::str::FromStr;
use x509_parser::prelude::*;

/// Raw Ed25519 public keys are always 32 bytes
pub const ED25519_KEY_LEN: usize = 32;

const OID_ED25519: &str = "1.3.101.112";
const OID_RSA_ENCRYPTION: &str = "1.2.840.113549.1.1.1";

const TAG_SEQUENCE: u8 = 0x30;
const TAG_BIT_STRING: u8 = 0x03;
/// `AlgorithmIdentifier ::= SEQUENCE { OID 1.3.101.112 }`, no parameters
const ED25519_ALGORITHM_IDENTIFIER: [u8; 7] = [0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70];

/// Signature schemes a response can be authenticated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    /// legacy scheme: RSASSA-PKCS1-v1_5 / SHA-256 over the raw body,
    /// carried base64 encoded in `X-Signature`
    WholeBodyRsa,
    /// Ed25519 over a signing string binding request target, host, date and
    /// body digest, carried in the parameterized `Keygen-Signature` header
    Ed25519HttpSignature,
}

impl SignatureAlgorithm {
    /// Token used for the algorithm on the wire
    pub fn token(&self) -> &'static str {
        match self {
            SignatureAlgorithm::WholeBodyRsa => "rsa-sha256",
            SignatureAlgorithm::Ed25519HttpSignature => "ed25519",
        }
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = RejectReason;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ed25519" => Ok(SignatureAlgorithm::Ed25519HttpSignature),
            "rsa-sha256" => Ok(SignatureAlgorithm::WholeBodyRsa),
            _ => Err(RejectReason::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

/// Wraps a raw 32 byte Ed25519 key into a DER `SubjectPublicKeyInfo`:
///
/// ```text
/// 30 2a                      SEQUENCE
///    30 05 06 03 2b 65 70    AlgorithmIdentifier { id-Ed25519 }
///    03 21 00 <32 bytes>     BIT STRING, no unused bits
/// ```
///
/// Every length fits in a single byte so only short-form lengths are emitted.
pub fn raw_key_to_subject_public_key_info(raw: &[u8; ED25519_KEY_LEN]) -> Vec<u8> {
    let mut bit_string = vec![TAG_BIT_STRING, (raw.len() + 1) as u8, 0x00];
    bit_string.extend_from_slice(raw);

    let content_len = ED25519_ALGORITHM_IDENTIFIER.len() + bit_string.len();
    let mut spki = Vec::with_capacity(2 + content_len);
    spki.push(TAG_SEQUENCE);
    spki.push(content_len as u8);
    spki.extend_from_slice(&ED25519_ALGORITHM_IDENTIFIER);
    spki.extend_from_slice(&bit_string);
    spki
}

/// A decoded public key ready for signature checks.
///
/// Built once from configuration and only ever read afterwards, so it can be
/// shared freely between threads.
#[derive(Debug, Clone)]
pub struct VerificationKey {
    algorithm: SignatureAlgorithm,
    /// raw Ed25519 point, or DER `RSAPublicKey`
    key_bytes: Vec<u8>,
}

impl VerificationKey {
    pub fn from_config(material: &KeyMaterial) -> Result<VerificationKey, RejectReason> {
        match material {
            KeyMaterial::Ed25519Hex(hex) => VerificationKey::from_hex(hex),
            KeyMaterial::RsaPem(pem) => VerificationKey::from_pem(pem),
        }
    }

    /// Decodes a hex encoded raw Ed25519 key (exactly 64 hex characters).
    ///
    /// The raw bytes are enveloped with [`raw_key_to_subject_public_key_info`]
    /// and imported through the regular SPKI path.
    pub fn from_hex(hex_key: &str) -> Result<VerificationKey, RejectReason> {
        if hex_key.len() != ED25519_KEY_LEN * 2 {
            return Err(RejectReason::KeyDecodeError(format!(
                "expected {} hex characters, got {}",
                ED25519_KEY_LEN * 2,
                hex_key.len()
            )));
        }
        let mut raw = [0u8; ED25519_KEY_LEN];
        hex::decode_to_slice(hex_key, &mut raw)?;

        let spki = raw_key_to_subject_public_key_info(&raw);
        let key_bytes = subject_public_key(&spki, OID_ED25519)?;
        Ok(VerificationKey {
            algorithm: SignatureAlgorithm::Ed25519HttpSignature,
            key_bytes,
        })
    }

    /// Decodes a PEM armored RSA public key, either an SPKI `PUBLIC KEY`
    /// or a PKCS#1 `RSA PUBLIC KEY` document.
    pub fn from_pem(pem: &str) -> Result<VerificationKey, RejectReason> {
        let pem = format!("{}\n", pem.trim());
        let (label, doc) = pkcs8::Document::from_pem(&pem)
            .map_err(|e| RejectReason::KeyDecodeError(format!("invalid PEM: {}", e)))?;

        let rsa_public_key = match label {
            "PUBLIC KEY" => subject_public_key(doc.as_bytes(), OID_RSA_ENCRYPTION)?,
            "RSA PUBLIC KEY" => doc.as_bytes().to_vec(),
            other => {
                return Err(RejectReason::KeyDecodeError(format!(
                    "unexpected PEM label: {}",
                    other
                )))
            }
        };

        Ok(VerificationKey {
            algorithm: SignatureAlgorithm::WholeBodyRsa,
            key_bytes: rsa_public_key,
        })
    }

    pub fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    pub(crate) fn public_key(&self) -> UnparsedPublicKey<&[u8]> {
        let algorithm: &'static dyn VerificationAlgorithm = match self.algorithm {
            SignatureAlgorithm::WholeBodyRsa => &signature::RSA_PKCS1_2048_8192_SHA256,
            SignatureAlgorithm::Ed25519HttpSignature => &signature::ED25519,
        };
        UnparsedPublicKey::new(algorithm, self.key_bytes.as_slice())
    }
}

/// Parses a DER `SubjectPublicKeyInfo`, checks its algorithm and returns the
/// bytes of the public key bit string.
fn subject_public_key(der: &[u8], expected_oid: &str) -> Result<Vec<u8>, RejectReason> {
    let (rem, spki) = SubjectPublicKeyInfo::from_der(der)
        .map_err(|e| RejectReason::KeyDecodeError(format!("invalid key info: {}", e)))?;
    if !rem.is_empty() {
        return Err(RejectReason::KeyDecodeError(
            "trailing bytes after key info".to_string(),
        ));
    }

    let oid = spki.algorithm.algorithm.to_id_string();
    if oid != expected_oid {
        return Err(RejectReason::KeyDecodeError(format!(
            "unexpected key algorithm: {}",
            oid
        )));
    }

    Ok(spki.subject_public_key.data.to_vec())
}
