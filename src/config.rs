use anyhow::{anyhow, Error, Result};
use std::time::Duration;

/// Public key material the responses are checked against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyMaterial {
    /// hex encoded raw Ed25519 key, for `Keygen-Signature`
    Ed25519Hex(String),
    /// PEM armored RSA key, for the legacy `X-Signature`
    RsaPem(String),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub account_id: String,
    /// sent as a bearer token when present
    pub product_token: Option<String>,
    pub key: KeyMaterial,
    /// API host, also bound into the signing string
    pub host: String,
    pub api_version: String,
    pub timeout: Duration,
}

const ENV_ACCOUNT_ID: &str = "KEYGEN_ACCOUNT_ID";
const ENV_PRODUCT_TOKEN: &str = "KEYGEN_PRODUCT_TOKEN";
const ENV_VERIFY_KEY: &str = "KEYGEN_VERIFY_KEY";
const ENV_PUBLIC_KEY: &str = "KEYGEN_PUBLIC_KEY";
const ENV_HOST: &str = "KEYGEN_HOST";
const ENV_API_VERSION: &str = "KEYGEN_API_VERSION";
const ENV_TIMEOUT_SECS: &str = "KEYGEN_TIMEOUT_SECS";
const DEFAULT_HOST: &str = "api.keygen.sh";
const DEFAULT_API_VERSION: &str = "v1";
const DEFAULT_TIMEOUT_SECS: u64 = 5;

impl Config {
    pub fn new() -> Result<Config> {
        Config::from_vars(|var| std::env::var(var).ok())
    }

    /// Builds the config from any variable lookup. Values are trimmed and
    /// empty ones count as unset.
    pub fn from_vars<F>(lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let account_id = var(ENV_ACCOUNT_ID).ok_or_else(|| env_not_found(ENV_ACCOUNT_ID))?;
        let product_token = var(ENV_PRODUCT_TOKEN);

        // the ed25519 key wins when both are set
        let key = match (var(ENV_VERIFY_KEY), var(ENV_PUBLIC_KEY)) {
            (Some(hex), _) => KeyMaterial::Ed25519Hex(hex),
            (None, Some(pem)) => KeyMaterial::RsaPem(pem),
            (None, None) => {
                return Err(anyhow!(
                    "config: one of {} or {} env vars is required",
                    ENV_VERIFY_KEY,
                    ENV_PUBLIC_KEY
                ))
            }
        };

        let host = var(ENV_HOST).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let api_version = var(ENV_API_VERSION).unwrap_or_else(|| DEFAULT_API_VERSION.to_string());

        let timeout = var(ENV_TIMEOUT_SECS)
            .map_or(Ok(DEFAULT_TIMEOUT_SECS), |env_val| env_val.parse::<u64>())
            .map_err(|e| anyhow!("config: {}: {}", ENV_TIMEOUT_SECS, e))?;

        Ok(Config {
            account_id,
            product_token,
            key,
            host,
            api_version,
            timeout: Duration::from_secs(timeout),
        })
    }
}

fn env_not_found(var: &str) -> Error {
    anyhow!("config: {} env var not found", var)
}
