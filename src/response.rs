use anyhow::Result;
use serde_derive::{Deserialize, Serialize};
use serde_json::Value;

/// Top level members of a JSON:API document we hand back to the caller.
///
/// Only ever built from a body that already passed authentication.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ApiDocument {
    #[serde(default)]
    pub meta: Value,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub links: Value,
    #[serde(default)]
    pub errors: Option<Value>,
}

/// `{meta, data, links}` view used for output
#[derive(Debug, Serialize)]
struct Payload<'a> {
    meta: &'a Value,
    data: &'a Value,
    links: &'a Value,
}

/// `{errors}` view used for output
#[derive(Debug, Serialize)]
struct Errors<'a> {
    errors: &'a Value,
}

impl ApiDocument {
    /// Parse a verified body. Anything that is not a JSON object leaves
    /// every member empty; the body is authentic either way.
    pub(crate) fn from_verified_body(body: &[u8]) -> ApiDocument {
        // a derived struct would also take a JSON array, field by position
        let parsed = match serde_json::from_slice::<Value>(body) {
            Ok(object @ Value::Object(_)) => serde_json::from_value::<ApiDocument>(object),
            Ok(other) => {
                debug!("verified body is not a JSON object: {}", other);
                return ApiDocument::default();
            }
            Err(e) => Err(e),
        };
        match parsed {
            Ok(doc) => doc,
            Err(e) => {
                debug!("verified body is not a JSON:API document: {}", e);
                ApiDocument::default()
            }
        }
    }

    /// Pretty printed `{meta, data, links}`
    pub fn payload_pretty(&self) -> Result<String> {
        let payload = Payload {
            meta: &self.meta,
            data: &self.data,
            links: &self.links,
        };
        Ok(serde_json::to_string_pretty(&payload)?)
    }

    /// Pretty printed `{errors}`, if the server sent any
    pub fn errors_pretty(&self) -> Result<Option<String>> {
        match &self.errors {
            Some(errors) => Ok(Some(serde_json::to_string_pretty(&Errors { errors })?)),
            None => Ok(None),
        }
    }
}
