use crate::http_verifier::RawResponse;
use crate::service::Service;
use anyhow::{bail, Context, Result};
use std::io::Read;

/// Same cap ureq puts on `into_string`
const MAX_BODY_LEN: u64 = 10 * 1024 * 1024;
const ACCEPT: &str = "application/vnd.api+json";

/// A fetched response together with the request target it answers.
#[derive(Debug)]
pub struct Fetched {
    pub method: &'static str,
    pub request_target: String,
    pub response: RawResponse,
}

impl Service {
    /// GET an account scoped route, e.g. `licenses?limit=5`.
    ///
    /// Error statuses are returned like any other response: the API signs
    /// its error documents too, so they go through authentication as well.
    pub fn fetch(&self, route: &str) -> Result<Fetched> {
        let path = account_path(&self.config.api_version, &self.config.account_id, route);
        let url = format!("https://{}{}", self.config.host, path);
        debug!("GET {}", url);

        let mut req = self.agent.get(&url).set("Accept", ACCEPT);
        if let Some(token) = &self.config.product_token {
            req = req.set("Authorization", &format!("Bearer {}", token));
        }

        let resp = match req.call() {
            Ok(resp) => resp,
            Err(ureq::Error::Status(code, resp)) => {
                info!("api answered {}", code);
                resp
            }
            Err(e) => bail!("request to {} failed: {}", url, e),
        };

        let request_target = request_target(resp.get_url());
        let response = into_raw_response(resp, MAX_BODY_LEN)?;
        Ok(Fetched {
            method: "get",
            request_target,
            response,
        })
    }
}

/// `/<version>/accounts/<account>/<route>`
fn account_path(api_version: &str, account_id: &str, route: &str) -> String {
    format!(
        "/{}/accounts/{}/{}",
        api_version,
        account_id,
        route.trim_start_matches('/')
    )
}

/// Path and query of an absolute URL, i.e. what went on the request line.
/// Follows redirects since ureq reports the final URL.
fn request_target(url: &str) -> String {
    let after_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let target = after_scheme
        .find('/')
        .map_or("/", |start| &after_scheme[start..]);
    let target = target.split('#').next().unwrap_or(target);
    format!("/{}", target.trim_start_matches('/'))
}

/// Captures status, headers in wire order and the body bytes untouched.
/// A body longer than `max_body_len` fails the fetch rather than being cut.
fn into_raw_response(resp: ureq::Response, max_body_len: u64) -> Result<RawResponse> {
    let status = resp.status();
    let headers = resp
        .headers_names()
        .into_iter()
        .flat_map(|name| {
            resp.all(&name)
                .into_iter()
                .map(|value| (name.clone(), value.to_string()))
                .collect::<Vec<_>>()
        })
        .collect();

    let mut body = Vec::new();
    resp.into_reader()
        .take(max_body_len + 1)
        .read_to_end(&mut body)
        .context("could not read response body")?;
    if body.len() as u64 > max_body_len {
        bail!("response body exceeds {} bytes", max_body_len);
    }

    Ok(RawResponse::new(status, headers, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builds_account_paths() {
        assert_eq!(account_path("v1", "demo", ""), "/v1/accounts/demo/");
        assert_eq!(
            account_path("v1", "demo", "licenses?limit=5"),
            "/v1/accounts/demo/licenses?limit=5"
        );
        assert_eq!(
            account_path("v1", "demo", "//licenses/1"),
            "/v1/accounts/demo/licenses/1"
        );
    }

    #[test]
    fn request_target_from_url() {
        assert_eq!(
            request_target("https://api.keygen.sh/v1/accounts/demo/licenses?limit=5"),
            "/v1/accounts/demo/licenses?limit=5"
        );
        assert_eq!(request_target("https://api.keygen.sh"), "/");
        assert_eq!(
            request_target("https://api.keygen.sh//v1/accounts/demo#frag"),
            "/v1/accounts/demo"
        );
    }

    #[test]
    fn raw_response_keeps_body_bytes() -> Result<()> {
        let body = b"{\"data\":\"\xe2\x82\xac\"}\r\n";
        let resp = ureq::Response::new(200, "OK", std::str::from_utf8(body)?)?;
        let raw = into_raw_response(resp, MAX_BODY_LEN)?;
        assert_eq!(raw.status, 200);
        assert_eq!(raw.body, body.to_vec());

        Ok(())
    }

    #[test]
    fn oversized_body_fails_the_fetch() -> Result<()> {
        let body = "x".repeat(17);

        let resp = ureq::Response::new(200, "OK", &body)?;
        assert!(into_raw_response(resp, 16).is_err());

        let resp = ureq::Response::new(200, "OK", &body)?;
        assert_eq!(into_raw_response(resp, 17)?.body, body.into_bytes());

        Ok(())
    }
}
