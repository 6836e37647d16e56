/// Request and response values the server binds into its signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningContext<'a> {
    pub method: &'a str,
    /// path and query of the request as sent
    pub request_target_path: &'a str,
    pub host: &'a str,
    /// `Date` header of the response, verbatim
    pub date: &'a str,
    /// `sha-256=...` digest of the body
    pub digest: &'a str,
}

impl SigningContext<'_> {
    /// Rebuilds the signing string exactly as the server produced it:
    ///
    /// ```text
    /// (request-target): get /v1/accounts/<account>/<route>
    /// host: <host>
    /// date: <date>
    /// digest: sha-256=<base64>
    /// ```
    ///
    /// Lines are joined with `\n` with no trailing newline. The method is
    /// lower-cased, leading slashes of the path collapse to one.
    pub fn build(&self) -> String {
        let request_target = format!(
            "{} /{}",
            self.method.to_lowercase(),
            self.request_target_path.trim_start_matches('/')
        );

        // order matters
        let sig_data_array: [(&str, &str); 4] = [
            ("(request-target)", request_target.as_str()),
            ("host", self.host),
            ("date", self.date),
            ("digest", self.digest),
        ];
        sig_data_array
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect::<Vec<String>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn context<'a>(method: &'a str, path: &'a str) -> SigningContext<'a> {
        SigningContext {
            method,
            request_target_path: path,
            host: "api.keygen.sh",
            date: "Wed, 09 Jun 2021 16:08:15 GMT",
            digest: "sha-256=a81EUrIBO/xIiQDrhzylMua10yjTg4LrJlxCFp/FDsQ=",
        }
    }

    #[test]
    fn builds_the_exact_signing_string() {
        let expected = "(request-target): get /v1/accounts/demo/licenses/1\n\
                        host: api.keygen.sh\n\
                        date: Wed, 09 Jun 2021 16:08:15 GMT\n\
                        digest: sha-256=a81EUrIBO/xIiQDrhzylMua10yjTg4LrJlxCFp/FDsQ=";
        assert_eq!(context("get", "/v1/accounts/demo/licenses/1").build(), expected);
    }

    #[test]
    fn method_is_lower_cased() {
        assert_eq!(
            context("GET", "/v1/accounts/demo").build(),
            context("get", "/v1/accounts/demo").build()
        );
    }

    #[test]
    fn leading_slashes_collapse() {
        let built = context("get", "//v1/accounts/demo/licenses?limit=5").build();
        assert!(built.starts_with("(request-target): get /v1/accounts/demo/licenses?limit=5\n"));
        let built = context("get", "v1/accounts/demo").build();
        assert!(built.starts_with("(request-target): get /v1/accounts/demo\n"));
    }

    #[test]
    fn path_is_not_otherwise_normalized() {
        let built = context("get", "/v1/accounts/demo//licenses/?q=a%20b").build();
        assert!(built.starts_with("(request-target): get /v1/accounts/demo//licenses/?q=a%20b\n"));
        assert!(!built.ends_with('\n'));
        assert_eq!(built.lines().count(), 4);
    }
}
