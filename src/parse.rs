use crate::error::RejectReason;
use std::collections::HashMap;

/// Parameters parsed from a `key1="value1", key2="value2"` header value.
///
/// Keys are kept exactly as given (no case folding). When a key repeats,
/// the last occurrence wins.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParameterizedHeader {
    params: HashMap<String, String>,
}

impl ParameterizedHeader {
    /// Given the (possibly absent) value of a signature header,
    /// parse and return `ParameterizedHeader`.
    ///
    /// An absent or blank header is `MissingSignature`. Any field that is not
    /// `key="value"` rejects the whole header with `MalformedHeader`; fields
    /// are never skipped.
    pub fn parse(header: Option<&str>) -> Result<ParameterizedHeader, RejectReason> {
        let mut rest = match header.map(str::trim) {
            Some(s) if !s.is_empty() => s,
            _ => return Err(RejectReason::MissingSignature),
        };

        let mut params = HashMap::new();
        loop {
            let (key, value, tail) = parse_field(rest)?;
            params.insert(key.to_string(), value);

            rest = tail.trim_start();
            if rest.is_empty() {
                break;
            }
            // fields are separated by a comma, a trailing one is an error
            rest = rest
                .strip_prefix(',')
                .map(str::trim_start)
                .filter(|r| !r.is_empty())
                .ok_or(RejectReason::MalformedHeader)?;
        }

        Ok(ParameterizedHeader { params })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub(crate) fn len(&self) -> usize {
        self.params.len()
    }
}

/// Splits one `key="value"` field off the front of `s`.
/// Returns the key, the unescaped value and whatever follows the closing quote.
fn parse_field(s: &str) -> Result<(&str, String, &str), RejectReason> {
    let eq = s.find('=').ok_or(RejectReason::MalformedHeader)?;
    let key = &s[..eq];
    if key.is_empty() || key.contains(|c: char| c == '"' || c == ',' || c.is_whitespace()) {
        return Err(RejectReason::MalformedHeader);
    }

    let quoted = s[eq + 1..]
        .strip_prefix('"')
        .ok_or(RejectReason::MalformedHeader)?;

    let mut value = String::new();
    let mut escaped = false;
    for (i, c) in quoted.char_indices() {
        match c {
            _ if escaped => {
                value.push(c);
                escaped = false;
            }
            '\\' => escaped = true,
            '"' => return Ok((key, value, &quoted[i + 1..])),
            _ => value.push(c),
        }
    }

    // ran out of input before the closing quote
    Err(RejectReason::MalformedHeader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const KEYGEN_HEADER: &str = r#"keyid="bf9b523f-dd65-48a2-9512-fb66ba6c3714", algorithm="ed25519", signature="KhkSkUeTpEEFrB5lR8X0Ky0P2UnwqBMl5ZsjWJ2Jgeo2clxEwVKCLaPQ4+kcSqWmKr+lTzNlFIH8dFVvxJFNDg==", headers="(request-target) host date digest""#;

    #[test]
    fn test_parse_header() -> anyhow::Result<()> {
        let parsed = ParameterizedHeader::parse(Some(KEYGEN_HEADER))?;
        assert_eq!(parsed.len(), 4);
        assert_eq!(
            parsed.get("keyid"),
            Some("bf9b523f-dd65-48a2-9512-fb66ba6c3714")
        );
        assert_eq!(parsed.get("algorithm"), Some("ed25519"));
        assert_eq!(
            parsed.get("signature"),
            Some("KhkSkUeTpEEFrB5lR8X0Ky0P2UnwqBMl5ZsjWJ2Jgeo2clxEwVKCLaPQ4+kcSqWmKr+lTzNlFIH8dFVvxJFNDg==")
        );
        assert_eq!(parsed.get("headers"), Some("(request-target) host date digest"));

        Ok(())
    }

    #[test]
    fn parse_is_order_independent() -> anyhow::Result<()> {
        let a = ParameterizedHeader::parse(Some(r#"k="v", k2="v2""#))?;
        let b = ParameterizedHeader::parse(Some(r#"k2="v2",k="v""#))?;
        assert_eq!(a, b);
        assert_eq!(a.get("k"), Some("v"));
        assert_eq!(a.get("k2"), Some("v2"));

        Ok(())
    }

    #[test]
    fn separators_tolerate_whitespace() -> anyhow::Result<()> {
        let parsed = ParameterizedHeader::parse(Some("  a=\"1\" ,\tb=\"2\"  "))?;
        assert_eq!(parsed.get("a"), Some("1"));
        assert_eq!(parsed.get("b"), Some("2"));

        Ok(())
    }

    #[test]
    fn values_may_hold_commas_and_escaped_quotes() -> anyhow::Result<()> {
        let parsed = ParameterizedHeader::parse(Some(r#"a="x, y", b="say \"hi\"""#))?;
        assert_eq!(parsed.get("a"), Some("x, y"));
        assert_eq!(parsed.get("b"), Some(r#"say "hi""#));

        Ok(())
    }

    #[test]
    fn keys_are_case_sensitive() -> anyhow::Result<()> {
        let parsed = ParameterizedHeader::parse(Some(r#"Algorithm="ed25519""#))?;
        assert_eq!(parsed.get("algorithm"), None);
        assert_eq!(parsed.get("Algorithm"), Some("ed25519"));

        Ok(())
    }

    #[test]
    fn last_duplicate_wins() -> anyhow::Result<()> {
        let parsed = ParameterizedHeader::parse(Some(r#"algorithm="rsa", algorithm="ed25519""#))?;
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed.get("algorithm"), Some("ed25519"));

        Ok(())
    }

    #[test]
    fn absent_or_blank_header_is_missing() {
        assert_eq!(
            ParameterizedHeader::parse(None),
            Err(RejectReason::MissingSignature)
        );
        assert_eq!(
            ParameterizedHeader::parse(Some("")),
            Err(RejectReason::MissingSignature)
        );
        assert_eq!(
            ParameterizedHeader::parse(Some("   ")),
            Err(RejectReason::MissingSignature)
        );
    }

    #[test]
    fn malformed_fields_reject_the_whole_header() {
        let malformed = [
            r#"algorithm"ed25519""#,
            r#"algorithm="ed25519"#,
            r#"algorithm=ed25519"#,
            r#"algorithm="ed25519", signature"#,
            r#"algorithm="ed25519","#,
            r#"="ed25519""#,
            r#"algorithm="ed25519" signature="abc""#,
            r#"algorithm="ed25519",, signature="abc""#,
            r#"my key="v""#,
        ];
        for header in malformed {
            assert_eq!(
                ParameterizedHeader::parse(Some(header)),
                Err(RejectReason::MalformedHeader),
                "{}",
                header
            );
        }
    }
}
