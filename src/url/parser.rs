//! String to component parsing.
//!
//! Parsing is deliberately forgiving: a missing scheme becomes `http://`,
//! characters outside the allow-list are percent-encoded, and only then is
//! the structure checked.

use crate::error::UrlError;
use crate::url::validate::{normalize_host, parse_port, repair_encoding, validate_scheme};

pub(crate) const DEFAULT_SCHEME: &str = "http";

/// Components extracted from a raw URL string.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParsedParts {
    pub scheme: String,
    pub host: String,
    pub host_is_ip: bool,
    pub port: Option<u16>,
    pub path: String,
    pub query: Option<String>,
    pub fragment: Option<String>,
}

/// Length of a leading `scheme://` or `scheme:\` delimiter, if present.
fn scheme_prefix(input: &str) -> Option<(&str, usize)> {
    let colon = input.find(':')?;
    let scheme = &input[..colon];
    validate_scheme(scheme).ok()?;

    let after = &input[colon + 1..];
    let delimiter = if after.starts_with("//") || after.starts_with("\\\\") {
        2
    } else if after.starts_with('\\') {
        1
    } else {
        return None;
    };

    Some((scheme, colon + 1 + delimiter))
}

/// Split an authority into host and optional port.
fn split_authority(authority: &str) -> Result<(String, bool, Option<u16>), UrlError> {
    let (host, port) = if authority.starts_with('[') {
        let close = authority
            .find(']')
            .ok_or_else(|| UrlError::invalid(format!("unterminated IPv6 literal '{}'", authority)))?;
        let rest = &authority[close + 1..];
        let port = match rest {
            "" => None,
            _ => Some(
                rest.strip_prefix(':')
                    .ok_or_else(|| UrlError::invalid(format!("invalid host '{}'", authority)))?,
            ),
        };
        (&authority[..=close], port)
    } else {
        match authority.rsplit_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (authority, None),
        }
    };

    if host.is_empty() {
        return Err(UrlError::invalid("URL has no host"));
    }

    let (host, is_ip) = normalize_host(host)?;
    let port = port.map(parse_port).transpose()?;
    Ok((host, is_ip, port))
}

/// Parse a raw URL into its components.
pub(crate) fn parse_url(raw: &str) -> Result<ParsedParts, UrlError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UrlError::invalid("URL cannot be empty"));
    }

    let (scheme, rest) = match scheme_prefix(trimmed) {
        Some((scheme, offset)) => (scheme.to_string(), &trimmed[offset..]),
        None => (DEFAULT_SCHEME.to_string(), trimmed),
    };
    if rest.is_empty() {
        return Err(UrlError::invalid(format!("'{}' is not a valid URL", trimmed)));
    }

    // host runs up to whichever of '/', '?', '#' comes first
    let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let (host, host_is_ip, port) = split_authority(&rest[..authority_end])?;
    let tail = repair_encoding(&rest[authority_end..]);

    let (before_fragment, fragment) = match tail.find('#') {
        Some(pos) => (&tail[..pos], Some(&tail[pos..])),
        None => (tail.as_str(), None),
    };
    let (path, query) = match before_fragment.find('?') {
        Some(pos) => (&before_fragment[..pos], Some(&before_fragment[pos + 1..])),
        None => (before_fragment, None),
    };

    Ok(ParsedParts {
        scheme,
        host,
        host_is_ip,
        port,
        path: if path.is_empty() { "/".to_string() } else { path.to_string() },
        query: query.filter(|q| !q.is_empty()).map(str::to_string),
        fragment: fragment.filter(|f| f.len() > 1).map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_url() {
        let parts = parse_url("https://www.example.com:8443/a/b.html?x=1&y=2#top").unwrap();
        assert_eq!(parts.scheme, "https");
        assert_eq!(parts.host, "www.example.com");
        assert_eq!(parts.port, Some(8443));
        assert_eq!(parts.path, "/a/b.html");
        assert_eq!(parts.query.as_deref(), Some("x=1&y=2"));
        assert_eq!(parts.fragment.as_deref(), Some("#top"));
        assert!(!parts.host_is_ip);
    }

    #[test]
    fn test_missing_scheme_defaults_to_http() {
        let parts = parse_url("  example.com/path  ").unwrap();
        assert_eq!(parts.scheme, "http");
        assert_eq!(parts.host, "example.com");
        assert_eq!(parts.path, "/path");

        let parts = parse_url("localhost:8080").unwrap();
        assert_eq!(parts.scheme, "http");
        assert_eq!(parts.host, "localhost");
        assert_eq!(parts.port, Some(8080));
    }

    #[test]
    fn test_backslash_delimiter() {
        let parts = parse_url("http:\\\\example.com").unwrap();
        assert_eq!(parts.scheme, "http");
        assert_eq!(parts.host, "example.com");
        assert_eq!(parts.path, "/");
        assert!(parse_url("ftp:\\example.com").is_ok());
    }

    #[test]
    fn test_root_path_when_query_or_fragment_first() {
        let parts = parse_url("http://example.com?a=b/c").unwrap();
        assert_eq!(parts.path, "/");
        assert_eq!(parts.query.as_deref(), Some("a=b/c"));

        let parts = parse_url("http://example.com#frag?notquery").unwrap();
        assert_eq!(parts.path, "/");
        assert_eq!(parts.query, None);
        assert_eq!(parts.fragment.as_deref(), Some("#frag?notquery"));
    }

    #[test]
    fn test_repairs_unsafe_characters() {
        let parts = parse_url("http://example.com/a path/[x]?q=\"v\"").unwrap();
        assert_eq!(parts.path, "/a%20path/%5Bx%5D");
        assert_eq!(parts.query.as_deref(), Some("q=%22v%22"));
    }

    #[test]
    fn test_ip_hosts() {
        let parts = parse_url("http://127.0.0.1/x").unwrap();
        assert!(parts.host_is_ip);

        let parts = parse_url("http://[::1]:8080/").unwrap();
        assert_eq!(parts.host, "[::1]");
        assert_eq!(parts.port, Some(8080));
        assert!(parts.host_is_ip);
    }

    #[test]
    fn test_idn_host() {
        let parts = parse_url("http://b\u{fc}cher.de/").unwrap();
        assert_eq!(parts.host, "xn--bcher-kva.de");
    }

    #[test]
    fn test_rejections() {
        for bad in ["", "   ", "http://", "http:///path", "http://exa mple.com", "http://a.com:port/", "http://user@a.com/"] {
            assert!(
                matches!(parse_url(bad), Err(UrlError::InvalidArgument(_))),
                "should reject {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_empty_query_and_fragment_dropped() {
        let parts = parse_url("http://example.com/?#").unwrap();
        assert_eq!(parts.query, None);
        assert_eq!(parts.fragment, None);
    }
}
