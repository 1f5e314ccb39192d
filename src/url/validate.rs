//! Syntactic checks for URL components and the percent-encoding repair pass.

use std::net::{Ipv4Addr, Ipv6Addr};

use crate::error::UrlError;

/// Characters passed through untouched by [`repair_encoding`].
const ALLOWED_PUNCTUATION: &str = "-_:#%/;$()~?=.&+";

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || ALLOWED_PUNCTUATION.contains(c)
}

/// Percent-encode every character outside the allow-list, byte by byte.
///
/// Existing `%XX` escapes are left alone since `%` itself is allowed.
pub(crate) fn repair_encoding(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if is_allowed(c) {
            out.push(c);
        } else {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{:02X}", byte));
            }
        }
    }
    out
}

/// Scheme syntax: a letter followed by at least one of letters, digits, `-`, `.`.
pub fn validate_scheme(scheme: &str) -> Result<(), UrlError> {
    let mut chars = scheme.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && scheme.len() >= 2
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');

    if valid {
        Ok(())
    } else {
        Err(UrlError::invalid(format!("invalid scheme '{}'", scheme)))
    }
}

/// True for dotted IPv4 literals and bracketed IPv6 literals.
pub fn is_ip_literal(host: &str) -> bool {
    if host.parse::<Ipv4Addr>().is_ok() {
        return true;
    }
    host.strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .is_some_and(|inner| inner.parse::<Ipv6Addr>().is_ok())
}

/// Validate a host name or host component.
///
/// Only ASCII letters, digits, hyphens and (when `allow_periods`) periods
/// are accepted; no leading or trailing hyphen or period, and no `..`.
pub fn validate_component(value: &str, allow_periods: bool, what: &str) -> Result<(), UrlError> {
    if value.is_empty() {
        return Err(UrlError::invalid(format!("{} cannot be empty", what)));
    }

    let bad_char = value
        .chars()
        .find(|&c| !(c.is_ascii_alphanumeric() || c == '-' || (allow_periods && c == '.')));
    if let Some(c) = bad_char {
        return Err(UrlError::invalid(format!(
            "{} '{}' contains invalid character '{}'",
            what, value, c
        )));
    }

    if value.starts_with(['-', '.']) || value.ends_with(['-', '.']) {
        return Err(UrlError::invalid(format!(
            "{} '{}' cannot start or end with '-' or '.'",
            what, value
        )));
    }

    if value.contains("..") {
        return Err(UrlError::invalid(format!("{} '{}' contains '..'", what, value)));
    }

    Ok(())
}

/// Normalize and validate a full host, returning it with its IP flag.
///
/// Non-ASCII names go through IDNA conversion first.
pub fn normalize_host(host: &str) -> Result<(String, bool), UrlError> {
    if is_ip_literal(host) {
        return Ok((host.to_string(), true));
    }

    let ascii = if host.is_ascii() {
        host.to_string()
    } else {
        idna::domain_to_ascii(host)
            .map_err(|_| UrlError::invalid(format!("host '{}' is not a valid domain name", host)))?
    };

    validate_component(&ascii, true, "host")?;
    Ok((ascii, false))
}

/// Parse a port given as text.
pub fn parse_port(port: &str) -> Result<u16, UrlError> {
    let trimmed = port.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(UrlError::invalid(format!("invalid port '{}'", port)));
    }
    trimmed
        .parse::<u16>()
        .map_err(|_| UrlError::invalid(format!("port '{}' is out of range", port)))
}
