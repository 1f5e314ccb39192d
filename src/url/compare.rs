//! Equality notions between URLs: loose structural equality and
//! registrable-domain equality. Neither ever returns an error.

use std::borrow::Cow;

use tracing::debug;

use crate::types::UrlRef;
use crate::url::value::UrlValue;

const WEB_SCHEMES: [&str; 2] = ["http", "https"];

impl UrlValue {
    /// Loose equality.
    ///
    /// `http` and `https` are interchangeable, case and fragments are
    /// ignored, a leading `www.` on either host is ignored, and every query
    /// parameter of `self` must appear with the same value in `other`
    /// (`other` may carry extra parameters).
    ///
    /// A string that fails to parse is compared verbatim against
    /// [`UrlValue::url`].
    pub fn compare<'a>(&self, other: impl Into<UrlRef<'a>>) -> bool {
        let other = match other.into() {
            UrlRef::Value(value) => Cow::Borrowed(value),
            UrlRef::Str(raw) => match self.parse_sibling(raw) {
                Ok(value) => Cow::Owned(value),
                Err(_) => return self.url() == raw,
            },
        };

        if self.host().is_none() != other.host().is_none() {
            return false;
        }

        let (scheme_a, scheme_b) = (self.scheme().to_lowercase(), other.scheme().to_lowercase());
        if scheme_a != scheme_b
            && !(WEB_SCHEMES.contains(&scheme_a.as_str()) && WEB_SCHEMES.contains(&scheme_b.as_str()))
        {
            return false;
        }

        let a = self.comparison_form();
        let b = other.comparison_form();
        if a.url() == b.url() {
            return true;
        }

        if a.path() != b.path() || !hosts_equal_ignoring_www(a.host(), b.host()) {
            return false;
        }

        let params_match = a
            .query_string_data()
            .iter()
            .all(|(key, value)| b.query_string_param(key) == Some(value));
        params_match
    }

    /// True when both URLs share the same registrable domain.
    ///
    /// Identical hosts always match. Unless `require_subdomain_match` is set,
    /// a host that is a dot-anchored suffix of the other matches, and
    /// otherwise both sides must resolve to the same domain and TLD. Hosts
    /// that cannot be resolved never match.
    ///
    /// The suffix shortcut only matches at a label boundary, so `xbar.com`
    /// does not match `bar.com`.
    pub fn compare_root_domain<'a>(&self, other: impl Into<UrlRef<'a>>, require_subdomain_match: bool) -> bool {
        let Some(own_host) = self.host() else {
            return false;
        };

        let other = match other.into() {
            UrlRef::Value(value) => Cow::Borrowed(value),
            UrlRef::Str(raw) => match self.parse_sibling(raw) {
                Ok(value) => Cow::Owned(value),
                Err(_) => {
                    return bare_host(raw)
                        .is_some_and(|host| hosts_match(own_host, &host, require_subdomain_match));
                }
            },
        };

        let Some(other_host) = other.host() else {
            return false;
        };
        if hosts_match(own_host, other_host, require_subdomain_match) {
            return true;
        }
        if require_subdomain_match {
            return false;
        }

        match (registrable(self), registrable(&other)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

/// Lower-cased `(domain, tld)`, or `None` when either side is unavailable.
fn registrable(url: &UrlValue) -> Option<(String, String)> {
    let resolved = url.domain().and_then(|domain| Ok((domain, url.tld()?)));
    match resolved {
        Ok((Some(domain), Some(tld))) => Some((domain.to_lowercase(), tld.to_lowercase())),
        Ok(_) => None,
        Err(err) => {
            debug!(host = url.host(), error = %err, "Root domain comparison without resolution");
            None
        }
    }
}

fn hosts_equal_ignoring_www(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => {
            a == b || a.strip_prefix("www.") == Some(b) || b.strip_prefix("www.") == Some(a)
        }
        (None, None) => true,
        _ => false,
    }
}

/// Case-insensitive equality, or a dot-anchored suffix match when allowed.
fn hosts_match(a: &str, b: &str, require_subdomain_match: bool) -> bool {
    let (a, b) = (a.to_lowercase(), b.to_lowercase());
    if a == b {
        return true;
    }
    if require_subdomain_match || a.len() == b.len() {
        return false;
    }

    let (short, long) = if a.len() < b.len() { (&a, &b) } else { (&b, &a) };
    long.strip_suffix(short.as_str())
        .is_some_and(|prefix| prefix.ends_with('.'))
}

/// Host of a `scheme://host...` string the URL parser rejected.
fn bare_host(raw: &str) -> Option<String> {
    if let Some(host) = ::url::Url::parse(raw.trim()).ok().and_then(|u| u.host_str().map(str::to_string)) {
        return Some(host);
    }

    let (_, rest) = raw.trim().split_once("://")?;
    let end = rest.find(['/', '?', '#', ':']).unwrap_or(rest.len());
    let host = &rest[..end];
    (!host.is_empty()).then(|| host.to_string())
}
