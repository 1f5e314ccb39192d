//! Small value types shared across modules.

use crate::url::UrlValue;

/// A host split by the suffix list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostComponents {
    /// Everything left of the domain (`a.b` in `a.b.example.co.uk`).
    pub subdomain: Option<String>,
    /// Registrable label immediately left of the TLD.
    pub domain: String,
    /// Effective TLD, possibly multi-label (`co.uk`).
    pub tld: String,
}

impl HostComponents {
    /// Reassemble the host: `subdomain.domain.tld`, omitting an empty subdomain.
    pub fn to_host(&self) -> String {
        match self.subdomain.as_deref() {
            Some(sub) if !sub.is_empty() => format!("{}.{}.{}", sub, self.domain, self.tld),
            _ => format!("{}.{}", self.domain, self.tld),
        }
    }

    pub(crate) fn to_lowercase(&self) -> Self {
        Self {
            subdomain: self.subdomain.as_ref().map(|s| s.to_lowercase()),
            domain: self.domain.to_lowercase(),
            tld: self.tld.to_lowercase(),
        }
    }
}

/// Either an existing URL value or a string still to be parsed.
///
/// Used by the comparison methods and [`UrlValue::cast`].
#[derive(Debug, Clone, Copy)]
pub enum UrlRef<'a> {
    Value(&'a UrlValue),
    Str(&'a str),
}

impl<'a> From<&'a UrlValue> for UrlRef<'a> {
    fn from(value: &'a UrlValue) -> Self {
        UrlRef::Value(value)
    }
}

impl<'a> From<&'a str> for UrlRef<'a> {
    fn from(value: &'a str) -> Self {
        UrlRef::Str(value)
    }
}

impl<'a> From<&'a String> for UrlRef<'a> {
    fn from(value: &'a String) -> Self {
        UrlRef::Str(value.as_str())
    }
}
