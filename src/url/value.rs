//! The URL value type: parsed components, mutators and re-serialization.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::error::UrlError;
use crate::psl::SuffixList;
use crate::types::{HostComponents, UrlRef};
use crate::url::parser::{parse_url, DEFAULT_SCHEME};
use crate::url::query::{build_query_string, parse_query_string, QueryMap, QueryValue};
use crate::url::validate::{normalize_host, parse_port, repair_encoding, validate_component, validate_scheme};

const DEFAULT_SEPARATOR: &str = "&";

/// A parsed URL whose components can be read and mutated individually.
///
/// The serialized form (`url()`, `Display`) is rebuilt after every mutation
/// as `scheme://host[:port][path][?query][#fragment]`.
///
/// Subdomain, domain and TLD are resolved lazily through a [`SuffixList`]
/// the first time one of them is needed, and the result (including a failed
/// resolution) is remembered until the host changes.
///
/// # Examples
///
/// ```no_run
/// use psurl::UrlValue;
///
/// let mut url = UrlValue::parse("www.example.co.uk/docs?page=2")?;
/// assert_eq!(url.url(), "http://www.example.co.uk/docs?page=2");
/// assert_eq!(url.tld()?, Some("co.uk"));
///
/// url.set_query_string_param("page", "3")?;
/// url.set_scheme("https")?;
/// assert_eq!(url.to_string(), "https://www.example.co.uk/docs?page=3");
/// # Ok::<(), psurl::UrlError>(())
/// ```
#[derive(Debug, Clone)]
pub struct UrlValue {
    raw: Option<String>,
    normalized: String,
    scheme: String,
    host: Option<String>,
    port: Option<u16>,
    path: String,
    query: Option<String>,
    query_data: QueryMap,
    separator: String,
    fragment: Option<String>,
    host_is_ip: bool,
    /// Set once resolution has been attempted; `None` inside means it failed.
    components: OnceLock<Option<HostComponents>>,
    components_explicit: bool,
    suffix_list: Option<Arc<SuffixList>>,
}

impl Default for UrlValue {
    fn default() -> Self {
        Self {
            raw: None,
            normalized: String::new(),
            scheme: DEFAULT_SCHEME.to_string(),
            host: None,
            port: None,
            path: String::new(),
            query: None,
            query_data: QueryMap::new(),
            separator: DEFAULT_SEPARATOR.to_string(),
            fragment: None,
            host_is_ip: false,
            components: OnceLock::new(),
            components_explicit: false,
            suffix_list: None,
        }
    }
}

impl UrlValue {
    /// An empty value with no host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a URL string. A missing scheme defaults to `http`.
    pub fn parse(raw: &str) -> Result<Self, UrlError> {
        let mut value = Self::new();
        value.set_url(raw)?;
        Ok(value)
    }

    /// Parse a URL string and bind it to a specific suffix list.
    pub fn parse_with(raw: &str, suffix_list: Arc<SuffixList>) -> Result<Self, UrlError> {
        let mut value = Self::new().with_suffix_list(suffix_list);
        value.set_url(raw)?;
        Ok(value)
    }

    /// Bind this value to `suffix_list` instead of the process-wide one.
    pub fn with_suffix_list(mut self, suffix_list: Arc<SuffixList>) -> Self {
        self.suffix_list = Some(suffix_list);
        self.components = OnceLock::new();
        self
    }

    /// Pass an existing value through, or parse a non-empty string.
    ///
    /// Empty strings yield `Ok(None)`; parse errors propagate.
    pub fn cast<'a>(value: impl Into<UrlRef<'a>>) -> Result<Option<Cow<'a, UrlValue>>, UrlError> {
        match value.into() {
            UrlRef::Value(value) => Ok(Some(Cow::Borrowed(value))),
            UrlRef::Str(s) if s.trim().is_empty() => Ok(None),
            UrlRef::Str(s) => UrlValue::parse(s).map(|v| Some(Cow::Owned(v))),
        }
    }

    /// Delete the on-disk cache of the process-wide suffix list.
    pub fn clear_suffix_list_cache() -> Result<(), UrlError> {
        SuffixList::global().clear_cache()
    }

    /// See [`crate::parse_query_string`].
    pub fn parse_query_string(query: &str, separator: &str) -> QueryMap {
        parse_query_string(query, separator)
    }

    /// See [`crate::build_query_string`].
    pub fn build_query_string(map: &QueryMap, separator: &str) -> String {
        build_query_string(map, separator)
    }

    /// Parse `raw` bound to the same suffix list as `self`.
    pub(crate) fn parse_sibling(&self, raw: &str) -> Result<UrlValue, UrlError> {
        let mut value = Self {
            suffix_list: self.suffix_list.clone(),
            ..Self::default()
        };
        value.set_url(raw)?;
        Ok(value)
    }

    pub(crate) fn suffix_list(&self) -> Arc<SuffixList> {
        self.suffix_list.clone().unwrap_or_else(SuffixList::global)
    }

    // ---- getters ----

    /// Serialized form; empty when no host is set.
    pub fn url(&self) -> &str {
        &self.normalized
    }

    /// The string last given to [`UrlValue::set_url`], trimmed.
    pub fn raw_url(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// Scheme without the `://` delimiter.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Host in its ASCII form; `None` for an empty value.
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Host with `:port` appended when a port is set.
    pub fn full_host(&self) -> Option<String> {
        let host = self.host.as_deref()?;
        Some(match self.port {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        })
    }

    /// Explicit port, if one was given.
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Path including its leading `/`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Path, query string and fragment as they appear in the serialized form.
    pub fn full_path(&self) -> String {
        let mut out = self.path.clone();
        if let Some(query) = &self.query {
            out.push('?');
            out.push_str(query);
        }
        if let Some(fragment) = &self.fragment {
            out.push_str(fragment);
        }
        out
    }

    /// Final path segment; empty when the path ends in `/`.
    pub fn path_base_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or("")
    }

    /// Fragment including its leading `#`.
    pub fn hash_fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Raw query string without the leading `?`.
    pub fn query_string(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Decoded query string parameters.
    pub fn query_string_data(&self) -> &QueryMap {
        &self.query_data
    }

    /// One decoded query string parameter.
    pub fn query_string_param(&self, key: &str) -> Option<&QueryValue> {
        self.query_data.get(key)
    }

    /// Separator between query string arguments, `&` by default.
    pub fn qs_arg_separator(&self) -> &str {
        &self.separator
    }

    /// True when the host is an IPv4 or bracketed IPv6 literal.
    pub fn host_is_ip(&self) -> bool {
        self.host_is_ip
    }

    /// Subdomain, e.g. `www` in `www.example.com`.
    ///
    /// `Ok(None)` for IP hosts, hosts without a subdomain, and hosts the
    /// suffix list cannot resolve. Errors with [`UrlError::TldDisabled`]
    /// when suffix list usage is disabled.
    pub fn subdomain(&self) -> Result<Option<&str>, UrlError> {
        Ok(self.host_components()?.and_then(|c| c.subdomain.as_deref()))
    }

    /// Registrable domain label, e.g. `example` in `www.example.com`.
    pub fn domain(&self) -> Result<Option<&str>, UrlError> {
        Ok(self.host_components()?.map(|c| c.domain.as_str()))
    }

    /// Effective TLD, e.g. `co.uk`.
    pub fn tld(&self) -> Result<Option<&str>, UrlError> {
        Ok(self.host_components()?.map(|c| c.tld.as_str()))
    }

    /// Resolve the host once and remember the outcome.
    ///
    /// TLD resolution failures are remembered as "no components"; load
    /// failures of the list itself are returned and retried next time.
    fn host_components(&self) -> Result<Option<&HostComponents>, UrlError> {
        let Some(host) = self.host.as_deref() else {
            return Ok(None);
        };
        if self.host_is_ip {
            return Ok(None);
        }

        let list = self.suffix_list();
        if list.is_disabled() {
            return Err(UrlError::TldDisabled);
        }
        if let Some(cached) = self.components.get() {
            return Ok(cached.as_ref());
        }

        let resolved = match list.resolve(host) {
            Ok(components) => Some(components),
            Err(err) if err.is_tld_error() => {
                debug!(host, error = %err, "Host has no resolvable TLD");
                None
            }
            Err(err) => return Err(err),
        };

        Ok(self.components.get_or_init(|| resolved).as_ref())
    }

    // ---- mutators ----

    /// Replace the whole value by parsing `raw`.
    ///
    /// All state is reset before parsing, so on error the value is left empty
    /// rather than half-updated.
    pub fn set_url(&mut self, raw: &str) -> Result<&mut Self, UrlError> {
        let suffix_list = self.suffix_list.take();
        *self = Self {
            suffix_list,
            ..Self::default()
        };

        let parts = parse_url(raw)?;
        self.raw = Some(raw.trim().to_string());
        self.scheme = parts.scheme;
        self.host = Some(parts.host);
        self.host_is_ip = parts.host_is_ip;
        self.port = parts.port;
        self.path = parts.path;
        self.query = parts.query;
        self.fragment = parts.fragment;
        self.refresh_query_data();
        self.update_url();
        Ok(self)
    }

    pub fn set_scheme(&mut self, scheme: &str) -> Result<&mut Self, UrlError> {
        validate_scheme(scheme)?;
        self.scheme = scheme.to_string();
        self.update_url();
        Ok(self)
    }

    /// Replace the host. Resets the port and any resolved host components.
    pub fn set_host(&mut self, host: &str) -> Result<&mut Self, UrlError> {
        let (host, is_ip) = normalize_host(host.trim())?;
        self.host = Some(host);
        self.host_is_ip = is_ip;
        self.port = None;
        self.reset_components();
        if self.path.is_empty() {
            self.path = "/".to_string();
        }
        self.update_url();
        Ok(self)
    }

    pub fn set_port(&mut self, port: u16) -> Result<&mut Self, UrlError> {
        self.port = Some(port);
        self.update_url();
        Ok(self)
    }

    /// Set the port from its decimal text form.
    pub fn set_port_str(&mut self, port: &str) -> Result<&mut Self, UrlError> {
        let port = parse_port(port)?;
        self.set_port(port)
    }

    pub fn unset_port(&mut self) -> &mut Self {
        self.port = None;
        self.update_url();
        self
    }

    /// Replace the subdomain; an empty string removes it.
    pub fn set_subdomain(&mut self, subdomain: &str) -> Result<&mut Self, UrlError> {
        let mut components = self.components_for_update("subdomain")?;
        components.subdomain = if subdomain.is_empty() {
            None
        } else {
            validate_component(subdomain, true, "subdomain")?;
            Some(subdomain.to_string())
        };
        self.apply_components(components);
        Ok(self)
    }

    pub fn set_domain(&mut self, domain: &str) -> Result<&mut Self, UrlError> {
        let mut components = self.components_for_update("domain")?;
        validate_component(domain, false, "domain")?;
        components.domain = domain.to_string();
        self.apply_components(components);
        Ok(self)
    }

    /// Replace the TLD.
    ///
    /// The current host does not have to resolve: when it does not, its last
    /// label is taken as the old TLD. The proposed host must resolve to
    /// exactly `tld` before anything is changed.
    pub fn set_tld(&mut self, tld: &str) -> Result<&mut Self, UrlError> {
        let host = self.require_host("TLD")?.to_string();
        validate_component(tld, true, "TLD")?;

        let (subdomain, domain) = match self.host_components()? {
            Some(current) => (current.subdomain.clone(), current.domain.clone()),
            None => {
                let labels: Vec<&str> = host.split('.').collect();
                if labels.len() < 2 {
                    return Err(UrlError::Logic(format!(
                        "cannot determine the domain of '{}'",
                        host
                    )));
                }
                let subdomain = (labels.len() > 2).then(|| labels[..labels.len() - 2].join("."));
                (subdomain, labels[labels.len() - 2].to_string())
            }
        };

        let proposed = HostComponents {
            subdomain,
            domain,
            tld: tld.to_string(),
        };
        let resolved = self.suffix_list().resolve(&proposed.to_host())?;
        if !resolved.tld.eq_ignore_ascii_case(tld) {
            return Err(UrlError::TldResolution(format!(
                "'{}' is not a valid TLD for '{}'",
                tld,
                proposed.to_host()
            )));
        }

        self.apply_components(resolved);
        Ok(self)
    }

    /// Set the path. `#` and `?` are rejected; a leading `/` is added.
    pub fn set_path(&mut self, path: &str) -> Result<&mut Self, UrlError> {
        if path.contains(['#', '?']) {
            return Err(UrlError::invalid(format!(
                "path '{}' cannot contain '#' or '?'",
                path
            )));
        }
        let path = repair_encoding(path);
        self.path = if path.starts_with('/') {
            path
        } else {
            format!("/{}", path)
        };
        self.update_url();
        Ok(self)
    }

    /// Replace the final path segment with `name`.
    ///
    /// For a path ending in `/`, `name` is appended when
    /// `append_if_trailing_slash` is true; otherwise it replaces the segment
    /// between the last two slashes and the trailing slash is kept.
    pub fn set_path_base_name(&mut self, name: &str, append_if_trailing_slash: bool) -> Result<&mut Self, UrlError> {
        let name = name.trim_start_matches('/');
        let path = if self.path.is_empty() { "/" } else { self.path.as_str() };

        let new_path = if let Some(dir) = path.strip_suffix('/') {
            if append_if_trailing_slash {
                format!("{}{}", path, name)
            } else {
                match dir.rfind('/') {
                    Some(pos) => format!("{}{}/", &dir[..=pos], name),
                    None => format!("/{}/", name),
                }
            }
        } else {
            let pos = path.rfind('/').unwrap_or(0);
            format!("{}{}", &path[..=pos], name)
        };

        self.set_path(&new_path)
    }

    /// Set the fragment; a leading `#` is added. An empty string removes it.
    pub fn set_hash_fragment(&mut self, fragment: &str) -> Result<&mut Self, UrlError> {
        let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
        self.fragment = if fragment.is_empty() {
            None
        } else {
            Some(format!("#{}", repair_encoding(fragment)))
        };
        self.update_url();
        Ok(self)
    }

    pub fn strip_hash_fragment(&mut self) -> &mut Self {
        self.fragment = None;
        self.update_url();
        self
    }

    /// Set the raw query string, with or without its leading `?`.
    pub fn set_query_string(&mut self, query: &str) -> Result<&mut Self, UrlError> {
        let query = query.strip_prefix('?').unwrap_or(query);
        self.query = if query.is_empty() {
            None
        } else {
            Some(repair_encoding(query))
        };
        self.refresh_query_data();
        self.update_url();
        Ok(self)
    }

    /// Replace the query string with the encoding of `data`.
    pub fn set_query_data(&mut self, data: &QueryMap) -> Result<&mut Self, UrlError> {
        let encoded = build_query_string(data, &self.separator);
        self.query = (!encoded.is_empty()).then_some(encoded);
        self.refresh_query_data();
        self.update_url();
        Ok(self)
    }

    /// Set one decoded parameter and re-encode the query string.
    pub fn set_query_string_param(&mut self, key: &str, value: impl Into<QueryValue>) -> Result<&mut Self, UrlError> {
        let mut data = self.query_data.clone();
        data.insert(key, value);
        self.set_query_data(&data)
    }

    /// Merge several parameters into the decoded map and re-encode.
    pub fn set_query_string_params<K, V>(&mut self, params: impl IntoIterator<Item = (K, V)>) -> Result<&mut Self, UrlError>
    where
        K: Into<String>,
        V: Into<QueryValue>,
    {
        let mut data = self.query_data.clone();
        for (key, value) in params {
            data.insert(key, value);
        }
        self.set_query_data(&data)
    }

    pub fn unset_query_string_param(&mut self, key: &str) -> Result<&mut Self, UrlError> {
        let mut data = self.query_data.clone();
        if data.remove(key).is_none() {
            return Ok(self);
        }
        self.set_query_data(&data)
    }

    /// Change the argument separator. The raw query string is kept as is and
    /// only re-decoded under the new separator.
    pub fn set_qs_arg_separator(&mut self, separator: &str) -> Result<&mut Self, UrlError> {
        if separator.is_empty() {
            return Err(UrlError::invalid("query string separator cannot be empty"));
        }
        self.separator = separator.to_string();
        self.refresh_query_data();
        self.update_url();
        Ok(self)
    }

    /// Lower-case every component.
    ///
    /// Resolution is attempted first so resolved host components are
    /// lower-cased individually; otherwise the host is lower-cased whole.
    pub fn set_lower_case(&mut self) -> &mut Self {
        let resolved = match self.host_components() {
            Ok(components) => components.map(HostComponents::to_lowercase),
            Err(err) => {
                debug!(error = %err, "Lower-casing without host components");
                None
            }
        };

        self.scheme = self.scheme.to_lowercase();
        self.path = self.path.to_lowercase();
        self.query = self.query.as_ref().map(|q| q.to_lowercase());
        self.fragment = self.fragment.as_ref().map(|f| f.to_lowercase());

        match resolved {
            Some(components) => self.apply_components(components),
            None => {
                self.host = self.host.as_ref().map(|h| h.to_lowercase());
            }
        }

        self.refresh_query_data();
        self.update_url();
        self
    }

    // ---- internals ----

    fn require_host(&self, what: &str) -> Result<&str, UrlError> {
        let host = self
            .host
            .as_deref()
            .ok_or_else(|| UrlError::Logic(format!("cannot set {} before a host is set", what)))?;
        if self.host_is_ip {
            return Err(UrlError::Logic(format!("cannot set {} on an IP address host", what)));
        }
        Ok(host)
    }

    fn components_for_update(&self, what: &str) -> Result<HostComponents, UrlError> {
        self.require_host(what)?;
        self.host_components()?.cloned().ok_or_else(|| {
            UrlError::Logic(format!(
                "cannot set {} because the host TLD could not be resolved",
                what
            ))
        })
    }

    fn apply_components(&mut self, components: HostComponents) {
        self.components = OnceLock::from(Some(components));
        self.components_explicit = true;
        self.update_url();
    }

    fn reset_components(&mut self) {
        self.components = OnceLock::new();
        self.components_explicit = false;
    }

    fn refresh_query_data(&mut self) {
        self.query_data = match &self.query {
            Some(query) => parse_query_string(query, &self.separator),
            None => QueryMap::new(),
        };
    }

    /// Rebuild the serialized form, first reassembling the host from its
    /// components when they were set explicitly.
    fn update_url(&mut self) {
        if self.components_explicit {
            if let Some(Some(components)) = self.components.get() {
                self.host = Some(components.to_host());
            }
        }

        let Some(host) = &self.host else {
            self.normalized.clear();
            return;
        };

        let mut out = format!("{}://{}", self.scheme, host);
        if let Some(port) = self.port {
            out.push_str(&format!(":{}", port));
        }
        out.push_str(&self.full_path());
        self.normalized = out;
    }

    /// Copy with the fragment removed and every component lower-cased,
    /// without touching the suffix list.
    pub(crate) fn comparison_form(&self) -> UrlValue {
        let mut copy = self.clone();
        copy.fragment = None;
        copy.scheme = copy.scheme.to_lowercase();
        copy.host = copy.host.as_ref().map(|h| h.to_lowercase());
        copy.path = copy.path.to_lowercase();
        copy.query = copy.query.as_ref().map(|q| q.to_lowercase());
        copy.reset_components();
        copy.refresh_query_data();
        copy.update_url();
        copy
    }
}

impl fmt::Display for UrlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized)
    }
}

impl PartialEq for UrlValue {
    fn eq(&self, other: &Self) -> bool {
        self.normalized == other.normalized && self.separator == other.separator
    }
}

impl FromStr for UrlValue {
    type Err = UrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UrlValue::parse(s)
    }
}

impl TryFrom<&str> for UrlValue {
    type Error = UrlError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        UrlValue::parse(value)
    }
}
