//! psurl - URL values with Public Suffix List aware host decomposition
//!
//! This crate parses loosely formatted URL strings into typed components,
//! splits hosts into subdomain, domain and effective TLD using the Public
//! Suffix List, and re-serializes consistently after every mutation.
//!
//! # Features
//!
//! - **Forgiving parsing**: missing schemes default to `http`, unsafe characters are percent-encoded
//! - **PSL decomposition**: longest-match rules with wildcards, exceptions and IDN labels
//! - **Cached rule list**: downloaded once, cached on disk with an integrity digest, refreshed on a schedule
//! - **Multi-value query strings**: repeated keys become lists, bracket keys become nested maps
//! - **Two equality notions**: loose URL equality and registrable-domain equality
//!
//! # Quick Start
//!
//! ```no_run
//! use psurl::UrlValue;
//!
//! let mut url = UrlValue::parse("https://shop.example.co.uk/cart?item=1&item=2#top")?;
//! assert_eq!(url.subdomain()?, Some("shop"));
//! assert_eq!(url.domain()?, Some("example"));
//! assert_eq!(url.tld()?, Some("co.uk"));
//!
//! url.set_subdomain("www")?;
//! url.strip_hash_fragment();
//! assert_eq!(url.url(), "https://www.example.co.uk/cart?item=1&item=2");
//!
//! assert!(url.compare("http://example.co.uk/cart?item=1&item=2"));
//! assert!(url.compare_root_domain("blog.example.co.uk", false));
//! # Ok::<(), psurl::UrlError>(())
//! ```
//!
//! # Suffix list
//!
//! Host decomposition uses a process-wide [`SuffixList`] configured from
//! `PSURL_*` environment variables (see [`SuffixListConfig::from_env`]).
//! Install a custom one with [`SuffixList::install_global`] before first use,
//! or bind a value to its own list with [`UrlValue::with_suffix_list`].
//!
//! # Error Handling
//!
//! Fallible operations return `Result<T, UrlError>`:
//!
//! - `InvalidArgument` for malformed URLs, components, ports and separators
//! - `TldResolution` when no suffix rule matches a host
//! - `TldDisabled` when host components are requested with the list disabled
//! - `Logic` when a host component is set before a resolvable host exists
//! - `Runtime` when the list cannot be loaded and no cached copy exists

pub use crate::config::SuffixListConfig;
pub use crate::error::UrlError;
pub use crate::psl::{FetchRequest, HttpFetcher, LoadOutcome, SuffixList, SuffixListFetcher};
pub use crate::types::{HostComponents, UrlRef};
pub use crate::url::{build_query_string, parse_query_string, QueryMap, QueryValue, UrlValue};

pub mod config;
pub mod error;
pub mod psl;
pub mod types;
pub mod url;
