//! Configuration for the suffix list store.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default location of the Public Suffix List.
pub const DEFAULT_LIST_URL: &str = "https://publicsuffix.org/list/public_suffix_list.dat";

/// Default cache file name inside [`SuffixListConfig::cache_dir`].
pub const DEFAULT_CACHE_FILE: &str = "public_suffix_list.cache";

/// One week.
pub const DEFAULT_REFRESH_SECS: u64 = 7 * 24 * 60 * 60;

/// Settings controlling where the suffix list comes from and how it is cached.
///
/// Deserializable so that host applications can embed it in their own
/// configuration files; missing fields fall back to [`Default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuffixListConfig {
    /// Directory holding the cache file.
    pub cache_dir: PathBuf,
    /// Cache file name.
    pub cache_file: String,
    /// Remote list location.
    pub url: String,
    /// Maximum age of the cache file before a refetch is attempted.
    pub refresh_interval_secs: u64,
    /// Turns off all host component resolution.
    pub disabled: bool,
    /// Optional PEM bundle added to the trusted roots for the fetch.
    pub ca_bundle: Option<PathBuf>,
    pub connect_timeout_secs: u64,
    pub max_redirects: usize,
}

impl Default for SuffixListConfig {
    fn default() -> Self {
        Self {
            cache_dir: std::env::temp_dir(),
            cache_file: DEFAULT_CACHE_FILE.to_string(),
            url: DEFAULT_LIST_URL.to_string(),
            refresh_interval_secs: DEFAULT_REFRESH_SECS,
            disabled: false,
            ca_bundle: None,
            connect_timeout_secs: 10,
            max_redirects: 5,
        }
    }
}

impl SuffixListConfig {
    /// Defaults overlaid with `PSURL_*` environment variables.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `PSURL_CACHE_DIR` | `cache_dir` |
    /// | `PSURL_CACHE_FILE` | `cache_file` |
    /// | `PSURL_LIST_URL` | `url` |
    /// | `PSURL_REFRESH_SECS` | `refresh_interval_secs` |
    /// | `PSURL_DISABLED` | `disabled` (`1`/`true`/`yes`) |
    /// | `PSURL_CA_BUNDLE` | `ca_bundle` |
    ///
    /// Unparseable numeric values are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup("PSURL_CACHE_DIR").filter(|v| !v.is_empty()) {
            config.cache_dir = PathBuf::from(dir);
        }
        if let Some(file) = lookup("PSURL_CACHE_FILE").filter(|v| !v.is_empty()) {
            config.cache_file = file;
        }
        if let Some(url) = lookup("PSURL_LIST_URL").filter(|v| !v.is_empty()) {
            config.url = url;
        }
        if let Some(secs) = lookup("PSURL_REFRESH_SECS").and_then(|v| v.trim().parse().ok()) {
            config.refresh_interval_secs = secs;
        }
        if let Some(flag) = lookup("PSURL_DISABLED") {
            config.disabled = matches!(
                flag.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes"
            );
        }
        if let Some(bundle) = lookup("PSURL_CA_BUNDLE").filter(|v| !v.is_empty()) {
            config.ca_bundle = Some(PathBuf::from(bundle));
        }

        config
    }

    /// Full path of the cache file.
    pub fn cache_path(&self) -> PathBuf {
        self.cache_dir.join(&self.cache_file)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}
