//! The shared suffix list: load-or-refresh, fallback and resolution.

use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::SystemTime;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::config::SuffixListConfig;
use crate::error::UrlError;
use crate::psl::cache;
use crate::psl::fetch::{FetchRequest, HttpFetcher, SuffixListFetcher};
use crate::psl::rules::{self, RuleIndex};
use crate::types::HostComponents;

static GLOBAL: OnceLock<Arc<SuffixList>> = OnceLock::new();

/// Which path a [`SuffixList::load`] call took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A fresh cache file was read; no network access happened.
    CacheHit,
    /// The list was downloaded and the cache rewritten.
    Fetched,
    /// The download failed and the rules already in memory were kept.
    FallbackInMemory,
    /// The download failed and a stale cache file was used instead.
    FallbackDisk,
}

/// Public Suffix List store.
///
/// Rules are loaded lazily on the first resolution and then stay resident.
/// Loading is serialized by a mutex so concurrent first callers trigger a
/// single download and a single cache write; afterwards lookups only clone
/// the `Arc` of the current index.
pub struct SuffixList {
    config: SuffixListConfig,
    fetcher: Box<dyn SuffixListFetcher>,
    rules: RwLock<Option<Arc<RuleIndex>>>,
    loaded_at: RwLock<Option<SystemTime>>,
    load_lock: Mutex<()>,
}

impl fmt::Debug for SuffixList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuffixList")
            .field("config", &self.config)
            .field("loaded", &self.is_loaded())
            .field("loaded_at", &self.loaded_at())
            .finish()
    }
}

impl SuffixList {
    /// Store that downloads over HTTP.
    pub fn new(config: SuffixListConfig) -> Self {
        Self::with_fetcher(config, HttpFetcher)
    }

    /// Store using a caller-supplied transport.
    pub fn with_fetcher(config: SuffixListConfig, fetcher: impl SuffixListFetcher + 'static) -> Self {
        Self {
            config,
            fetcher: Box::new(fetcher),
            rules: RwLock::new(None),
            loaded_at: RwLock::new(None),
            load_lock: Mutex::new(()),
        }
    }

    /// The process-wide store, configured from the environment on first use
    /// unless [`SuffixList::install_global`] ran before.
    pub fn global() -> Arc<SuffixList> {
        GLOBAL
            .get_or_init(|| Arc::new(SuffixList::new(SuffixListConfig::from_env())))
            .clone()
    }

    /// Install `list` as the process-wide store. Fails once a global store exists.
    pub fn install_global(list: SuffixList) -> Result<Arc<SuffixList>, UrlError> {
        let list = Arc::new(list);
        GLOBAL
            .set(list.clone())
            .map_err(|_| UrlError::Logic("global suffix list is already initialized".to_string()))?;
        Ok(list)
    }

    pub fn config(&self) -> &SuffixListConfig {
        &self.config
    }

    pub fn is_disabled(&self) -> bool {
        self.config.disabled
    }

    pub fn is_loaded(&self) -> bool {
        self.rules.read().is_some()
    }

    /// Time of the last successful cache write (or of the cache file read).
    pub fn loaded_at(&self) -> Option<SystemTime> {
        *self.loaded_at.read()
    }

    /// Run a full load-or-refresh cycle.
    pub fn load(&self) -> Result<LoadOutcome, UrlError> {
        let _guard = self.load_lock.lock();
        self.load_locked()
    }

    /// Current rule index, loading it first if nothing is resident yet.
    pub fn ensure_loaded(&self) -> Result<Arc<RuleIndex>, UrlError> {
        if let Some(rules) = self.rules.read().clone() {
            return Ok(rules);
        }

        let _guard = self.load_lock.lock();
        // another caller may have finished loading while we waited
        if let Some(rules) = self.rules.read().clone() {
            return Ok(rules);
        }
        self.load_locked()?;

        self.rules
            .read()
            .clone()
            .ok_or_else(|| UrlError::Runtime("suffix list is not loaded".to_string()))
    }

    fn load_locked(&self) -> Result<LoadOutcome, UrlError> {
        let path = self.config.cache_path();

        if cache::is_fresh(&path, self.config.refresh_interval()) {
            if let Some(index) = cache::read(&path) {
                debug!(path = %path.display(), rules = index.len(), "Loaded suffix list from cache");
                self.install(index, cache::modified(&path));
                return Ok(LoadOutcome::CacheHit);
            }
        }

        let request = FetchRequest {
            url: &self.config.url,
            connect_timeout: self.config.connect_timeout(),
            max_redirects: self.config.max_redirects,
            ca_bundle: self.config.ca_bundle.as_deref(),
        };

        let fetched = self.fetcher.fetch(&request).and_then(|body| {
            let index = RuleIndex::parse(&body);
            if index.is_empty() {
                Err(UrlError::Runtime(format!("no suffix rules found at {}", self.config.url)))
            } else {
                Ok(index)
            }
        });

        match fetched {
            Ok(index) => {
                debug!(url = %self.config.url, rules = index.len(), "Fetched suffix list");
                let written = match cache::write(&path, &index) {
                    Ok(()) => Some(SystemTime::now()),
                    Err(err) => {
                        warn!(path = %path.display(), error = %err, "Failed to write suffix list cache");
                        None
                    }
                };
                self.install(index, written);
                Ok(LoadOutcome::Fetched)
            }
            Err(err) => self.fall_back(err),
        }
    }

    fn fall_back(&self, err: UrlError) -> Result<LoadOutcome, UrlError> {
        if self.is_loaded() {
            warn!(url = %self.config.url, error = %err, "Suffix list refresh failed, keeping rules in memory");
            return Ok(LoadOutcome::FallbackInMemory);
        }

        let path = self.config.cache_path();
        if let Some(index) = cache::read(&path) {
            warn!(
                url = %self.config.url,
                path = %path.display(),
                error = %err,
                "Suffix list fetch failed, using stale cache"
            );
            self.install(index, cache::modified(&path));
            return Ok(LoadOutcome::FallbackDisk);
        }

        Err(UrlError::Runtime(format!(
            "cannot load public suffix list and no cache exists: {}",
            err
        )))
    }

    fn install(&self, index: RuleIndex, loaded_at: Option<SystemTime>) {
        *self.rules.write() = Some(Arc::new(index));
        if loaded_at.is_some() {
            *self.loaded_at.write() = loaded_at;
        }
    }

    /// Number of trailing labels of `host` forming its effective TLD.
    pub fn matching_tld_length(&self, host: &str) -> Result<usize, UrlError> {
        if self.is_disabled() {
            return Err(UrlError::TldDisabled);
        }
        self.ensure_loaded()?.matching_tld_length(host)
    }

    /// Split `host` into subdomain, domain and TLD.
    pub fn resolve(&self, host: &str) -> Result<HostComponents, UrlError> {
        let length = self.matching_tld_length(host)?;
        rules::decompose(host, length)
    }

    /// Delete the cache file. Rules already in memory stay resident.
    pub fn clear_cache(&self) -> Result<(), UrlError> {
        let _guard = self.load_lock.lock();
        cache::remove(&self.config.cache_path())
    }
}
