//! Shared fixtures for the integration tests: a trimmed copy of the Public
//! Suffix List served by in-process fetchers, never the network.

#![allow(dead_code)]

use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use psurl::{FetchRequest, SuffixList, SuffixListConfig, UrlError, UrlValue};
use tracing_subscriber::fmt::MakeWriter;

pub const FIXTURE: &str = include_str!("../fixtures/public_suffix_list.dat");

pub fn config(dir: &Path) -> SuffixListConfig {
    SuffixListConfig {
        cache_dir: dir.to_path_buf(),
        url: "http://psl.invalid/public_suffix_list.dat".to_string(),
        ..SuffixListConfig::default()
    }
}

/// Store serving the fixture, plus a counter of fetch calls.
pub fn counting_list(config: SuffixListConfig) -> (SuffixList, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let list = SuffixList::with_fetcher(config, move |_: &FetchRequest<'_>| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok::<_, UrlError>(FIXTURE.to_string())
    });
    (list, calls)
}

pub fn failing_list(config: SuffixListConfig) -> SuffixList {
    SuffixList::with_fetcher(config, |request: &FetchRequest<'_>| {
        Err::<String, _>(UrlError::Runtime(format!("connection to {} timed out", request.url)))
    })
}

/// A loaded fixture store whose cache lives in its own temp dir.
pub fn fixture_list() -> Arc<SuffixList> {
    let dir = tempfile::tempdir().unwrap();
    let (list, _) = counting_list(config(dir.path()));
    list.load().unwrap();
    Arc::new(list)
}

pub fn parse(raw: &str) -> UrlValue {
    UrlValue::parse_with(raw, fixture_list()).unwrap()
}

/// Formatted log output collected from a scoped subscriber.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

pub struct CapturedWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CapturedWriter(self.0.clone())
    }
}

/// Run `f` with a subscriber recording every event on this thread.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, logs.contents())
}
