//! Transport used to download the suffix list.

use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::redirect::Policy;

use crate::error::UrlError;

/// Parameters of a single list download.
#[derive(Debug, Clone)]
pub struct FetchRequest<'a> {
    pub url: &'a str,
    pub connect_timeout: Duration,
    pub max_redirects: usize,
    pub ca_bundle: Option<&'a Path>,
}

/// Anything able to return the list body for a request.
///
/// Closures with the matching signature implement it, which keeps tests and
/// embedding applications free to supply their own transport.
pub trait SuffixListFetcher: Send + Sync {
    fn fetch(&self, request: &FetchRequest<'_>) -> Result<String, UrlError>;
}

impl<F> SuffixListFetcher for F
where
    F: Fn(&FetchRequest<'_>) -> Result<String, UrlError> + Send + Sync,
{
    fn fetch(&self, request: &FetchRequest<'_>) -> Result<String, UrlError> {
        self(request)
    }
}

/// Blocking HTTP(S) fetcher.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpFetcher;

impl HttpFetcher {
    fn client(request: &FetchRequest<'_>) -> Result<Client, UrlError> {
        let mut builder = Client::builder()
            .connect_timeout(request.connect_timeout)
            .redirect(Policy::limited(request.max_redirects));

        if let Some(bundle) = request.ca_bundle {
            let pem = std::fs::read(bundle).map_err(|err| {
                UrlError::Runtime(format!("cannot read CA bundle {}: {}", bundle.display(), err))
            })?;
            let cert = reqwest::Certificate::from_pem(&pem)
                .map_err(|err| UrlError::Runtime(format!("invalid CA bundle: {}", err)))?;
            builder = builder.add_root_certificate(cert);
        }

        builder
            .build()
            .map_err(|err| UrlError::Runtime(format!("cannot build HTTP client: {}", err)))
    }
}

impl SuffixListFetcher for HttpFetcher {
    fn fetch(&self, request: &FetchRequest<'_>) -> Result<String, UrlError> {
        let client = Self::client(request)?;

        let response = client
            .get(request.url)
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|err| UrlError::Runtime(format!("suffix list fetch failed: {}", err)))?;

        response
            .text()
            .map_err(|err| UrlError::Runtime(format!("suffix list body unreadable: {}", err)))
    }
}
