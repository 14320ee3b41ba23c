/// IP-100 status endpoint client.
///
/// One blocking GET per poll against the station's `status.xml`. Every way
/// the request can fail collapses into a single `FetchError` so the poll
/// loop can treat them all as retry-eligible.

use crate::model::FetchError;
use log::debug;

const LOG_TARGET: &str = "ip100::fetch";

/// Something that can hand back the raw status document.
///
/// The driver owns one of these; tests substitute a scripted source.
pub trait StationSource {
    /// Where the document comes from, for log lines.
    fn url(&self) -> &str;

    /// Retrieves the raw document body.
    fn fetch(&self) -> Result<Vec<u8>, FetchError>;
}

impl<S: StationSource + ?Sized> StationSource for &S {
    fn url(&self) -> &str {
        (**self).url()
    }

    fn fetch(&self) -> Result<Vec<u8>, FetchError> {
        (**self).fetch()
    }
}

/// Station reached over plain HTTP.
pub struct HttpStation {
    client: reqwest::blocking::Client,
    url: String,
}

impl HttpStation {
    /// Uses the client's default timeout and redirect policy.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            url: url.into(),
        }
    }
}

impl StationSource for HttpStation {
    fn url(&self) -> &str {
        &self.url
    }

    fn fetch(&self) -> Result<Vec<u8>, FetchError> {
        get_data(&self.client, &self.url)
    }
}

/// Fetches the raw body at `url`.
///
/// # Errors
/// `FetchError` for connection, DNS, timeout and body-read failures, and for
/// any non-2xx response status.
pub fn get_data(client: &reqwest::blocking::Client, url: &str) -> Result<Vec<u8>, FetchError> {
    debug!(target: LOG_TARGET, "GET {}", url);

    let response = client
        .get(url)
        .send()
        .map_err(|e| FetchError::new(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::new(format!("HTTP {} from {}", status, url)));
    }

    let body = response
        .bytes()
        .map_err(|e| FetchError::new(format!("reading body from {}: {}", url, e)))?;

    debug!(target: LOG_TARGET, "received {} bytes", body.len());
    Ok(body.to_vec())
}
