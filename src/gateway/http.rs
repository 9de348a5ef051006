//! HTTP implementation of [`FetchGateway`] on `reqwest`'s blocking client.

use super::{event_query, FetchGateway, PageSpec};
use crate::model::{FetchError, LinkInfo, LinkKey, LinkSummary, LogRecord};
use crate::stream::FilterState;
use reqwest::blocking::Client;
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::trace;

/// Gateway talking to a live monitor backend.
///
/// Every call is a single GET with the configured timeout. The client is
/// blocking; run it off the UI thread (see [`super::FetchWorker`]).
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: Url,
}

impl HttpGateway {
    /// Create a gateway for `base_url` (e.g. `http://localhost:8000`).
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidUrl` if the URL does not parse, is not
    /// `http`/`https`, or the HTTP client cannot be constructed.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let invalid = |reason: String| FetchError::InvalidUrl {
            url: base_url.to_string(),
            reason,
        };

        let parsed = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
        }
        if parsed.cannot_be_a_base() {
            return Err(invalid("URL cannot be used as a base".to_string()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build `{base}/{segments...}?{params}`.
    ///
    /// Segments are percent-encoded; a trailing slash on the base is tolerated.
    pub fn endpoint(&self, segments: &[&str], params: &[(&'static str, String)]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base was rejected in `new`, so path segments are always available
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        if !params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(params.iter().map(|(key, value)| (*key, value.as_str())));
        }
        url
    }

    fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        let url_text = url.to_string();
        trace!(url = %url_text, "GET");

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError::Transport {
                url: url_text.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url_text,
                status: status.as_u16(),
            });
        }

        let body = response.text().map_err(|e| FetchError::Transport {
            url: url_text.clone(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&body).map_err(|e| FetchError::Decode {
            url: url_text,
            reason: e.to_string(),
        })
    }
}

impl FetchGateway for HttpGateway {
    fn fetch_events(
        &self,
        filter: &FilterState,
        page: PageSpec,
    ) -> Result<Vec<LogRecord>, FetchError> {
        let url = self.endpoint(&["events"], &event_query(filter, page));
        self.get_json(url)
    }

    fn fetch_links(&self) -> Result<Vec<LinkSummary>, FetchError> {
        self.get_json(self.endpoint(&["links"], &[]))
    }

    fn fetch_link_info(&self, link: &LinkKey) -> Result<LinkInfo, FetchError> {
        self.get_json(self.endpoint(&["links", link.src(), link.dst()], &[]))
    }

    fn fetch_version(&self) -> Result<String, FetchError> {
        self.get_json(self.endpoint(&["version"], &[]))
    }
}
