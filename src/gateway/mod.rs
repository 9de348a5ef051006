//! Access to the monitor backend.
//!
//! [`FetchGateway`] is the only way the stream engine talks to the network.
//! It builds query parameters and performs exactly one request per call; it
//! never retries. Retry policy belongs to the scheduler.

pub mod http;
pub mod worker;

pub use http::HttpGateway;
pub use worker::{Completion, FetchWorker, Job, WorkerStopped};

use crate::model::{FetchError, LinkInfo, LinkKey, LinkSummary, LogRecord, Sn};
use crate::stream::FilterState;

/// Hard upper bound on `limit` for a `before` query.
pub const MAX_BEFORE_LIMIT: u32 = 100;

/// Which slice of the log one request retrieves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSpec {
    /// Most recent page, newest first.
    Initial,
    /// Records with `sn < boundary`, newest first, at most `limit`.
    Before {
        /// Exclusive upper bound.
        boundary: Sn,
        /// Requested page size, capped at [`MAX_BEFORE_LIMIT`].
        limit: u32,
    },
    /// Records with `sn > boundary`, oldest first.
    After {
        /// Exclusive lower bound.
        boundary: Sn,
    },
}

impl PageSpec {
    /// Short mode name for logs.
    pub fn mode(&self) -> &'static str {
        match self {
            PageSpec::Initial => "initial",
            PageSpec::Before { .. } => "before",
            PageSpec::After { .. } => "after",
        }
    }
}

/// Query parameters for `GET /events`.
///
/// Filter parameters are only present when they differ from the server
/// default. `limit` accompanies `before` and nothing else.
pub fn event_query(filter: &FilterState, page: PageSpec) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(events) = filter.events_param() {
        params.push(("events", events));
    }
    if let Some(link) = filter.link() {
        params.push(("src", link.src().to_string()));
        params.push(("dst", link.dst().to_string()));
    }
    match page {
        PageSpec::Initial => {}
        PageSpec::Before { boundary, limit } => {
            params.push(("before", boundary.to_string()));
            params.push(("limit", limit.min(MAX_BEFORE_LIMIT).to_string()));
        }
        PageSpec::After { boundary } => {
            params.push(("after", boundary.to_string()));
        }
    }
    params
}

/// One-shot backend calls.
///
/// Implementations must not retry and must return records in the order the
/// server sent them (descending for `Initial`/`Before`, ascending for `After`).
pub trait FetchGateway {
    /// Retrieve one page of the event log.
    fn fetch_events(&self, filter: &FilterState, page: PageSpec)
        -> Result<Vec<LogRecord>, FetchError>;

    /// List connected links (`GET /links`).
    fn fetch_links(&self) -> Result<Vec<LinkSummary>, FetchError>;

    /// Status snapshot of one link direction (`GET /links/{src}/{dst}`).
    fn fetch_link_info(&self, link: &LinkKey) -> Result<LinkInfo, FetchError>;

    /// Backend version string (`GET /version`).
    fn fetch_version(&self) -> Result<String, FetchError>;
}

impl<G: FetchGateway + ?Sized> FetchGateway for Box<G> {
    fn fetch_events(
        &self,
        filter: &FilterState,
        page: PageSpec,
    ) -> Result<Vec<LogRecord>, FetchError> {
        (**self).fetch_events(filter, page)
    }

    fn fetch_links(&self) -> Result<Vec<LinkSummary>, FetchError> {
        (**self).fetch_links()
    }

    fn fetch_link_info(&self, link: &LinkKey) -> Result<LinkInfo, FetchError> {
        (**self).fetch_link_info(link)
    }

    fn fetch_version(&self) -> Result<String, FetchError> {
        (**self).fetch_version()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EventKind;

    fn render(params: &[(&'static str, String)]) -> String {
        params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }

    #[test]
    fn default_filter_initial_has_no_params() {
        let params = event_query(&FilterState::default(), PageSpec::Initial);
        assert!(params.is_empty());
    }

    #[test]
    fn before_carries_limit() {
        let page = PageSpec::Before {
            boundary: Sn::new(98),
            limit: 97,
        };
        let params = event_query(&FilterState::default(), page);
        insta::assert_snapshot!(render(&params), @"before=98&limit=97");
    }

    #[test]
    fn before_limit_is_capped() {
        let page = PageSpec::Before {
            boundary: Sn::new(1000),
            limit: 250,
        };
        let params = event_query(&FilterState::default(), page);
        assert!(params.contains(&("limit", "100".to_string())));
    }

    #[test]
    fn after_has_no_limit() {
        let page = PageSpec::After {
            boundary: Sn::new(100),
        };
        let params = event_query(&FilterState::default(), page);
        insta::assert_snapshot!(render(&params), @"after=100");
    }

    #[test]
    fn filter_params_precede_range_params() {
        let filter = FilterState::default()
            .with_event_toggled(EventKind::Tx)
            .with_event_toggled(EventKind::Rx)
            .with_link(Some(LinkKey::new("0x7.icon", "0x1.eth").unwrap()));
        let page = PageSpec::After {
            boundary: Sn::new(5),
        };
        let params = event_query(&filter, page);
        insta::assert_snapshot!(
            render(&params),
            @"events=tx,rx&src=0x7.icon&dst=0x1.eth&after=5"
        );
    }

    #[test]
    fn page_mode_names() {
        assert_eq!(PageSpec::Initial.mode(), "initial");
        assert_eq!(
            PageSpec::After {
                boundary: Sn::new(1)
            }
            .mode(),
            "after"
        );
    }
}
