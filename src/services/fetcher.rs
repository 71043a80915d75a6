use std::{fmt, time::Duration};

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::{error::ScrapeError, site_profile::SiteProfile};

/// Markers of anti-bot interstitials served with a 200 status.
const BLOCK_PAGE_MARKERS: [&str; 3] = [
    "/errors/validateCaptcha",
    "Type the characters you see in this image",
    "api-services-support@amazon.com",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStrategy {
    #[default]
    Static,
    Rendered,
}

impl fmt::Display for FetchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchStrategy::Static => write!(f, "static"),
            FetchStrategy::Rendered => write!(f, "rendered"),
        }
    }
}

/// Queryable page owned by a single request.
///
/// Lookups never fail: anything that goes wrong while querying is reported as
/// `None` so extraction can move on to the next selector.
#[async_trait(?Send)]
pub trait DomHandle {
    /// Text of the first element matching `css`.
    async fn text(&self, css: &str) -> Option<String>;

    /// Attribute `attr` of the first element matching `css`.
    async fn attr(&self, css: &str, attr: &str) -> Option<String>;

    /// Frees whatever backs the handle. Must be awaited before the request
    /// completes.
    async fn release(self: Box<Self>);
}

/// Produces a [`DomHandle`] for a url. Both backends honour the same
/// contract so nothing downstream knows which one ran.
#[async_trait(?Send)]
pub trait FetchBackend: Send + Sync {
    fn strategy(&self) -> FetchStrategy;

    async fn fetch(
        &self,
        url: &str,
        profile: &SiteProfile,
        timeout: Duration,
    ) -> Result<Box<dyn DomHandle>, ScrapeError>;
}

pub fn looks_blocked(page_source: &str) -> bool {
    BLOCK_PAGE_MARKERS
        .iter()
        .any(|marker| page_source.contains(marker))
}
