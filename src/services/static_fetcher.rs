use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::{ACCEPT, ACCEPT_LANGUAGE, REFERER, USER_AGENT},
    StatusCode,
};
use scraper::{ElementRef, Html, Selector};

use crate::{
    configuration::StaticFetchSettings,
    domain::{
        error::{FetchError, ScrapeError},
        site_profile::SiteProfile,
    },
};

use super::{looks_blocked, DomHandle, FetchBackend, FetchStrategy};

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const ACCEPT_LANGUAGE_EN: &str = "en-US,en;q=0.9";

/// Single GET plus an in-process parse. No scripts are executed.
pub struct StaticFetcher {
    client: reqwest::Client,
    user_agent: String,
    rotate_user_agent: bool,
}

impl StaticFetcher {
    pub fn new(settings: &StaticFetchSettings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().gzip(true).brotli(true).build()?;

        Ok(StaticFetcher {
            client,
            user_agent: settings.user_agent.clone(),
            rotate_user_agent: settings.rotate_user_agent,
        })
    }

    fn user_agent(&self) -> &str {
        match self.rotate_user_agent {
            true => fake_user_agent::get_rua(),
            false => self.user_agent.as_str(),
        }
    }
}

#[async_trait(?Send)]
impl FetchBackend for StaticFetcher {
    fn strategy(&self) -> FetchStrategy {
        FetchStrategy::Static
    }

    async fn fetch(
        &self,
        url: &str,
        profile: &SiteProfile,
        timeout: Duration,
    ) -> Result<Box<dyn DomHandle>, ScrapeError> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, self.user_agent())
            .header(ACCEPT, ACCEPT_HTML)
            .header(ACCEPT_LANGUAGE, ACCEPT_LANGUAGE_EN)
            .header(REFERER, profile.referer)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_request_error(e, timeout))?;

        let status = response.status();
        match status {
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS | StatusCode::SERVICE_UNAVAILABLE => {
                return Err(FetchError::Blocked(format!("{} answered {}", url, status)).into());
            }
            s if !s.is_success() => {
                return Err(FetchError::NetworkFailure(format!("{} answered {}", url, status)).into());
            }
            _ => {}
        }

        let page_source = response
            .text()
            .await
            .map_err(|e| classify_request_error(e, timeout))?;

        if looks_blocked(&page_source) {
            return Err(FetchError::Blocked(format!("{} served an anti-bot page", url)).into());
        }

        log::debug!("Fetched {} bytes from {}", page_source.len(), url);

        Ok(Box::new(StaticDom::parse(&page_source)))
    }
}

fn classify_request_error(e: reqwest::Error, timeout: Duration) -> FetchError {
    match e.is_timeout() {
        true => FetchError::Timeout(format!("no response within {:?}", timeout)),
        false => FetchError::NetworkFailure(e.to_string()),
    }
}

/// Parsed html document.
pub struct StaticDom {
    document: Html,
}

impl StaticDom {
    pub fn parse(page_source: &str) -> Self {
        StaticDom {
            document: Html::parse_document(page_source),
        }
    }

    fn first(&self, css: &str) -> Option<ElementRef<'_>> {
        let selector = match Selector::parse(css) {
            Ok(selector) => selector,
            Err(e) => {
                log::warn!("Skipping unparseable selector {}: {:?}", css, e);
                return None;
            }
        };

        self.document.select(&selector).next()
    }
}

#[async_trait(?Send)]
impl DomHandle for StaticDom {
    async fn text(&self, css: &str) -> Option<String> {
        self.first(css).map(|element| element.text().collect())
    }

    async fn attr(&self, css: &str, attr: &str) -> Option<String> {
        self.first(css)
            .and_then(|element| element.value().attr(attr))
            .map(|value| value.to_string())
    }

    async fn release(self: Box<Self>) {}
}
