use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use thirtyfour::{
    By, CapabilitiesHelper, ChromiumLikeCapabilities, DesiredCapabilities, PageLoadStrategy,
    WebDriver,
};
use tokio::time::Instant;

use crate::{
    configuration::RenderedFetchSettings,
    domain::{
        error::{FetchError, ScrapeError},
        site_profile::SiteProfile,
    },
};

use super::{looks_blocked, DomHandle, FetchBackend, FetchStrategy};

/// Drives a fresh browser session per request through a WebDriver endpoint
/// (chromedriver, selenium). The session lives inside the returned
/// [`RenderedDom`] and is quit when that handle is released or dropped.
pub struct RenderedFetcher {
    settings: RenderedFetchSettings,
}

impl RenderedFetcher {
    pub fn new(settings: &RenderedFetchSettings) -> Self {
        RenderedFetcher {
            settings: settings.clone(),
        }
    }

    async fn start_session(&self) -> anyhow::Result<WebDriver> {
        let mut caps = DesiredCapabilities::chrome();
        if self.settings.headless {
            caps.set_headless()?;
        }
        for arg in chrome_args(&self.settings) {
            caps.add_arg(&arg)?;
        }
        caps.set_page_load_strategy(PageLoadStrategy::Eager)?;

        WebDriver::new(&self.settings.webdriver_url, caps)
            .await
            .with_context(|| format!("Failed to open session on {}", self.settings.webdriver_url))
    }
}

/// Browser flags besides headless mode.
fn chrome_args(settings: &RenderedFetchSettings) -> Vec<String> {
    let mut args = vec![
        "--disable-dev-shm-usage".to_string(),
        format!("--user-agent={}", settings.user_agent),
        format!(
            "--window-size={},{}",
            settings.viewport_width, settings.viewport_height
        ),
    ];
    if !settings.sandbox {
        args.push("--no-sandbox".to_string());
    }
    args
}

#[async_trait(?Send)]
impl FetchBackend for RenderedFetcher {
    fn strategy(&self) -> FetchStrategy {
        FetchStrategy::Rendered
    }

    /// The whole call, session start included, runs within `timeout`.
    async fn fetch(
        &self,
        url: &str,
        _profile: &SiteProfile,
        timeout: Duration,
    ) -> Result<Box<dyn DomHandle>, ScrapeError> {
        let deadline = Instant::now() + timeout;

        let driver = match tokio::time::timeout(timeout, self.start_session()).await {
            Ok(driver) => driver?,
            Err(_) => {
                return Err(FetchError::Timeout(format!(
                    "no browser session from {} within {:?}",
                    self.settings.webdriver_url, timeout
                ))
                .into())
            }
        };
        let dom = RenderedDom::new(driver, self.settings.query_timeout());

        let remaining = deadline.saturating_duration_since(Instant::now());
        let navigated = dom.navigate(url, remaining, self.settings.settle()).await;
        match navigated {
            Ok(()) => Ok(Box::new(dom)),
            Err(e) => {
                Box::new(dom).release().await;
                Err(e.into())
            }
        }
    }
}

/// Live page inside a browser session.
pub struct RenderedDom {
    driver: Option<WebDriver>,
    query_timeout: Duration,
}

impl RenderedDom {
    fn new(driver: WebDriver, query_timeout: Duration) -> Self {
        RenderedDom {
            driver: Some(driver),
            query_timeout,
        }
    }

    fn driver(&self) -> Option<&WebDriver> {
        self.driver.as_ref()
    }

    async fn navigate(&self, url: &str, timeout: Duration, settle: Duration) -> Result<(), FetchError> {
        let Some(driver) = self.driver() else {
            return Err(FetchError::NetworkFailure("session already released".to_string()));
        };

        let loaded = tokio::time::timeout(timeout, async {
            driver.set_page_load_timeout(timeout).await?;
            driver.goto(url).await
        })
        .await;

        match loaded {
            Err(_) => {
                return Err(FetchError::Timeout(format!(
                    "{} did not reach DOMContentLoaded within {:?}",
                    url, timeout
                )))
            }
            Ok(Err(e)) if e.to_string().to_lowercase().contains("timeout") => {
                return Err(FetchError::Timeout(e.to_string()))
            }
            Ok(Err(e)) => return Err(FetchError::NetworkFailure(e.to_string())),
            Ok(Ok(())) => {}
        }

        tokio::time::sleep(settle).await;

        if let Ok(Ok(page_source)) = tokio::time::timeout(self.query_timeout, driver.source()).await {
            if looks_blocked(&page_source) {
                return Err(FetchError::Blocked(format!("{} served an anti-bot page", url)));
            }
        }

        Ok(())
    }
}

#[async_trait(?Send)]
impl DomHandle for RenderedDom {
    /// `textContent` of the first match, so visually hidden nodes such as
    /// `.a-offscreen` prices still read.
    async fn text(&self, css: &str) -> Option<String> {
        let driver = self.driver()?;
        tokio::time::timeout(self.query_timeout, async {
            let element = driver.find(By::Css(css)).await.ok()?;
            element.prop("textContent").await.ok().flatten()
        })
        .await
        .ok()
        .flatten()
    }

    async fn attr(&self, css: &str, attr: &str) -> Option<String> {
        let driver = self.driver()?;
        tokio::time::timeout(self.query_timeout, async {
            let element = driver.find(By::Css(css)).await.ok()?;
            element.attr(attr).await.ok().flatten()
        })
        .await
        .ok()
        .flatten()
    }

    async fn release(self: Box<Self>) {
        let mut dom = self;
        if let Some(driver) = dom.driver.take() {
            match driver.quit().await {
                Ok(()) => log::debug!("Browser session closed"),
                Err(e) => log::error!("Failed to quit browser session: {:?}", e),
            }
        }
    }
}

impl Drop for RenderedDom {
    fn drop(&mut self) {
        let Some(driver) = self.driver.take() else {
            return;
        };

        log::warn!("Browser session dropped without release, quitting in background");
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = driver.quit().await {
                        log::error!("Failed to quit dropped browser session: {:?}", e);
                    }
                });
            }
            Err(_) => log::error!("No runtime available to quit dropped browser session"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::chrome_args;
    use crate::configuration::RenderedFetchSettings;

    fn settings(sandbox: bool) -> RenderedFetchSettings {
        RenderedFetchSettings {
            webdriver_url: "http://localhost:9515".to_string(),
            timeout_secs: 30,
            settle_millis: 2000,
            viewport_width: 1920,
            viewport_height: 1080,
            headless: true,
            sandbox,
            query_timeout_millis: 2000,
            user_agent: "pricepeek".to_string(),
        }
    }

    #[test]
    fn sandbox_stays_on_unless_disabled() {
        let args = chrome_args(&settings(true));

        assert!(!args.iter().any(|arg| arg == "--no-sandbox"));
        assert!(args.contains(&"--window-size=1920,1080".to_string()));
        assert!(args.contains(&"--user-agent=pricepeek".to_string()));
    }

    #[test]
    fn disabling_sandbox_passes_no_sandbox() {
        let args = chrome_args(&settings(false));

        assert!(args.iter().any(|arg| arg == "--no-sandbox"));
    }
}
