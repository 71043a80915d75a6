use std::{collections::HashMap, time::Duration};

use url::Url;
use uuid::Uuid;

use crate::{
    configuration::ScraperSettings,
    domain::{
        error::ValidationError,
        product::{assemble, ExtractionResult, ProductQuery},
        site_profile::{classify, default_profiles, SiteProfile},
    },
};

use super::{extract_fields, FetchBackend, FetchStrategy, RenderedFetcher, StaticFetcher};

/// A backend together with the time budget it gets per fetch.
pub struct Backend {
    pub fetcher: Box<dyn FetchBackend>,
    pub timeout: Duration,
}

impl Backend {
    pub fn new(fetcher: impl FetchBackend + 'static, timeout: Duration) -> Self {
        Backend {
            fetcher: Box::new(fetcher),
            timeout,
        }
    }
}

/// A query that passed validation.
#[derive(Debug)]
pub struct Target<'a> {
    /// Trimmed input, echoed back in the product record
    pub input: &'a str,
    pub url: Url,
    pub profile: &'a SiteProfile,
}

/// Classify, fetch, extract, assemble. One fetch attempt per request, no retry.
pub struct ProductScraper {
    profiles: Vec<SiteProfile>,
    default_strategy: FetchStrategy,
    site_strategies: HashMap<String, FetchStrategy>,
    static_backend: Backend,
    rendered_backend: Backend,
}

impl ProductScraper {
    pub fn new(
        profiles: Vec<SiteProfile>,
        default_strategy: FetchStrategy,
        site_strategies: HashMap<String, FetchStrategy>,
        static_backend: Backend,
        rendered_backend: Backend,
    ) -> Self {
        ProductScraper {
            profiles,
            default_strategy,
            site_strategies,
            static_backend,
            rendered_backend,
        }
    }

    pub fn from_settings(settings: &ScraperSettings) -> Result<Self, reqwest::Error> {
        let static_backend = Backend::new(
            StaticFetcher::new(&settings.static_fetch)?,
            settings.static_fetch.timeout(),
        );
        let rendered_backend = Backend::new(
            RenderedFetcher::new(&settings.rendered_fetch),
            settings.rendered_fetch.timeout(),
        );

        Ok(ProductScraper::new(
            default_profiles(),
            settings.default_strategy,
            settings.site_strategies.clone(),
            static_backend,
            rendered_backend,
        ))
    }

    pub fn strategy_for(&self, profile: &SiteProfile) -> FetchStrategy {
        self.site_strategies
            .get(profile.id)
            .copied()
            .unwrap_or(self.default_strategy)
    }

    fn backend_for(&self, profile: &SiteProfile) -> &Backend {
        match self.strategy_for(profile) {
            FetchStrategy::Static => &self.static_backend,
            FetchStrategy::Rendered => &self.rendered_backend,
        }
    }

    /// Checks the query without touching the network.
    pub fn validate<'a>(&'a self, query: &'a ProductQuery) -> Result<Target<'a>, ValidationError> {
        let raw = query
            .url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or(ValidationError::MissingUrl)?;

        let profile = classify(&self.profiles, raw)
            .ok_or_else(|| ValidationError::UnsupportedSite(raw.to_string()))?;

        let url = Url::parse(raw).map_err(|e| ValidationError::MalformedUrl {
            url: raw.to_string(),
            detail: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ValidationError::MalformedUrl {
                url: raw.to_string(),
                detail: format!("unsupported scheme {}", url.scheme()),
            });
        }

        Ok(Target {
            input: raw,
            url,
            profile,
        })
    }

    pub async fn scrape(&self, query: &ProductQuery) -> ExtractionResult {
        let request_id = Uuid::new_v4();
        let result = self.run(query, request_id).await;

        match result {
            Ok(ref product) => log::info!(
                "[{}] Scraped {} | title: {}, price: {}, image: {}",
                request_id,
                product.url,
                product.title,
                product.price,
                product.image.is_some()
            ),
            Err(ref e) => log::error!("[{}] Scraping failed: {}", request_id, e),
        }

        result
    }

    async fn run(&self, query: &ProductQuery, request_id: Uuid) -> ExtractionResult {
        let Target {
            input,
            url,
            profile,
        } = self.validate(query)?;
        let backend = self.backend_for(profile);

        log::info!(
            "[{}] Attempting to scrape {} as {} with {} fetch",
            request_id,
            url,
            profile.id,
            backend.fetcher.strategy()
        );

        let dom = backend
            .fetcher
            .fetch(url.as_str(), profile, backend.timeout)
            .await?;
        let fields = extract_fields(dom.as_ref(), profile).await;
        dom.release().await;

        log::info!(
            "[{}] Resolved fields | title: {}, price: {}, image: {}",
            request_id,
            fields.title.is_some(),
            fields.price.is_some(),
            fields.image.is_some()
        );

        assemble(fields, input)
    }
}
