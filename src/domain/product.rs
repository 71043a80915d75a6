use serde::{Deserialize, Serialize};

use super::error::ScrapeError;

pub const TITLE_SENTINEL: &str = "Title not found";
pub const PRICE_SENTINEL: &str = "Price not available";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
    pub url: Option<String>,
}

impl ProductQuery {
    pub fn new(url: impl Into<String>) -> Self {
        ProductQuery {
            url: Some(url.into()),
        }
    }
}

/// Raw field values resolved from a page. Each is trimmed and never blank.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFields {
    pub title: Option<String>,
    pub price: Option<String>,
    pub image: Option<String>,
}

impl ProductFields {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.price.is_none() && self.image.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub title: String,
    pub price: String,
    pub image: Option<String>,
    pub url: String,
}

pub type ExtractionResult = Result<Product, ScrapeError>;

/// Trims a raw value, turning blank strings into `None`.
pub fn normalize(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Applies the sentinel policy. A page with no resolvable field at all is a
/// structure mismatch, never a hollow success.
pub fn assemble(fields: ProductFields, url: &str) -> ExtractionResult {
    if fields.is_empty() {
        return Err(ScrapeError::extraction());
    }

    Ok(Product {
        title: fields.title.unwrap_or(TITLE_SENTINEL.to_string()),
        price: fields.price.unwrap_or(PRICE_SENTINEL.to_string()),
        image: fields.image,
        url: url.to_string(),
    })
}

#[derive(Serialize)]
pub struct ScrapeResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Product>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScrapeResponse {
    pub fn failure(e: &ScrapeError) -> Self {
        ScrapeResponse {
            success: false,
            data: None,
            error: Some(e.user_message().to_string()),
        }
    }
}

impl From<&ExtractionResult> for ScrapeResponse {
    fn from(value: &ExtractionResult) -> Self {
        match value {
            Ok(product) => ScrapeResponse {
                success: true,
                data: Some(product.clone()),
                error: None,
            },
            Err(e) => ScrapeResponse::failure(e),
        }
    }
}
