use actix_web::http::StatusCode;
use thiserror::Error;

pub const EXTRACTION_FAILURE_REASON: &str = "structure mismatch or invalid page";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("url is missing or blank")]
    MissingUrl,
    #[error("no site profile matches url: {0}")]
    UnsupportedSite(String),
    #[error("url {url} is not a valid http(s) url: {detail}")]
    MalformedUrl { url: String, detail: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("fetch timed out: {0}")]
    Timeout(String),
    #[error("network failure: {0}")]
    NetworkFailure(String),
    #[error("blocked by target site: {0}")]
    Blocked(String),
}

/// Closed set of failures a scrape can end in, whichever backend ran.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScrapeError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),
    #[error("extraction error: {0}")]
    Extraction(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for ScrapeError {
    fn from(value: anyhow::Error) -> Self {
        ScrapeError::Internal(format!("{:#}", value))
    }
}

impl ScrapeError {
    pub fn extraction() -> Self {
        ScrapeError::Extraction(EXTRACTION_FAILURE_REASON.to_string())
    }

    /// Stable message safe to hand to callers. Never includes internal detail.
    pub fn user_message(&self) -> &'static str {
        match self {
            ScrapeError::Validation(ValidationError::MissingUrl) => "URL is required",
            ScrapeError::Validation(ValidationError::UnsupportedSite(_)) => {
                "Please provide a valid Amazon or Flipkart product URL"
            }
            ScrapeError::Validation(ValidationError::MalformedUrl { .. }) => {
                "The provided URL is not a valid http(s) URL"
            }
            ScrapeError::Fetch(FetchError::Timeout(_)) => {
                "Request timeout. The website might be blocking the request."
            }
            ScrapeError::Fetch(FetchError::NetworkFailure(_)) => {
                "Failed to fetch the product page."
            }
            ScrapeError::Fetch(FetchError::Blocked(_)) => {
                "The website blocked the request. Please try again later."
            }
            ScrapeError::Extraction(_) => {
                "Could not extract product data. The page structure might have changed or the URL is invalid."
            }
            ScrapeError::Internal(_) => "An unexpected error occurred while extracting the product.",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ScrapeError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ScrapeError::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;

    use super::{FetchError, ScrapeError, ValidationError};

    #[test]
    fn validation_errors_are_bad_requests() {
        let err: ScrapeError = ValidationError::MissingUrl.into();

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.user_message(), "URL is required");
    }

    #[test]
    fn execution_errors_are_server_errors() {
        let errors: Vec<ScrapeError> = vec![
            FetchError::Timeout("15s".into()).into(),
            FetchError::NetworkFailure("refused".into()).into(),
            FetchError::Blocked("403".into()).into(),
            ScrapeError::extraction(),
            ScrapeError::Internal("boom".into()),
        ];

        for err in errors {
            assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn user_message_hides_internal_detail() {
        let err = ScrapeError::Internal("thirtyfour: session not created at 0x7ffe".into());

        assert!(!err.user_message().contains("thirtyfour"));
        assert!(err.to_string().contains("thirtyfour"));
    }

    #[test]
    fn extraction_failure_mentions_structure() {
        let err = ScrapeError::extraction();

        assert!(err.user_message().contains("structure"));
        assert!(err.to_string().contains("structure"));
    }

    #[test]
    fn anyhow_errors_become_internal() {
        let err: ScrapeError = anyhow::anyhow!("unexpected").into();

        assert!(matches!(err, ScrapeError::Internal(_)));
    }
}
