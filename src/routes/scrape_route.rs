use actix_web::{error, http::StatusCode, post, web, HttpRequest, HttpResponse};

use crate::{
    domain::{
        error::{ScrapeError, ValidationError},
        product::{ProductQuery, ScrapeResponse},
    },
    services::ProductScraper,
};

#[post("/scrape")]
async fn scrape(body: web::Json<ProductQuery>, scraper: web::Data<ProductScraper>) -> HttpResponse {
    log::info!("Received scrape request for {:?}", body.url);

    let result = scraper.scrape(&body).await;
    let status = match result {
        Ok(_) => StatusCode::OK,
        Err(ref e) => e.status_code(),
    };

    HttpResponse::build(status).json(ScrapeResponse::from(&result))
}

/// An unreadable body carries no url, so it gets the same answer as a
/// missing one.
pub fn json_error_handler(err: error::JsonPayloadError, _req: &HttpRequest) -> error::Error {
    log::warn!("Rejected scrape body: {}", err);

    let e = ScrapeError::from(ValidationError::MissingUrl);
    let response = HttpResponse::build(e.status_code()).json(ScrapeResponse::failure(&e));

    error::InternalError::from_response(err, response).into()
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, time::Duration};

    use actix_web::{http::StatusCode, test, web, App};
    use serde_json::{json, Value};

    use super::{json_error_handler, scrape};
    use crate::{
        configuration::{RenderedFetchSettings, StaticFetchSettings},
        domain::site_profile::default_profiles,
        services::{Backend, FetchStrategy, ProductScraper, RenderedFetcher, StaticFetcher},
    };

    // Points at ports nothing listens on; validation must answer before any
    // of them is used.
    fn offline_scraper() -> ProductScraper {
        let static_settings = StaticFetchSettings {
            timeout_secs: 1,
            user_agent: "pricepeek-test".to_string(),
            rotate_user_agent: false,
        };
        let rendered_settings = RenderedFetchSettings {
            webdriver_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
            settle_millis: 0,
            viewport_width: 1280,
            viewport_height: 720,
            headless: true,
            sandbox: true,
            query_timeout_millis: 500,
            user_agent: "pricepeek-test".to_string(),
        };

        ProductScraper::new(
            default_profiles(),
            FetchStrategy::Static,
            HashMap::new(),
            Backend::new(
                StaticFetcher::new(&static_settings).unwrap(),
                Duration::from_secs(1),
            ),
            Backend::new(RenderedFetcher::new(&rendered_settings), Duration::from_secs(1)),
        )
    }

    async fn post(body: Value) -> (StatusCode, Value) {
        let app = test::init_service(
            App::new()
                .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                .app_data(web::Data::new(offline_scraper()))
                .service(web::scope("/api").service(scrape)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/scrape")
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        let status = resp.status();

        (status, test::read_body_json(resp).await)
    }

    #[actix_web::test]
    async fn missing_url_is_bad_request() {
        let (status, body) = post(json!({})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "success": false, "error": "URL is required" }));
    }

    #[actix_web::test]
    async fn unsupported_site_is_bad_request() {
        let (status, body) = post(json!({ "url": "https://www.ebay.com/itm/1" })).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "Please provide a valid Amazon or Flipkart product URL"
        );
    }

    #[actix_web::test]
    async fn non_json_body_is_bad_request() {
        let app = test::init_service(
            App::new()
                .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                .app_data(web::Data::new(offline_scraper()))
                .service(web::scope("/api").service(scrape)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/scrape")
            .insert_header(("content-type", "application/json"))
            .set_payload("not json")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
    }

    #[actix_web::test]
    async fn unreachable_page_is_server_error() {
        let (status, body) = post(json!({ "url": "http://127.0.0.1:9/www.amazon.in/dp/TEST123" })).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Failed to fetch the product page.");
    }
}
