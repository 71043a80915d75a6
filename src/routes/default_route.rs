use actix_web::{get, HttpResponse, Responder};
use serde_json::json;

#[get("/")]
async fn default() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "message": "Product Scraper API",
        "endpoints": {
            "health": "GET /health",
            "scrape": "POST /api/scrape"
        }
    }))
}

#[get("/health")]
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "OK", "message": "Server is running" }))
}
