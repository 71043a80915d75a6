use std::net::TcpListener;

use actix_web::{dev::Server, middleware::Logger, web, App, HttpServer};

use crate::{
    routes::{default_route, scrape_route},
    services::ProductScraper,
};

pub fn run(listener: TcpListener, scraper: ProductScraper) -> Result<Server, std::io::Error> {
    let scraper = web::Data::new(scraper);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .service(default_route::default)
            .service(default_route::health_check)
            .service(web::scope("/api").service(scrape_route::scrape))
            .app_data(web::JsonConfig::default().error_handler(scrape_route::json_error_handler))
            .app_data(scraper.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
