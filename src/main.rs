use std::net::TcpListener;

use env_logger::Env;
use pricepeek::{configuration::get_configuration, services::ProductScraper, startup::run};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration().expect("Failed to read configuration.");

    let scraper = ProductScraper::from_settings(&configuration.scraper)
        .expect("Failed to build the static fetch client.");
    log::info!(
        "Default fetch strategy: {}, per-site overrides: {:?}",
        configuration.scraper.default_strategy,
        configuration.scraper.site_strategies
    );

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address)?;
    log::info!("Backend server running on http://{}", address);

    run(listener, scraper)?.await
}
