pub mod fetcher;
pub mod field_extractor;
pub mod product_scraper;
pub mod rendered_fetcher;
pub mod static_fetcher;

pub use fetcher::*;
pub use field_extractor::*;
pub use product_scraper::*;
pub use rendered_fetcher::*;
pub use static_fetcher::*;
