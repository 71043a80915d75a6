pub mod error;
pub mod product;
pub mod site_profile;
