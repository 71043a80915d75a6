use crate::domain::{
    product::{normalize, ProductFields},
    site_profile::{SelectorRule, SiteProfile},
};

use super::DomHandle;

/// Walks a fallback chain in order and stops at the first rule that yields a
/// non-blank value.
pub async fn resolve_field(dom: &dyn DomHandle, chain: &[SelectorRule]) -> Option<String> {
    for rule in chain {
        let raw = match rule {
            SelectorRule::Text(css) => dom.text(css).await,
            SelectorRule::Attr(css, attr) => dom.attr(css, attr).await,
        };

        if let Some(value) = normalize(raw) {
            return Some(value);
        }
    }

    None
}

pub async fn extract_fields(dom: &dyn DomHandle, profile: &SiteProfile) -> ProductFields {
    ProductFields {
        title: resolve_field(dom, &profile.title).await,
        price: resolve_field(dom, &profile.price).await,
        image: resolve_field(dom, &profile.image).await,
    }
}
