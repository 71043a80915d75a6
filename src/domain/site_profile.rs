/// One step of a field's fallback chain.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorRule {
    /// Text content of the first element matching the css selector
    Text(&'static str),
    /// Attribute of the first element matching the css selector
    Attr(&'static str, &'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SiteProfile {
    pub id: &'static str,
    pub markers: &'static [&'static str],
    pub referer: &'static str,
    pub title: Vec<SelectorRule>,
    pub price: Vec<SelectorRule>,
    pub image: Vec<SelectorRule>,
}

impl SiteProfile {
    pub fn matches(&self, url: &str) -> bool {
        self.markers.iter().any(|marker| url.contains(marker))
    }

    pub fn amazon() -> Self {
        use SelectorRule::*;

        SiteProfile {
            id: "amazon",
            markers: &["amazon.com", "amazon.in"],
            referer: "https://www.amazon.com/",
            title: vec![
                Text("#productTitle"),
                Text("#title span"),
                Text(".product-title-word-break"),
            ],
            price: vec![
                Text(".a-section .a-price .a-price-whole"),
                Text("#corePrice_feature_div .a-price .a-offscreen"),
                Text("#priceblock_ourprice"),
                Text("#priceblock_dealprice"),
                Text(".a-price .a-offscreen"),
            ],
            image: vec![
                Attr("#landingImage", "src"),
                Attr("#imgBlkFront", "src"),
                Attr("#landingImage", "data-old-hires"),
                Attr("#main-image", "src"),
            ],
        }
    }

    pub fn flipkart() -> Self {
        use SelectorRule::*;

        SiteProfile {
            id: "flipkart",
            markers: &["flipkart.com"],
            referer: "https://www.flipkart.com/",
            title: vec![
                Text(".CEn5rD .LMizgS"),
                Text(".VU-ZEz"),
                Text(".B_NuCI"),
                Text("h1 span"),
            ],
            price: vec![
                Text(".QiMO5r .bnqy13"),
                Text(".Nx9bqj.CxhGGd"),
                Text("._30jeq3._16Jk6d"),
            ],
            image: vec![
                Attr(".IgiqRJ .UCc1lI", "src"),
                Attr("img.DByuf4", "src"),
                Attr("._396cs4", "src"),
            ],
        }
    }
}

/// Known sites, built once at startup and shared read-only between requests.
pub fn default_profiles() -> Vec<SiteProfile> {
    vec![SiteProfile::amazon(), SiteProfile::flipkart()]
}

/// First profile whose marker appears in the url. Marker sets are disjoint.
pub fn classify<'a>(profiles: &'a [SiteProfile], url: &str) -> Option<&'a SiteProfile> {
    profiles.iter().find(|profile| profile.matches(url))
}

#[cfg(test)]
mod tests {
    use super::{classify, default_profiles};

    #[test]
    fn amazon_domains_are_classified() {
        let profiles = default_profiles();

        for url in [
            "https://www.amazon.in/dp/TEST123",
            "https://www.amazon.com/Some-Widget/dp/B000000000",
        ] {
            assert_eq!(classify(&profiles, url).map(|p| p.id), Some("amazon"));
        }
    }

    #[test]
    fn flipkart_domain_is_classified() {
        let profiles = default_profiles();
        let url = "https://www.flipkart.com/samsung-galaxy-f13/p/itm583ef432b2b0c";

        assert_eq!(classify(&profiles, url).map(|p| p.id), Some("flipkart"));
    }

    #[test]
    fn unknown_site_is_unsupported() {
        let profiles = default_profiles();

        assert!(classify(&profiles, "https://www.ebay.com/itm/123").is_none());
        assert!(classify(&profiles, "").is_none());
    }

    #[test]
    fn marker_sets_are_disjoint() {
        let profiles = default_profiles();

        for profile in profiles.iter() {
            for marker in profile.markers {
                let owners = profiles.iter().filter(|p| p.matches(marker)).count();
                assert_eq!(owners, 1, "marker {} matched {} profiles", marker, owners);
            }
        }
    }
}
