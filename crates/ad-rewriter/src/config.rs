#[derive(Clone, Debug)]
pub struct RewriterConfig {
    /// Tag the scanner matches. Direct tag query, document order.
    pub ad_selector: String,
    /// Attribute holding the element's serialized JSON configuration.
    pub config_attr: String,
}

impl Default for RewriterConfig {
    fn default() -> Self {
        Self {
            ad_selector: "ad-slot".to_string(),
            config_attr: "json".to_string(),
        }
    }
}
