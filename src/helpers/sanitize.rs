//! Allow-list sanitization of backend-supplied markup

use ammonia::Builder;
use std::collections::{HashMap, HashSet};

use crate::config::SanitizeConfig;

/// Tags whose content is dropped along with the tag
const CLEAN_CONTENT_TAGS: [&str; 2] = ["script", "style"];

/// `rel` is managed by the sanitizer itself
const RESERVED_ATTRIBUTE: &str = "rel";

/// Cleans untrusted HTML according to a [`SanitizeConfig`]
#[derive(Debug, Clone)]
pub struct Sanitizer {
    config: SanitizeConfig,
}

impl Sanitizer {
    pub fn new(config: SanitizeConfig) -> Self {
        Self { config }
    }

    /// Remove every tag, attribute and URL scheme not on the allow-list
    pub fn clean(&self, html: &str) -> String {
        let tags: HashSet<&str> = self.config.tags.iter().map(String::as_str).collect();
        let clean_content_tags: HashSet<&str> = CLEAN_CONTENT_TAGS
            .iter()
            .copied()
            .filter(|t| !tags.contains(t))
            .collect();
        let generic_attributes: HashSet<&str> = self
            .config
            .attributes
            .iter()
            .map(String::as_str)
            .filter(|a| *a != RESERVED_ATTRIBUTE)
            .collect();
        let tag_attributes: HashMap<&str, HashSet<&str>> = self
            .config
            .tag_attributes
            .iter()
            .map(|(tag, attrs)| {
                let attrs = attrs
                    .iter()
                    .map(String::as_str)
                    .filter(|a| *a != RESERVED_ATTRIBUTE)
                    .collect();
                (tag.as_str(), attrs)
            })
            .collect();
        let url_schemes: HashSet<&str> =
            self.config.url_schemes.iter().map(String::as_str).collect();

        let mut builder = Builder::empty();
        builder
            .tags(tags)
            .clean_content_tags(clean_content_tags)
            .generic_attributes(generic_attributes)
            .tag_attributes(tag_attributes)
            .url_schemes(url_schemes)
            .link_rel(Some("noopener noreferrer"));

        builder.clean(html).to_string()
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new(SanitizeConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_allowed_markup() {
        let sanitizer = Sanitizer::default();
        let cleaned = sanitizer.clean(r#"<p class="lead">Hello <em>world</em></p>"#);
        assert_eq!(cleaned, r#"<p class="lead">Hello <em>world</em></p>"#);
    }

    #[test]
    fn test_strips_scripts_and_handlers() {
        let sanitizer = Sanitizer::default();
        let cleaned = sanitizer.clean(
            r#"<p onclick="steal()">Hi</p><script>alert(1)</script><iframe src="x"></iframe>"#,
        );
        assert_eq!(cleaned, "<p>Hi</p>");
    }

    #[test]
    fn test_filters_url_schemes() {
        let sanitizer = Sanitizer::default();
        let cleaned = sanitizer.clean(r#"<a href="javascript:alert(1)">x</a>"#);
        assert!(!cleaned.contains("javascript"));

        let cleaned = sanitizer.clean(r#"<a href="https://example.com">x</a>"#);
        assert!(cleaned.contains(r#"href="https://example.com""#));
        assert!(cleaned.contains(r#"rel="noopener noreferrer""#));
    }

    #[test]
    fn test_custom_allow_list() {
        let sanitizer = Sanitizer::new(SanitizeConfig {
            tags: vec!["p".to_string()],
            attributes: vec!["rel".to_string()],
            tag_attributes: HashMap::new(),
            url_schemes: vec!["https".to_string()],
        });
        assert_eq!(sanitizer.clean("<p><strong>bold</strong></p>"), "<p>bold</p>");
    }
}
