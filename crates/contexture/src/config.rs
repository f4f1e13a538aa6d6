//! Render options.
//!
//! [`RenderOptions`] carries presentation settings meant for downstream
//! layout and export stages. The diagram core does not interpret them; it
//! copies them onto the [`RenderedDiagram`](crate::render::RenderedDiagram)
//! so they travel with the resolved structure. The type implements
//! [`serde::Deserialize`] so hosts can load it from their own configuration
//! files.
//!
//! # Example
//!
//! ```
//! # use contexture::config::RenderOptions;
//! let options = RenderOptions::default()
//!     .with_style_class("context")
//!     .with_param("direction", "RIGHT");
//! assert_eq!(options.style_class(), Some("context"));
//! assert_eq!(options.params().get("direction").map(String::as_str), Some("RIGHT"));
//! ```

use indexmap::IndexMap;
use serde::Deserialize;

/// Presentation settings passed through a render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RenderOptions {
    /// Style class requested for the rendered diagram.
    #[serde(default)]
    style_class: Option<String>,

    /// Free-form layout and filtering hints, in declaration order.
    #[serde(default)]
    params: IndexMap<String, String>,
}

impl RenderOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the style class.
    pub fn with_style_class(mut self, style_class: impl Into<String>) -> Self {
        self.style_class = Some(style_class.into());
        self
    }

    /// Adds or replaces a hint.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Returns the style class, if any.
    pub fn style_class(&self) -> Option<&str> {
        self.style_class.as_deref()
    }

    /// Returns all hints.
    pub fn params(&self) -> &IndexMap<String, String> {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty() {
        let options = RenderOptions::default();
        assert_eq!(options.style_class(), None);
        assert!(options.params().is_empty());
    }

    #[test]
    fn test_deserialize_from_toml() {
        let options: RenderOptions = toml::from_str(
            r#"
            style_class = "custom"

            [params]
            direction = "DOWN"
            edge_routing = "ORTHOGONAL"
            "#,
        )
        .unwrap();

        assert_eq!(options.style_class(), Some("custom"));
        let keys: Vec<&str> = options.params().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["direction", "edge_routing"]);
    }

    #[test]
    fn test_deserialize_missing_sections_uses_defaults() {
        let options: RenderOptions = toml::from_str("").unwrap();
        assert_eq!(options, RenderOptions::default());
    }

    #[test]
    fn test_with_param_replaces_existing_value() {
        let options = RenderOptions::new()
            .with_param("direction", "DOWN")
            .with_param("direction", "UP");
        assert_eq!(options.params().len(), 1);
        assert_eq!(options.params()["direction"], "UP");
    }
}
