//! Style capability checks
//!
//! Style metadata comes from the style catalog. A style supports a
//! parameter when its URL template carries the matching placeholder, or for
//! language, when it lists supported language codes.

use crate::share_config::{StyleParameters, DEFAULT_LANGUAGE, DEFAULT_PLACES, DEFAULT_WORLDVIEW};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Catalog metadata for one style.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleMetadata {
    #[serde(default)]
    pub path: String,
    /// URL template, e.g. `.../arcgis/navigation{?language}{?worldview}`.
    #[serde(default)]
    pub style_url: String,
    #[serde(default)]
    pub supported_language_codes: Vec<String>,
}

impl StyleMetadata {
    /// Load from a JSON or YAML file (YAML is a superset of JSON).
    pub fn load(path: &Path) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("read style metadata: {e}"))?;
        serde_yaml::from_str(&content).map_err(|e| format!("parse style metadata: {e}"))
    }

    pub fn language_codes(&self) -> impl Iterator<Item = &str> {
        self.supported_language_codes
            .iter()
            .map(String::as_str)
            .filter(|code| !code.is_empty())
    }

    pub fn supports_language(&self) -> bool {
        self.language_codes().next().is_some() || self.style_url.contains("{?language}")
    }

    pub fn supports_worldview(&self) -> bool {
        self.style_url.contains("{?worldview}")
    }

    pub fn supports_places(&self) -> bool {
        self.style_url.contains("{?places}")
    }
}

/// Reset parameters the style cannot honor.
pub fn sanitize_style_parameters(
    style: &StyleMetadata,
    parameters: &StyleParameters,
) -> StyleParameters {
    let mut next = parameters.normalized();

    if !style.supports_language() {
        next.language = DEFAULT_LANGUAGE.to_string();
    } else {
        let available: Vec<&str> = style.language_codes().collect();
        if !available.is_empty() && !available.contains(&next.language.as_str()) {
            next.language = if available.contains(&DEFAULT_LANGUAGE) {
                DEFAULT_LANGUAGE.to_string()
            } else {
                available[0].to_string()
            };
        }
    }

    if !style.supports_worldview() {
        next.worldview = DEFAULT_WORLDVIEW.to_string();
    }

    if !style.supports_places() {
        next.places = DEFAULT_PLACES.to_string();
    }

    next
}
