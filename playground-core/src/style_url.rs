//! Style URLs for the basemap styles service
//!
//! The map renderer only takes a style URL. Parameters left at their
//! defaults are omitted so the service applies its own defaults.

use crate::share_config::{SharedConfig, DEFAULT_LANGUAGE, DEFAULT_PLACES, DEFAULT_WORLDVIEW};
use thiserror::Error;
use url::Url;

pub const DEFAULT_STYLE_SERVICE_URL: &str =
    "https://basemapstyles-api.arcgis.com/arcgis/rest/services/styles/v2";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum StyleUrlError {
    #[error("style name is required")]
    MissingStyle,
    #[error("Invalid style URL: {0}")]
    InvalidUrl(String),
}

/// Everything a style URL can carry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleRequest {
    pub style: String,
    pub language: String,
    pub worldview: String,
    pub places: String,
    /// API key or session token.
    pub token: String,
}

impl StyleRequest {
    /// Style request for a shared config, with an optional token.
    pub fn from_shared(shared: &SharedConfig, token: Option<&str>) -> Self {
        Self {
            style: shared.style.clone(),
            language: shared.parameters.language.clone(),
            worldview: shared.parameters.worldview.clone(),
            places: shared.parameters.places.clone(),
            token: token.unwrap_or_default().to_string(),
        }
    }
}

/// Build `{service}/styles/{style}` with the non-default parameters.
pub fn build_style_url(service_url: &str, request: &StyleRequest) -> Result<String, StyleUrlError> {
    if request.style.is_empty() {
        return Err(StyleUrlError::MissingStyle);
    }

    let raw = format!(
        "{}/styles/{}",
        service_url.trim_end_matches('/'),
        request.style
    );
    let mut url = Url::parse(&raw).map_err(|e| StyleUrlError::InvalidUrl(format!("{raw}: {e}")))?;

    {
        let mut query = url.query_pairs_mut();
        if !request.language.is_empty() && request.language != DEFAULT_LANGUAGE {
            query.append_pair("language", &request.language);
        }
        if !request.worldview.is_empty() {
            query.append_pair("worldview", &request.worldview);
        }
        if !request.places.is_empty() && request.places != DEFAULT_PLACES {
            query.append_pair("places", &request.places);
        }
        if !request.token.is_empty() {
            query.append_pair("token", &request.token);
        }
    }

    // Drop the dangling `?` left when nothing was appended.
    if url.query() == Some("") {
        url.set_query(None);
    }

    Ok(url.to_string())
}

/// Recover the style and parameters from a style URL. The style is the last
/// two path segments.
pub fn parse_style_url(style_url: &str) -> Result<StyleRequest, StyleUrlError> {
    let url = Url::parse(style_url).map_err(|e| StyleUrlError::InvalidUrl(e.to_string()))?;

    let segments: Vec<&str> = url.path().split('/').collect();
    let style = segments[segments.len().saturating_sub(2)..].join("/");

    let param = |name: &str, default: &str| {
        url.query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| default.to_string())
    };

    Ok(StyleRequest {
        style,
        language: param("language", DEFAULT_LANGUAGE),
        worldview: param("worldview", DEFAULT_WORLDVIEW),
        places: param("places", DEFAULT_PLACES),
        token: param("token", ""),
    })
}
