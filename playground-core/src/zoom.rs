//! Zoom level conversion between map libraries
//!
//! The playground map reports MapLibre zoom levels. Raster tile libraries
//! count from 256px tiles and sit one level lower.

use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ZoomError {
    #[error("Unsupported zoom conversion target: \"{0}\"")]
    UnsupportedTarget(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ZoomProfile {
    offset: f64,
    min: f64,
    max: f64,
}

const MAPLIBRE_PROFILE: ZoomProfile = ZoomProfile {
    offset: 0.0,
    min: 0.0,
    max: 24.0,
};

fn profile_for(target: &str) -> Option<ZoomProfile> {
    let profile = match target {
        "maplibre" => MAPLIBRE_PROFILE,
        "leaflet" => ZoomProfile {
            offset: -1.0,
            min: 0.0,
            max: 22.0,
        },
        "openlayers" => ZoomProfile {
            offset: -1.0,
            min: 0.0,
            max: 28.0,
        },
        "arcgis-image" => ZoomProfile {
            offset: -1.0,
            min: 0.0,
            max: 23.0,
        },
        "arcgis-vector" => ZoomProfile {
            offset: 0.0,
            min: 0.0,
            max: 22.0,
        },
        _ => return None,
    };
    Some(profile)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoomConversion {
    /// Fail on unknown targets instead of falling back to MapLibre.
    pub strict: bool,
    pub clamp: bool,
}

impl Default for ZoomConversion {
    fn default() -> Self {
        Self {
            strict: false,
            clamp: true,
        }
    }
}

/// Convert a MapLibre zoom to `target`'s zoom baseline. Non-finite input is
/// treated as zoom 0.
pub fn convert_zoom_from_maplibre(
    zoom: f64,
    target: &str,
    options: ZoomConversion,
) -> Result<f64, ZoomError> {
    let zoom = if zoom.is_finite() { zoom } else { 0.0 };

    let profile = match profile_for(target) {
        Some(profile) => profile,
        None if options.strict => return Err(ZoomError::UnsupportedTarget(target.to_string())),
        None => {
            warn!(
                "Unsupported zoom conversion target \"{target}\". Falling back to MapLibre baseline conversion."
            );
            MAPLIBRE_PROFILE
        }
    };

    let converted = zoom + profile.offset;
    Ok(if options.clamp {
        converted.clamp(profile.min, profile.max)
    } else {
        converted
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(zoom: f64, target: &str) -> f64 {
        convert_zoom_from_maplibre(zoom, target, ZoomConversion::default()).unwrap()
    }

    #[test]
    fn maplibre_is_identity() {
        assert_eq!(convert(7.5, "maplibre"), 7.5);
    }

    #[test]
    fn raster_libraries_are_one_level_lower() {
        assert_eq!(convert(7.0, "leaflet"), 6.0);
        assert_eq!(convert(7.0, "openlayers"), 6.0);
        assert_eq!(convert(7.0, "arcgis-image"), 6.0);
        assert_eq!(convert(7.0, "arcgis-vector"), 7.0);
    }

    #[test]
    fn clamps_to_library_range() {
        assert_eq!(convert(0.5, "leaflet"), 0.0);
        assert_eq!(convert(30.0, "leaflet"), 22.0);
        assert_eq!(convert(30.0, "openlayers"), 28.0);

        let unclamped = convert_zoom_from_maplibre(
            0.5,
            "leaflet",
            ZoomConversion {
                clamp: false,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(unclamped, -0.5);
    }

    #[test]
    fn non_finite_zoom_is_zero() {
        assert_eq!(convert(f64::NAN, "maplibre"), 0.0);
        assert_eq!(convert(f64::INFINITY, "arcgis-vector"), 0.0);
    }

    #[test]
    fn unknown_target() {
        assert_eq!(convert(30.0, "mapbox"), 24.0);
        assert_eq!(
            convert_zoom_from_maplibre(
                3.0,
                "mapbox",
                ZoomConversion {
                    strict: true,
                    clamp: true,
                },
            ),
            Err(ZoomError::UnsupportedTarget("mapbox".into()))
        );
    }
}
