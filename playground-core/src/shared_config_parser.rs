//! Read a shared configuration back out of an incoming URL
//!
//! Links arrive from anywhere: older builds that lacked some fields, hand
//! edited query strings, other apps that happen to use a `config` parameter.
//! Whatever comes in is either normalized to the full `SharedConfig` shape or
//! rejected as `None`. Nothing here returns an error to the caller.

use crate::config_codec::{self, CodecError};
use crate::share_config::{
    derive_code_generator_step, normalize_center, normalize_zoom, CodeGeneratorLibrary,
    CodeGeneratorShareState, ExportOptions, SharedConfig, StyleParameters, ToolPanel, UiState,
    Viewport, WizardStep, DEFAULT_MAP_CENTER, DEFAULT_MAP_ZOOM,
};
use serde_json::{Map, Value};
use tracing::debug;

const SHARE_KEYS: [&str; 5] = ["style", "parameters", "viewport", "ui", "codeGenerator"];

/// Parse the share link in `url`, or `None` if it carries no usable config.
pub fn parse_shared_config_from_url(url: &str) -> Option<SharedConfig> {
    let raw = match config_codec::extract_from_url::<Value>(url) {
        Ok(Some(Value::Object(raw))) => raw,
        Ok(Some(_)) => {
            debug!("Ignoring share config that is not a JSON object");
            return None;
        }
        Ok(None) => return None,
        Err(e) => {
            debug!("Ignoring unreadable share config: {e}");
            return None;
        }
    };

    if !SHARE_KEYS.iter().any(|key| raw.contains_key(*key)) {
        debug!("Ignoring share config without any known fields");
        return None;
    }

    Some(normalize_shared_config(&raw))
}

/// Decode a bare token into a normalized config, keeping the decode error.
pub fn parse_shared_config_token(token: &str) -> Result<Option<SharedConfig>, CodecError> {
    let value: Value = config_codec::decode(token)?;
    Ok(match value {
        Value::Object(raw) if SHARE_KEYS.iter().any(|key| raw.contains_key(*key)) => {
            Some(normalize_shared_config(&raw))
        }
        _ => None,
    })
}

fn normalize_shared_config(raw: &Map<String, Value>) -> SharedConfig {
    let code_generator = raw
        .get("codeGenerator")
        .and_then(as_record)
        .and_then(normalize_code_generator)
        .map(|mut code_generator| {
            if code_generator.current_step.is_none() {
                code_generator.current_step =
                    Some(derive_code_generator_step(Some(&code_generator)));
            }
            code_generator
        });

    SharedConfig {
        style: raw
            .get("style")
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
        parameters: normalize_parameters(raw.get("parameters")),
        viewport: raw.get("viewport").and_then(as_record).map(normalize_viewport),
        ui: raw.get("ui").and_then(as_record).map(|ui| UiState {
            panel: ToolPanel::normalize(ui.get("panel").and_then(Value::as_str)),
        }),
        code_generator,
    }
}

fn normalize_parameters(raw: Option<&Value>) -> StyleParameters {
    let field = |name: &str| raw.and_then(|p| p.get(name)).and_then(Value::as_str);
    StyleParameters::with_defaults(field("language"), field("worldview"), field("places"))
}

/// Sub-objects may arrive as arrays; those read as records with no fields.
fn as_record(value: &Value) -> Option<&Value> {
    (value.is_object() || value.is_array()).then_some(value)
}

/// Numbers pass through; strings are accepted if they parse as a number.
fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

fn normalize_viewport(raw: &Value) -> Viewport {
    let center = match raw.get("center").and_then(Value::as_array) {
        Some(items) if items.len() == 2 => {
            match (coerce_number(&items[0]), coerce_number(&items[1])) {
                (Some(lng), Some(lat)) => normalize_center([lng, lat]),
                _ => DEFAULT_MAP_CENTER,
            }
        }
        _ => DEFAULT_MAP_CENTER,
    };
    let zoom = raw
        .get("zoom")
        .and_then(coerce_number)
        .map(normalize_zoom)
        .unwrap_or(DEFAULT_MAP_ZOOM);

    Viewport { center, zoom }
}

fn normalize_export_options(raw: &Value) -> ExportOptions {
    let enabled = |name: &str| !matches!(raw.get(name), Some(Value::Bool(false)));
    ExportOptions {
        style: enabled("style"),
        language: enabled("language"),
        worldview: enabled("worldview"),
        places: enabled("places"),
        location: enabled("location"),
    }
}

fn normalize_step(raw: &Value) -> Option<WizardStep> {
    let step = coerce_number(raw)?;
    if step.fract() != 0.0 || !(1.0..=4.0).contains(&step) {
        return None;
    }
    WizardStep::try_from(step as u8).ok()
}

fn normalize_code_generator(raw: &Value) -> Option<CodeGeneratorShareState> {
    let state = CodeGeneratorShareState {
        selected_library: raw
            .get("selectedLibrary")
            .and_then(Value::as_str)
            .and_then(CodeGeneratorLibrary::parse),
        export_options: raw
            .get("exportOptions")
            .and_then(as_record)
            .map(normalize_export_options),
        token: raw
            .get("token")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string),
        force_download: matches!(raw.get("forceDownload"), Some(Value::Bool(true))),
        current_step: raw.get("currentStep").and_then(normalize_step),
    };

    (!state.is_empty()).then_some(state)
}
