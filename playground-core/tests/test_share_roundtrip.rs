//! Share links built by the playground survive the trip through a URL.

use playground_core::clipboard::{Clipboard, ClipboardError, ClipboardWriter};
use playground_core::config_codec::{build_share_url, decode, encode};
use playground_core::share_builder::{
    build_selective_share_config, build_share_config, CodeGeneratorShareOptions, ShareConfigError,
    ShareOptions,
};
use playground_core::share_config::{
    CodeGeneratorLibrary, StyleParameters, ToolPanel, Viewport, WizardStep,
};
use playground_core::shared_config_parser::parse_shared_config_from_url;
use playground_core::wizard_memory::{CodeGeneratorState, WizardMemory};
use playground_core::SharePublisher;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

const BASE_URL: &str = "https://developers.example.com/basemap-playground/";

fn params(language: &str, worldview: &str, places: &str) -> StyleParameters {
    StyleParameters {
        language: language.into(),
        worldview: worldview.into(),
        places: places.into(),
    }
}

fn style_and_language() -> ShareOptions {
    ShareOptions {
        include_style: true,
        include_language: true,
        ..ShareOptions::none()
    }
}

#[test]
fn test_end_to_end_style_and_language() {
    let config = build_selective_share_config(
        "arcgis/navigation",
        &params("es", "", "none"),
        Some(&Viewport::new(12.5, 41.9, 7.0)),
        &style_and_language(),
        None,
    )
    .unwrap();

    assert_eq!(
        serde_json::to_value(&config).unwrap(),
        json!({
            "style": "arcgis/navigation",
            "parameters": {"language": "es"},
            "viewport": {"center": [12.5, 41.9], "zoom": 7.0}
        })
    );

    let token = encode(&config).unwrap();
    let decoded: Value = decode(&token).unwrap();
    assert_eq!(decoded, serde_json::to_value(&config).unwrap());

    let url = build_share_url(&config, BASE_URL).unwrap();
    let shared = parse_shared_config_from_url(&url).unwrap();
    assert_eq!(shared.style, "arcgis/navigation");
    assert_eq!(shared.parameters, params("es", "", "none"));
    assert_eq!(shared.viewport, Some(Viewport::new(12.5, 41.9, 7.0)));
    assert_eq!(shared.ui, None);
    assert_eq!(shared.code_generator, None);
}

#[test]
fn test_full_share_round_trip() {
    let config = build_share_config(
        "arcgis/streets",
        &params("fr", "morocco", "attributed"),
        Some(&Viewport::new(-7.6, 33.5, 9.25)),
    );
    let url = build_share_url(&config, BASE_URL).unwrap();
    let shared = parse_shared_config_from_url(&url).unwrap();

    assert_eq!(shared.style, "arcgis/streets");
    assert_eq!(shared.parameters, params("fr", "morocco", "attributed"));
    assert_eq!(shared.viewport, Some(Viewport::new(-7.6, 33.5, 9.25)));
}

#[test]
fn test_code_generator_round_trip() {
    let live = CodeGeneratorState {
        selected_library: CodeGeneratorLibrary::Leaflet,
        has_library_selection: true,
        token: "  my-api-key ".into(),
        ..Default::default()
    };
    let options = ShareOptions {
        default_panel: "code-generator".into(),
        code_generator: CodeGeneratorShareOptions {
            include_api_key: true,
            ..Default::default()
        },
        ..Default::default()
    };

    let config = build_selective_share_config(
        "arcgis/navigation",
        &StyleParameters::default(),
        None,
        &options,
        Some(&live),
    )
    .unwrap();
    let url = build_share_url(&config, BASE_URL).unwrap();
    let shared = parse_shared_config_from_url(&url).unwrap();

    assert_eq!(shared.panel(), Some(ToolPanel::CodeGenerator));
    let preset = shared.code_generator_preset().unwrap();
    assert_eq!(preset.selected_library, Some(CodeGeneratorLibrary::Leaflet));
    assert_eq!(preset.token.as_deref(), Some("my-api-key"));
    assert_eq!(preset.current_step, Some(WizardStep::Export));

    let mut memory = WizardMemory::new();
    memory.record(CodeGeneratorState {
        show_token: true,
        ..Default::default()
    });
    let hydrated = memory.hydrate(Some(preset));
    assert_eq!(hydrated.selected_library, CodeGeneratorLibrary::Leaflet);
    assert!(hydrated.has_library_selection);
    assert_eq!(hydrated.token, "my-api-key");
    assert!(hydrated.has_accepted_token_warning);
    assert_eq!(hydrated.current_step, WizardStep::Export);
    assert!(hydrated.show_token);
}

#[test]
fn test_missing_parameters_default() {
    let token = encode(&json!({"parameters": {"language": "en"}})).unwrap();
    let shared =
        parse_shared_config_from_url(&format!("{BASE_URL}?config={token}")).unwrap();
    assert_eq!(shared.parameters, params("en", "", "none"));
    assert_eq!(shared.style, "");
}

#[test]
fn test_selective_share_errors() {
    let err = build_selective_share_config(
        "  ",
        &StyleParameters::default(),
        None,
        &style_and_language(),
        None,
    )
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Select a style or disable Style before creating a share link."
    );

    let err = build_selective_share_config(
        "arcgis/navigation",
        &StyleParameters::default(),
        None,
        &ShareOptions::none(),
        None,
    )
    .unwrap_err();
    assert_eq!(err, ShareConfigError::NothingSelected);
    assert_eq!(err.to_string(), "Select at least one item to share.");
}

#[test]
fn test_unknown_panel_falls_back() {
    let token = encode(&json!({"style": "arcgis/navigation", "ui": {"panel": "nonexistent"}}))
        .unwrap();
    let shared = parse_shared_config_from_url(&format!("{BASE_URL}?config={token}")).unwrap();
    assert_eq!(shared.panel(), Some(ToolPanel::StyleSelection));
}

#[test]
fn test_foreign_urls_are_ignored() {
    assert_eq!(
        parse_shared_config_from_url("https://example.com/?config=not-base64"),
        None
    );
    assert_eq!(parse_shared_config_from_url("https://example.com/?q=1"), None);
    assert_eq!(parse_shared_config_from_url(""), None);
}

#[derive(Default)]
struct RecordingWriter {
    texts: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl ClipboardWriter for RecordingWriter {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        self.texts.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

#[tokio::test]
async fn test_publish_copies_parseable_link() {
    let writer = Arc::new(RecordingWriter::default());
    let publisher = SharePublisher::new(Clipboard::new(Some(writer.clone()), None), BASE_URL);

    let url = publisher
        .share_and_copy_selective(
            "arcgis/navigation",
            &params("es", "", "none"),
            Some(&Viewport::new(12.5, 41.9, 7.0)),
            &style_and_language(),
            None,
        )
        .await
        .unwrap();

    assert_eq!(*writer.texts.lock().unwrap(), vec![url.clone()]);
    let shared = parse_shared_config_from_url(&url).unwrap();
    assert_eq!(shared.parameters.language, "es");
}
