//! Share configuration data model
//!
//! `ShareConfig` is the payload that gets encoded into a share link. Every
//! top-level field is optional so a selective share only carries what the
//! user picked. `SharedConfig` is what the parser hands back to the
//! application: always the full shape, with defaults filled in.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Map center used when a viewport is missing or unusable, as [lng, lat].
pub const DEFAULT_MAP_CENTER: [f64; 2] = [0.0, 30.0];
pub const DEFAULT_MAP_ZOOM: f64 = 2.0;

pub const DEFAULT_LANGUAGE: &str = "global";
/// Empty worldview means the global boundary set.
pub const DEFAULT_WORLDVIEW: &str = "";
pub const DEFAULT_PLACES: &str = "none";

fn or_default(value: Option<&str>, default: &str) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => default.to_string(),
    }
}

/// Style display parameters with every field filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleParameters {
    pub language: String,
    pub worldview: String,
    pub places: String,
}

impl Default for StyleParameters {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            worldview: DEFAULT_WORLDVIEW.to_string(),
            places: DEFAULT_PLACES.to_string(),
        }
    }
}

impl StyleParameters {
    /// Build parameters from possibly missing values. Missing and empty values
    /// each fall back to their own default.
    pub fn with_defaults(
        language: Option<&str>,
        worldview: Option<&str>,
        places: Option<&str>,
    ) -> Self {
        Self {
            language: or_default(language, DEFAULT_LANGUAGE),
            worldview: or_default(worldview, DEFAULT_WORLDVIEW),
            places: or_default(places, DEFAULT_PLACES),
        }
    }

    /// Copy with empty fields replaced by their defaults.
    pub fn normalized(&self) -> Self {
        Self::with_defaults(
            Some(&self.language),
            Some(&self.worldview),
            Some(&self.places),
        )
    }
}

/// Sparse parameters as carried by a selective share.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShareParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worldview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub places: Option<String>,
}

impl ShareParameters {
    pub fn is_empty(&self) -> bool {
        self.language.is_none() && self.worldview.is_none() && self.places.is_none()
    }
}

impl From<StyleParameters> for ShareParameters {
    fn from(params: StyleParameters) -> Self {
        Self {
            language: Some(params.language),
            worldview: Some(params.worldview),
            places: Some(params.places),
        }
    }
}

/// Map position. `center` is [longitude, latitude].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center: [f64; 2],
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            center: DEFAULT_MAP_CENTER,
            zoom: DEFAULT_MAP_ZOOM,
        }
    }
}

impl Viewport {
    pub fn new(lng: f64, lat: f64, zoom: f64) -> Self {
        Self {
            center: [lng, lat],
            zoom,
        }
    }

    /// Replace a non-finite center or zoom with the application default.
    /// Center and zoom fall back independently.
    pub fn normalized(&self) -> Self {
        Self {
            center: normalize_center(self.center),
            zoom: normalize_zoom(self.zoom),
        }
    }
}

pub fn normalize_center(center: [f64; 2]) -> [f64; 2] {
    if center.iter().all(|c| c.is_finite()) {
        center
    } else {
        DEFAULT_MAP_CENTER
    }
}

pub fn normalize_zoom(zoom: f64) -> f64 {
    if zoom.is_finite() {
        zoom
    } else {
        DEFAULT_MAP_ZOOM
    }
}

/// Tool panels that a share link can ask to open on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolPanel {
    #[default]
    StyleSelection,
    Language,
    Worldview,
    Places,
    CodeGenerator,
    Share,
    Contact,
}

impl ToolPanel {
    pub const ALL: [ToolPanel; 7] = [
        ToolPanel::StyleSelection,
        ToolPanel::Language,
        ToolPanel::Worldview,
        ToolPanel::Places,
        ToolPanel::CodeGenerator,
        ToolPanel::Share,
        ToolPanel::Contact,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolPanel::StyleSelection => "style-selection",
            ToolPanel::Language => "language",
            ToolPanel::Worldview => "worldview",
            ToolPanel::Places => "places",
            ToolPanel::CodeGenerator => "code-generator",
            ToolPanel::Share => "share",
            ToolPanel::Contact => "contact",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|panel| panel.as_str() == value)
    }

    /// Unknown or missing panel ids fall back to style selection.
    pub fn normalize(value: Option<&str>) -> Self {
        value.and_then(Self::parse).unwrap_or_default()
    }
}

impl fmt::Display for ToolPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UiState {
    pub panel: ToolPanel,
}

/// Client libraries the code generator can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeGeneratorLibrary {
    #[default]
    Maplibre,
    Leaflet,
}

impl CodeGeneratorLibrary {
    pub fn as_str(&self) -> &'static str {
        match self {
            CodeGeneratorLibrary::Maplibre => "maplibre",
            CodeGeneratorLibrary::Leaflet => "leaflet",
        }
    }

    /// Exact match only; anything else is not a library.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "maplibre" => Some(CodeGeneratorLibrary::Maplibre),
            "leaflet" => Some(CodeGeneratorLibrary::Leaflet),
            _ => None,
        }
    }
}

impl fmt::Display for CodeGeneratorLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which parts of the live configuration the generated sample code includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOptions {
    pub style: bool,
    pub language: bool,
    pub worldview: bool,
    pub places: bool,
    pub location: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            style: true,
            language: true,
            worldview: true,
            places: true,
            location: true,
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("wizard step must be between 1 and 4, got {0}")]
pub struct InvalidWizardStep(pub u8);

/// Code generator wizard stages, serialized as 1..=4.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(into = "u8", try_from = "u8")]
pub enum WizardStep {
    #[default]
    ExportParameters = 1,
    Library = 2,
    ApiKey = 3,
    Export = 4,
}

impl From<WizardStep> for u8 {
    fn from(step: WizardStep) -> u8 {
        step as u8
    }
}

impl TryFrom<u8> for WizardStep {
    type Error = InvalidWizardStep;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(WizardStep::ExportParameters),
            2 => Ok(WizardStep::Library),
            3 => Ok(WizardStep::ApiKey),
            4 => Ok(WizardStep::Export),
            other => Err(InvalidWizardStep(other)),
        }
    }
}

impl WizardStep {
    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::ExportParameters => "Select Exported Parameters",
            WizardStep::Library => "Select a Client Library",
            WizardStep::ApiKey => "Add API Key",
            WizardStep::Export => "Export",
        }
    }
}

/// Code generator state carried by a share link.
///
/// Every field is independently optional. The `hasLibrarySelection` and
/// `hasAcceptedTokenWarning` companions are not stored: they are written on
/// serialization whenever a library or token is present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(into = "CodeGeneratorWire")]
pub struct CodeGeneratorShareState {
    pub selected_library: Option<CodeGeneratorLibrary>,
    pub export_options: Option<ExportOptions>,
    pub token: Option<String>,
    pub force_download: bool,
    pub current_step: Option<WizardStep>,
}

impl CodeGeneratorShareState {
    pub fn is_empty(&self) -> bool {
        self.selected_library.is_none()
            && self.export_options.is_none()
            && self.token.is_none()
            && !self.force_download
            && self.current_step.is_none()
    }

    pub fn has_library_selection(&self) -> bool {
        self.selected_library.is_some()
    }

    pub fn has_accepted_token_warning(&self) -> bool {
        self.token.is_some()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CodeGeneratorWire {
    #[serde(skip_serializing_if = "Option::is_none")]
    export_options: Option<ExportOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    selected_library: Option<CodeGeneratorLibrary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    has_library_selection: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    has_accepted_token_warning: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    force_download: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    current_step: Option<WizardStep>,
}

impl From<CodeGeneratorShareState> for CodeGeneratorWire {
    fn from(state: CodeGeneratorShareState) -> Self {
        Self {
            export_options: state.export_options,
            has_library_selection: state.selected_library.map(|_| true),
            selected_library: state.selected_library,
            has_accepted_token_warning: state.token.as_ref().map(|_| true),
            token: state.token,
            force_download: state.force_download.then_some(true),
            current_step: state.current_step,
        }
    }
}

/// Wizard step implied by which code generator fields are present.
///
/// Priority order: token, then library, then export options.
pub fn derive_code_generator_step(state: Option<&CodeGeneratorShareState>) -> WizardStep {
    let Some(state) = state else {
        return WizardStep::ExportParameters;
    };

    if state.token.is_some() {
        WizardStep::Export
    } else if state.selected_library.is_some() {
        WizardStep::ApiKey
    } else if state.export_options.is_some() {
        WizardStep::Library
    } else {
        WizardStep::ExportParameters
    }
}

/// Payload built for a share link.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<ShareParameters>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Viewport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ui: Option<UiState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_generator: Option<CodeGeneratorShareState>,
}

impl ShareConfig {
    pub fn is_empty(&self) -> bool {
        self.style.is_none()
            && self.parameters.is_none()
            && self.viewport.is_none()
            && self.ui.is_none()
            && self.code_generator.is_none()
    }
}

/// Normalized configuration recovered from a share link.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedConfig {
    /// Empty when the link did not carry a style.
    pub style: String,
    pub parameters: StyleParameters,
    /// `None` means keep the current map position.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Viewport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ui: Option<UiState>,
    pub code_generator: Option<CodeGeneratorShareState>,
}

impl SharedConfig {
    pub fn panel(&self) -> Option<ToolPanel> {
        self.ui.map(|ui| ui.panel)
    }

    /// Code generator preset, only when the link opens the code generator.
    pub fn code_generator_preset(&self) -> Option<&CodeGeneratorShareState> {
        match self.panel() {
            Some(ToolPanel::CodeGenerator) => self.code_generator.as_ref(),
            _ => None,
        }
    }
}
