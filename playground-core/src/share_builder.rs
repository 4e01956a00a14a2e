//! Build share payloads from live playground state
//!
//! Two policies: `build_share_config` shares everything, while
//! `build_selective_share_config` only carries the fields the user toggled
//! on in the share panel.

use crate::share_config::{
    derive_code_generator_step, CodeGeneratorShareState, ShareConfig, ShareParameters,
    StyleParameters, ToolPanel, UiState, Viewport, WizardStep, DEFAULT_LANGUAGE, DEFAULT_PLACES,
    DEFAULT_WORLDVIEW,
};
use crate::wizard_memory::CodeGeneratorState;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShareConfigError {
    #[error("Select a style or disable Style before creating a share link.")]
    StyleRequired,
    #[error("Select a style before creating a share link.")]
    StyleMissing,
    #[error("Select at least one item to share.")]
    NothingSelected,
}

/// Which code generator fields a share link carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeGeneratorShareOptions {
    pub include_export_options: bool,
    pub include_library: bool,
    pub include_api_key: bool,
    pub force_download: bool,
}

impl Default for CodeGeneratorShareOptions {
    fn default() -> Self {
        Self {
            include_export_options: true,
            include_library: true,
            include_api_key: false,
            force_download: false,
        }
    }
}

/// Share panel toggles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareOptions {
    pub include_style: bool,
    pub include_language: bool,
    pub include_worldview: bool,
    pub include_places: bool,
    pub include_default_panel: bool,
    /// Raw panel id; unknown ids fall back to style selection.
    pub default_panel: String,
    pub code_generator: CodeGeneratorShareOptions,
}

impl Default for ShareOptions {
    fn default() -> Self {
        Self {
            include_style: true,
            include_language: true,
            include_worldview: true,
            include_places: true,
            include_default_panel: true,
            default_panel: ToolPanel::StyleSelection.as_str().to_string(),
            code_generator: CodeGeneratorShareOptions::default(),
        }
    }
}

impl ShareOptions {
    /// Everything toggled off.
    pub fn none() -> Self {
        Self {
            include_style: false,
            include_language: false,
            include_worldview: false,
            include_places: false,
            include_default_panel: false,
            default_panel: String::new(),
            code_generator: CodeGeneratorShareOptions {
                include_export_options: false,
                include_library: false,
                include_api_key: false,
                force_download: false,
            },
        }
    }
}

fn value_or(value: &str, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

/// Share the full configuration.
///
/// Always produces style, parameters and viewport. An empty style is kept as
/// an empty string; callers that need one check for it themselves.
pub fn build_share_config(
    style: &str,
    parameters: &StyleParameters,
    viewport: Option<&Viewport>,
) -> ShareConfig {
    ShareConfig {
        style: Some(style.trim().to_string()),
        parameters: Some(parameters.normalized().into()),
        viewport: Some(viewport.copied().unwrap_or_default().normalized()),
        ui: None,
        code_generator: None,
    }
}

/// Share only the fields enabled in `options`.
pub fn build_selective_share_config(
    style: &str,
    parameters: &StyleParameters,
    viewport: Option<&Viewport>,
    options: &ShareOptions,
    code_generator_state: Option<&CodeGeneratorState>,
) -> Result<ShareConfig, ShareConfigError> {
    let mut config = ShareConfig::default();

    if options.include_style {
        let style = style.trim();
        if style.is_empty() {
            return Err(ShareConfigError::StyleRequired);
        }
        config.style = Some(style.to_string());
    }

    let shared_params = ShareParameters {
        language: options
            .include_language
            .then(|| value_or(&parameters.language, DEFAULT_LANGUAGE)),
        worldview: options
            .include_worldview
            .then(|| value_or(&parameters.worldview, DEFAULT_WORLDVIEW)),
        places: options
            .include_places
            .then(|| value_or(&parameters.places, DEFAULT_PLACES)),
    };
    if !shared_params.is_empty() {
        config.parameters = Some(shared_params);
    }

    if options.include_default_panel {
        config.ui = Some(UiState {
            panel: ToolPanel::normalize(Some(&options.default_panel)),
        });
    }

    if config.ui.map(|ui| ui.panel) == Some(ToolPanel::CodeGenerator) {
        let code_generator = select_code_generator_state(options, code_generator_state);
        if !code_generator.is_empty() {
            config.code_generator = Some(code_generator);
        }
    }

    if let Some(viewport) = viewport {
        if !config.is_empty() {
            config.viewport = Some(viewport.normalized());
        }
    }

    if config.is_empty() {
        return Err(ShareConfigError::NothingSelected);
    }

    debug!(
        "Built selective share config (style: {}, parameters: {}, panel: {:?})",
        config.style.is_some(),
        config.parameters.is_some(),
        config.ui.map(|ui| ui.panel)
    );

    Ok(config)
}

fn select_code_generator_state(
    options: &ShareOptions,
    live: Option<&CodeGeneratorState>,
) -> CodeGeneratorShareState {
    let toggles = options.code_generator;
    let mut shared = CodeGeneratorShareState::default();

    if let Some(live) = live {
        if toggles.include_export_options {
            shared.export_options = Some(live.export_options);
        }

        if toggles.include_library && live.has_library_selection {
            shared.selected_library = Some(live.selected_library);
        }

        let token = live.token.trim();
        if toggles.include_api_key && !token.is_empty() {
            shared.token = Some(token.to_string());
        }
    }

    if toggles.force_download {
        shared.force_download = true;
    }

    let step = derive_code_generator_step(Some(&shared));
    if step > WizardStep::ExportParameters {
        shared.current_step = Some(step);
    }

    shared
}
