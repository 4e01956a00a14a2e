//! Session memory for the code generator wizard
//!
//! The wizard remembers where the user left it so reopening the panel picks
//! up at the same step. The memory is an owned value handed to whoever mounts
//! the wizard; there is no global.

use crate::share_config::{CodeGeneratorLibrary, CodeGeneratorShareState, ExportOptions, WizardStep};
use tracing::debug;

/// Live code generator wizard state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeGeneratorState {
    pub selected_library: CodeGeneratorLibrary,
    /// False until the user actually picks a library; `selected_library`
    /// holds the preselected default before that.
    pub has_library_selection: bool,
    pub token: String,
    pub show_token: bool,
    pub has_accepted_token_warning: bool,
    pub current_step: WizardStep,
    pub export_options: ExportOptions,
    /// One-shot: download the sample as soon as the wizard opens.
    pub force_download: bool,
}

impl Default for CodeGeneratorState {
    fn default() -> Self {
        Self {
            selected_library: CodeGeneratorLibrary::Maplibre,
            has_library_selection: false,
            token: String::new(),
            show_token: false,
            has_accepted_token_warning: false,
            current_step: WizardStep::ExportParameters,
            export_options: ExportOptions::default(),
            force_download: false,
        }
    }
}

/// Remembered wizard state for one session.
#[derive(Debug, Clone, Default)]
pub struct WizardMemory {
    state: CodeGeneratorState,
}

impl WizardMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.state = CodeGeneratorState::default();
    }

    pub fn snapshot(&self) -> &CodeGeneratorState {
        &self.state
    }

    /// Remember the wizard state after a field change. `force_download` is
    /// never carried over to the next mount.
    pub fn record(&mut self, state: CodeGeneratorState) {
        self.state = CodeGeneratorState {
            force_download: false,
            ..state
        };
    }

    /// Initial wizard state on mount: the remembered state with any fields
    /// from a shared preset laid on top.
    pub fn hydrate(&self, shared: Option<&CodeGeneratorShareState>) -> CodeGeneratorState {
        let Some(preset) = shared.filter(|p| !p.is_empty()) else {
            return self.state.clone();
        };

        debug!("Hydrating code generator from shared preset");

        let memory = &self.state;
        CodeGeneratorState {
            selected_library: preset.selected_library.unwrap_or(memory.selected_library),
            has_library_selection: preset.has_library_selection() || memory.has_library_selection,
            token: preset.token.clone().unwrap_or_else(|| memory.token.clone()),
            show_token: memory.show_token,
            has_accepted_token_warning: preset.has_accepted_token_warning()
                || memory.has_accepted_token_warning,
            current_step: preset.current_step.unwrap_or(memory.current_step),
            export_options: preset.export_options.unwrap_or(memory.export_options),
            force_download: preset.force_download,
        }
    }
}
