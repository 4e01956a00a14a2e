//! Turn live playground state into a share link on the clipboard

use crate::clipboard::Clipboard;
use crate::config_codec::{build_share_url, CodecError};
use crate::share_builder::{
    build_selective_share_config, build_share_config, ShareConfigError, ShareOptions,
};
use crate::share_config::{ShareConfig, StyleParameters, Viewport};
use crate::wizard_memory::CodeGeneratorState;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum PublishError {
    #[error(transparent)]
    Build(#[from] ShareConfigError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// The link was built but could not be copied.
    #[error("Could not copy link automatically. Please copy it manually from the address bar.")]
    Clipboard { url: String },
}

/// Builds share links against a base URL and copies them.
#[derive(Clone)]
pub struct SharePublisher {
    clipboard: Clipboard,
    base_url: String,
}

impl SharePublisher {
    pub fn new(clipboard: Clipboard, base_url: impl Into<String>) -> Self {
        Self {
            clipboard,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Share style, parameters and viewport. Requires a style.
    pub async fn share_and_copy(
        &self,
        style: &str,
        parameters: &StyleParameters,
        viewport: Option<&Viewport>,
    ) -> Result<String, PublishError> {
        let config = build_share_config(style, parameters, viewport);
        if config.style.as_deref().unwrap_or_default().is_empty() {
            return Err(ShareConfigError::StyleMissing.into());
        }

        self.publish(&config).await
    }

    /// Share the fields selected in `options`.
    pub async fn share_and_copy_selective(
        &self,
        style: &str,
        parameters: &StyleParameters,
        viewport: Option<&Viewport>,
        options: &ShareOptions,
        code_generator_state: Option<&CodeGeneratorState>,
    ) -> Result<String, PublishError> {
        let config = build_selective_share_config(
            style,
            parameters,
            viewport,
            options,
            code_generator_state,
        )?;

        self.publish(&config).await
    }

    async fn publish(&self, config: &ShareConfig) -> Result<String, PublishError> {
        let url = build_share_url(config, &self.base_url)?;

        if self.clipboard.copy_text(&url).await {
            info!("Share link copied ({} chars)", url.len());
            Ok(url)
        } else {
            warn!("Failed to copy share link to clipboard");
            Err(PublishError::Clipboard { url })
        }
    }
}
