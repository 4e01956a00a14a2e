//! Shareable playground state: share links that carry a selected basemap
//! style, its parameters, the viewport and code-generator progress.

pub mod capabilities;
pub mod clipboard;
pub mod config;
pub mod config_codec;
pub mod share_builder;
pub mod share_config;
pub mod share_publisher;
pub mod shared_config_parser;
pub mod style_url;
pub mod wizard_memory;
pub mod zoom;

pub use config::PlaygroundConfig;
pub use config_codec::CodecError;
pub use share_builder::{ShareConfigError, ShareOptions};
pub use share_config::{ShareConfig, SharedConfig, StyleParameters, Viewport};
pub use share_publisher::{PublishError, SharePublisher};
pub use shared_config_parser::parse_shared_config_from_url;
