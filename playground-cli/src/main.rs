use clap::{Parser, Subcommand, ValueEnum};
use playground_core::capabilities::{sanitize_style_parameters, StyleMetadata};
use playground_core::clipboard::Clipboard;
use playground_core::config_codec::{self, build_share_url};
use playground_core::share_builder::{
    build_selective_share_config, build_share_config, CodeGeneratorShareOptions, ShareConfigError,
    ShareOptions,
};
use playground_core::share_config::{CodeGeneratorLibrary, StyleParameters, Viewport};
use playground_core::shared_config_parser::parse_shared_config_from_url;
use playground_core::style_url::{build_style_url, StyleRequest};
use playground_core::wizard_memory::CodeGeneratorState;
use playground_core::zoom::{convert_zoom_from_maplibre, ZoomConversion};
use playground_core::{PlaygroundConfig, PublishError, SharePublisher};
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Basemap playground share links from the command line.
#[derive(Parser)]
#[command(name = "playground")]
struct Args {
    /// Playground page that share links open.
    #[arg(long, global = true, env = "PLAYGROUND_SHARE_BASE_URL")]
    base_url: Option<String>,

    /// Basemap styles service root.
    #[arg(long, global = true, env = "PLAYGROUND_STYLE_SERVICE_URL")]
    style_service_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encode a JSON config (file or stdin) into a share token.
    Encode { file: Option<PathBuf> },

    /// Decode a share token into JSON.
    Decode {
        token: String,
        #[arg(long)]
        yaml: bool,
    },

    /// Build a share link from playground state.
    Share(ShareArgs),

    /// Read the shared config out of a link.
    Parse {
        url: String,

        /// Style catalog entry (JSON or YAML) to sanitize parameters against.
        #[arg(long)]
        style_metadata: Option<PathBuf>,

        #[arg(long)]
        yaml: bool,
    },

    /// Style URL for the map renderer from a share link.
    StyleUrl {
        url: String,

        /// API key or session token appended to the style URL.
        #[arg(long, env = "PLAYGROUND_API_KEY")]
        token: Option<String>,
    },

    /// Convert a MapLibre zoom level to another library's zoom.
    Zoom {
        #[arg(allow_negative_numbers = true)]
        zoom: f64,

        #[arg(long, default_value = "maplibre")]
        library: String,

        /// Reject unknown libraries instead of falling back to MapLibre.
        #[arg(long)]
        strict: bool,

        #[arg(long)]
        no_clamp: bool,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ShareItem {
    Style,
    Language,
    Worldview,
    Places,
    Panel,
}

#[derive(clap::Args)]
struct ShareArgs {
    #[arg(long, default_value = "")]
    style: String,

    #[arg(long)]
    language: Option<String>,

    #[arg(long)]
    worldview: Option<String>,

    #[arg(long)]
    places: Option<String>,

    /// Map center as `LNG,LAT`.
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    center: Option<Vec<f64>>,

    #[arg(long)]
    zoom: Option<f64>,

    /// Items to share. Shares everything when omitted.
    #[arg(long, value_enum, value_delimiter = ',')]
    include: Vec<ShareItem>,

    /// Panel to open on load. Defaults to style selection.
    #[arg(long, requires = "include")]
    panel: Option<String>,

    /// Code generator library (maplibre or leaflet).
    #[arg(long, requires = "include")]
    library: Option<String>,

    /// API key to include in the code generator preset.
    #[arg(long, requires = "include")]
    api_key: Option<String>,

    #[arg(long, requires = "include")]
    force_download: bool,

    /// Copy the link to the clipboard.
    #[arg(long)]
    copy: bool,
}

impl ShareArgs {
    fn parameters(&self) -> StyleParameters {
        StyleParameters::with_defaults(
            self.language.as_deref(),
            self.worldview.as_deref(),
            self.places.as_deref(),
        )
    }

    fn viewport(&self) -> Option<Viewport> {
        if self.center.is_none() && self.zoom.is_none() {
            return None;
        }
        let mut viewport = Viewport::default();
        match self.center.as_deref() {
            Some([lng, lat]) => viewport.center = [*lng, *lat],
            Some(_) => warn!("Ignoring --center, expected LNG,LAT"),
            None => {}
        }
        if let Some(zoom) = self.zoom {
            viewport.zoom = zoom;
        }
        Some(viewport)
    }

    fn options(&self) -> ShareOptions {
        let has = |item| self.include.contains(&item);
        ShareOptions {
            include_style: has(ShareItem::Style),
            include_language: has(ShareItem::Language),
            include_worldview: has(ShareItem::Worldview),
            include_places: has(ShareItem::Places),
            include_default_panel: has(ShareItem::Panel),
            default_panel: self.panel.clone().unwrap_or_else(|| "style-selection".to_string()),
            code_generator: CodeGeneratorShareOptions {
                include_api_key: self.api_key.is_some(),
                force_download: self.force_download,
                ..Default::default()
            },
        }
    }

    fn code_generator_state(&self) -> CodeGeneratorState {
        let library = self.library.as_deref().and_then(CodeGeneratorLibrary::parse);
        if self.library.is_some() && library.is_none() {
            warn!("Ignoring unknown code generator library");
        }

        let mut state = CodeGeneratorState::default();
        if let Some(library) = library {
            state.selected_library = library;
            state.has_library_selection = true;
        }
        if let Some(api_key) = &self.api_key {
            state.token = api_key.clone();
        }
        state
    }
}

fn configure_logging() {
    use tracing_subscriber::prelude::*;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_line_number(true)
        .with_target(false)
        .with_file(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn print_document<T: Serialize>(value: &T, yaml: bool) {
    let rendered = if yaml {
        serde_yaml::to_string(value).map_err(|e| e.to_string())
    } else {
        serde_json::to_string_pretty(value).map_err(|e| e.to_string())
    };
    match rendered {
        Ok(text) => println!("{}", text.trim_end()),
        Err(e) => {
            error!("Failed to render output: {e}");
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    configure_logging();
    let args = Args::parse();

    let mut config = PlaygroundConfig::load();
    if let Some(base_url) = args.base_url {
        config.share_base_url = base_url;
    }
    if let Some(style_service_url) = args.style_service_url {
        config.style_service_url = style_service_url;
    }

    match args.command {
        Command::Encode { file } => encode(file),
        Command::Decode { token, yaml } => {
            let value: serde_json::Value = config_codec::decode(&token).unwrap_or_else(|e| {
                error!("{e}");
                std::process::exit(1);
            });
            print_document(&value, yaml);
        }
        Command::Share(share) => share_link(&config, &share).await,
        Command::Parse {
            url,
            style_metadata,
            yaml,
        } => parse(&url, style_metadata, yaml),
        Command::StyleUrl { url, token } => {
            let Some(shared) = parse_shared_config_from_url(&url) else {
                error!("No shared config in {url}");
                std::process::exit(1);
            };
            let request = StyleRequest::from_shared(&shared, token.as_deref());
            match build_style_url(&config.style_service_url, &request) {
                Ok(style_url) => println!("{style_url}"),
                Err(e) => {
                    error!("{e}");
                    std::process::exit(1);
                }
            }
        }
        Command::Zoom {
            zoom,
            library,
            strict,
            no_clamp,
        } => {
            let options = ZoomConversion {
                strict,
                clamp: !no_clamp,
            };
            match convert_zoom_from_maplibre(zoom, &library, options) {
                Ok(converted) => println!("{converted}"),
                Err(e) => {
                    error!("{e}");
                    std::process::exit(1);
                }
            }
        }
    }
}

fn encode(file: Option<PathBuf>) {
    let input = match &file {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).map(|_| buf)
        }
    };
    let input = input.unwrap_or_else(|e| {
        error!("Failed to read config: {e}");
        std::process::exit(1);
    });

    let value: serde_json::Value = serde_json::from_str(&input).unwrap_or_else(|e| {
        error!("Config is not valid JSON: {e}");
        std::process::exit(1);
    });

    match config_codec::encode(&value) {
        Ok(token) => println!("{token}"),
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    }
}

async fn share_link(config: &PlaygroundConfig, share: &ShareArgs) {
    let parameters = share.parameters();
    let viewport = share.viewport();
    let selective = !share.include.is_empty();

    if share.copy {
        let publisher = SharePublisher::new(Clipboard::system(), &config.share_base_url);
        let result = if selective {
            publisher
                .share_and_copy_selective(
                    &share.style,
                    &parameters,
                    viewport.as_ref(),
                    &share.options(),
                    Some(&share.code_generator_state()),
                )
                .await
        } else {
            publisher
                .share_and_copy(&share.style, &parameters, viewport.as_ref())
                .await
        };

        match result {
            Ok(url) => {
                info!("Link copied to clipboard");
                println!("{url}");
            }
            Err(PublishError::Clipboard { url }) => {
                println!("{url}");
                error!("Could not copy link automatically. Please copy it manually.");
                std::process::exit(1);
            }
            Err(e) => {
                error!("{e}");
                std::process::exit(1);
            }
        }
        return;
    }

    let built = if selective {
        build_selective_share_config(
            &share.style,
            &parameters,
            viewport.as_ref(),
            &share.options(),
            Some(&share.code_generator_state()),
        )
        .map_err(|e| e.to_string())
    } else if share.style.trim().is_empty() {
        Err(ShareConfigError::StyleMissing.to_string())
    } else {
        Ok(build_share_config(
            &share.style,
            &parameters,
            viewport.as_ref(),
        ))
    };

    let url = built.and_then(|share_config| {
        build_share_url(&share_config, &config.share_base_url).map_err(|e| e.to_string())
    });
    match url {
        Ok(url) => println!("{url}"),
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    }
}

fn parse(url: &str, style_metadata: Option<PathBuf>, yaml: bool) {
    let Some(mut shared) = parse_shared_config_from_url(url) else {
        info!("No shared config in URL");
        return;
    };

    if let Some(path) = style_metadata {
        let metadata = StyleMetadata::load(&path).unwrap_or_else(|e| {
            error!("{e}");
            std::process::exit(1);
        });
        shared.parameters = sanitize_style_parameters(&metadata, &shared.parameters);
    }

    print_document(&shared, yaml);
}
