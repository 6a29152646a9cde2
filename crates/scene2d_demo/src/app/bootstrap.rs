use scene2d::{resolve_asset_root, LoopConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    /// Image sources from the command line, relative to the asset root or `data:` URLs.
    pub(crate) image_sources: Vec<String>,
}

pub(crate) fn build_app(args: Vec<String>) -> AppWiring {
    init_tracing();
    info!("=== scene2d demo startup ===");

    let mut config = LoopConfig {
        window_title: "scene2d demo".to_string(),
        ..LoopConfig::default()
    };
    match resolve_asset_root() {
        Ok(root) => config.asset_root = root,
        Err(err) => warn!(error = %err, "asset_root_unresolved; using default"),
    }

    let image_sources = parse_image_sources(args);
    info!(
        image_count = image_sources.len(),
        asset_root = %config.asset_root.display(),
        "demo_config"
    );

    AppWiring {
        config,
        image_sources,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn parse_image_sources(args: Vec<String>) -> Vec<String> {
    args.into_iter()
        .map(|arg| arg.trim().to_string())
        .filter(|arg| !arg.is_empty())
        .collect()
}
