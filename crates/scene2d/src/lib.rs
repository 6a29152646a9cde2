use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
pub mod content;
pub mod geometry;
pub mod scene;

pub use app::{
    run_windowed, run_windowed_with_metrics, CameraWindow, Controller2D, DrawingSurface, Engine,
    FrameBuffer, FrameReport, FrameScheduler, FrameToken, HostError, LoopConfig, MetricsHandle,
    PixelsSurface, RenderMetricsSnapshot, TimerScheduler, Viewport,
};
pub use content::{
    CacheLookup, DataCache, DataEntry, FileImageLoader, ImageLoader, LoadError, LoadProgress,
    LoadStatus,
};
pub use geometry::{CanvasColor, Point2D, Rotation2D, Vector2D};
pub use image::RgbaImage;
pub use scene::{
    ActiveObject2D, ActiveObjectSettings, ActiveSource, Background2D, BackgroundData, Grid2D,
    GridSettings, Key, Layer2D, Map2D, PassiveObject2D, PassiveObjectSettings, SceneError,
    SceneObject,
};

pub const ASSET_ROOT_ENV_VAR: &str = "SCENE2D_ASSET_ROOT";

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current directory: {0}")]
    CurrentDir(#[source] std::io::Error),
    #[error("{var} is set but does not point to a directory: {path}")]
    InvalidEnvRoot { var: &'static str, path: PathBuf },
}

/// Directory image sources are resolved against: `SCENE2D_ASSET_ROOT` when
/// set, otherwise the current working directory.
pub fn resolve_asset_root() -> Result<PathBuf, StartupError> {
    match env::var(ASSET_ROOT_ENV_VAR) {
        Ok(value) => asset_root_from_value(&value),
        Err(env::VarError::NotPresent) => {
            let cwd = env::current_dir().map_err(StartupError::CurrentDir)?;
            Ok(normalize_path(&cwd))
        }
        Err(source) => Err(StartupError::EnvVar {
            var: ASSET_ROOT_ENV_VAR,
            source,
        }),
    }
}

fn asset_root_from_value(value: &str) -> Result<PathBuf, StartupError> {
    let normalized = normalize_path(Path::new(value));
    if normalized.is_dir() {
        Ok(normalized)
    } else {
        Err(StartupError::InvalidEnvRoot {
            var: ASSET_ROOT_ENV_VAR,
            path: normalized,
        })
    }
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
