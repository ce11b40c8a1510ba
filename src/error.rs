use std::path::PathBuf;

/// Result alias for the fallible edges of the app (files, export, terminal)
pub type Result<T> = std::result::Result<T, DotfieldError>;

/// Errors raised outside the simulation core.
///
/// The simulations themselves never fail; only loading/saving files and
/// exporting frames can.
#[derive(thiserror::Error, Debug)]
pub enum DotfieldError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image export failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("gif export failed: {0}")]
    Gif(#[from] gif::EncodingError),

    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("unknown preset: {0}")]
    UnknownPreset(String),

    #[error("unsupported config version {found} in {path}")]
    Version { found: u32, path: PathBuf },

    #[error("export size {width}x{height} is out of range")]
    ExportSize { width: u32, height: u32 },
}
