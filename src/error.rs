use thiserror::Error;

#[derive(Debug, Error)]
pub enum OctExtractError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Format error: {0}")]
    FormatError(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Crop out of bounds: {0}")]
    CropOutOfBounds(String),

    #[error("Invalid output directory: {0}")]
    InvalidOutputDirectory(String),

    #[error("Encode error: {0}")]
    EncodeError(String),

    #[error("Preset not found: {0}")]
    PresetNotFound(String),

    #[error("Preset store error: {0}")]
    PresetStoreError(String),

    #[error("Frame index out of range: {0}")]
    IndexOutOfRange(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Generates factory methods for [`OctExtractError`] variants that wrap a `String`.
macro_rules! error_constructors {
    ($(
        $(#[doc = $doc:expr])*
        $method:ident => $variant:ident
    ),* $(,)?) => {
        impl OctExtractError {
            $(
                $(#[doc = $doc])*
                pub fn $method(msg: impl Into<String>) -> Self {
                    Self::$variant(msg.into())
                }
            )*
        }
    };
}

error_constructors! {
    /// Create a configuration error.
    config => ConfigError,
    /// Create a scan format error.
    format => FormatError,
    /// Create an invalid parameter error.
    invalid_parameter => InvalidParameter,
    /// Create a crop bounds error.
    crop_out_of_bounds => CropOutOfBounds,
    /// Create an invalid output directory error.
    invalid_output_dir => InvalidOutputDirectory,
    /// Create an encode error.
    encode => EncodeError,
    /// Create a preset store error.
    preset_store => PresetStoreError,
    /// Create a frame index error.
    index_out_of_range => IndexOutOfRange,
}

impl From<image::ImageError> for OctExtractError {
    fn from(e: image::ImageError) -> Self {
        Self::EncodeError(e.to_string())
    }
}

impl From<serde_json::Error> for OctExtractError {
    fn from(e: serde_json::Error) -> Self {
        Self::PresetStoreError(e.to_string())
    }
}

impl From<serde_yml::Error> for OctExtractError {
    fn from(e: serde_yml::Error) -> Self {
        Self::ConfigError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, OctExtractError>;
