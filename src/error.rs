//! # `ov580_camstream` Error module
//!
//! Provides abstractions over errors which can occur during this crate's use.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use std::path::PathBuf;

use rscam;
use serde_any;
use thiserror;

// -----------------------------------------------------------------------------------------------
// ENUMERATIONS
// -----------------------------------------------------------------------------------------------

/// Result type used by faillible functions inside the `ov580_camstream` crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents errors which can occur during use of the `ov580_camstream` crate.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Cannot find file at {0:?}")]
    FileNotFound(PathBuf),

    #[error("Error deserialising data: {0}")]
    DeserialisationError(serde_any::Error),

    #[error("Invalid frame geometry: {0}")]
    InvalidGeometryError(String),

    #[error("Cannot build camera stream: {0}")]
    CamStreamBuildError(String),

    #[error("Cannot open camera device: {0}")]
    DeviceOpenError(std::io::Error),

    #[error("Cannot start camera stream: {0:?}")]
    CamStartError(rscam::Error),

    #[error("Error capturing camera frame: {0}")]
    CameraCaptureError(std::io::Error),

    #[error("Error stopping camera stream: {0}")]
    CamStopError(std::io::Error),

    #[error("Captured frame holds {actual} bytes but its geometry requires at least {expected}")]
    ShortFrameError { expected: usize, actual: usize },

    #[error("Output buffer holds {actual} bytes but the frame geometry requires exactly {expected}")]
    OutputSizeError { expected: usize, actual: usize },
}
