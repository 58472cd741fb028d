//! # `Ov580StreamBuilder` implementation
//!
//! This module implements the builder for OV580 stream objects.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use std::path::{Path, PathBuf};

use log::{debug, info};
use rscam::Config;
use serde::de::DeserializeOwned;
use serde_any;

use crate::camstream::Ov580Stream;
use crate::error::{Error, Result};
use crate::frame::FrameGeometry;

// -----------------------------------------------------------------------------------------------
// TRAITS
// -----------------------------------------------------------------------------------------------

/// Provides common methods for configuring a stream builder from a file.
pub trait Configurable: Sized {
    /// The parameters to be used, must be deserialisable.
    type Params: DeserializeOwned;

    fn geometry(self, params: Self::Params) -> Self;

    /// Load the frame geometry from a file.
    ///
    /// The file type will be guessed at runtime, any file type supported by
    /// [`serde_any`](https://docs.rs/serde_any/0.5.0/serde_any/) is supported, but it must be
    /// deserialisable into `Self::Params`.
    fn geometry_from_file<P: AsRef<Path>>(self, path: P) -> Result<Self> {
        // Check the file exists
        if !path.as_ref().exists() {
            return Err(Error::FileNotFound(path.as_ref().to_path_buf()));
        }

        // Load the parameters from the file, guessing which format they're in using serde_any
        let p = serde_any::from_file(path).map_err(Error::DeserialisationError)?;

        Ok(self.geometry(p))
    }
}

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

///
pub struct Ov580StreamBuilder {
    path: Option<PathBuf>,

    geom: FrameGeometry,

    num_buffers: u32,
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl Ov580StreamBuilder {
    pub fn new() -> Self {
        Self {
            path: None,
            geom: FrameGeometry::default(),
            num_buffers: 2,
        }
    }

    /// Specify the path of the camera, i.e. the device path, such as `/dev/video1`
    ///
    /// # Returns
    /// - `self` if the path exists, `Err` otherwise
    pub fn path<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        if path.as_ref().exists() {
            self.path = Some(path.as_ref().to_path_buf());

            Ok(self)
        } else {
            Err(Error::FileNotFound(path.as_ref().to_path_buf()))
        }
    }

    /// Specify the camera by V4L2 device index, equivalent to `.path("/dev/video{index}")`.
    ///
    /// # Returns
    /// - `self` if the device exists, `Err` otherwise
    pub fn device_index(self, index: usize) -> Result<Self> {
        self.path(format!("/dev/video{}", index))
    }

    /// Set the number of buffers in the queue for the camera.
    ///
    /// Default value is 2.
    pub fn num_buffers(mut self, num_buffers: u32) -> Self {
        self.num_buffers = num_buffers;

        self
    }

    /// Build the OV580 stream object.
    ///
    /// Configures the device for packed two-channel capture (`YUYV` fourcc, so the
    /// driver applies no colour conversion) at the geometry's resolution plus the
    /// metadata row, then starts streaming.
    ///
    /// # Returns
    /// - [`Error::DeviceOpenError`] if the device cannot be opened
    /// - [`Error::CamStartError`] if the underlying V4L2 stream cannot be started
    pub fn build(self) -> Result<Ov580Stream> {
        // Confirm that the required path is present
        let path = match self.path {
            Some(p) => p,
            None => return Err(Error::CamStreamBuildError(String::from("Missing camera path"))),
        };

        self.geom.validate()?;

        let mut camera = rscam::Camera::new(
            path.to_str().ok_or_else(|| {
                Error::CamStreamBuildError(format!("Cannot convert {:?} to &str", path))
            })?,
        )
        .map_err(Error::DeviceOpenError)?;

        // The device appends one timestamp row below the image, so capture runs at
        // width x (height + 1)
        let config = Config {
            interval: self.geom.interval(),
            resolution: self.geom.capture_resolution(),
            format: b"YUYV",
            nbuffers: self.num_buffers,
            ..Default::default()
        };

        debug!(
            "OV580 capture config: {} (+1 metadata row), {} buffers",
            self.geom, self.num_buffers
        );

        camera.start(&config).map_err(Error::CamStartError)?;

        info!("OV580 stream started on {}", path.display());

        Ok(Ov580Stream::new(camera, self.geom))
    }
}

impl Configurable for Ov580StreamBuilder {
    type Params = FrameGeometry;

    fn geometry(mut self, params: Self::Params) -> Self {
        self.geom = params;

        self
    }
}

impl Default for Ov580StreamBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
