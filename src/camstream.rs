//! # Camera Stream Module
//!
//! This module provides the stream object wrapping an OV580 stereo fisheye camera
//! and the trait through which frames are captured.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use std::time::Instant;

use log::{info, trace};
use rscam::Camera;

use crate::error::{Error, Result};
use crate::frame::{unpack_paired_rows, FrameGeometry, StereoFrame};

// -----------------------------------------------------------------------------------------------
// TRAITS
// -----------------------------------------------------------------------------------------------

pub trait CamStream {
    type Frame;

    /// Capture a frame from the camera stream.
    fn capture(&mut self) -> Result<Self::Frame>;
}

// -----------------------------------------------------------------------------------------------
// DATA STRUCTS
// -----------------------------------------------------------------------------------------------

/// A running OV580 stream.
///
/// The device delivers both fisheye views in one frame whose pixels are tagged as
/// two-channel YUYV, each channel actually being an independent grayscale sample.
/// Every captured frame is unpacked into a [`StereoFrame`] before being returned.
///
/// The stream exclusively owns the camera. Captures block on the V4L2 read and run
/// entirely on the calling thread.
pub struct Ov580Stream {
    camera: Camera,

    geom: FrameGeometry,
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl Ov580Stream {
    /// Create a new instance of the stream over a started camera.
    pub(crate) fn new(camera: Camera, geom: FrameGeometry) -> Self {
        Self { camera, geom }
    }

    /// The geometry the stream was configured with.
    pub fn geometry(&self) -> &FrameGeometry {
        &self.geom
    }

    /// Stop the stream and release the device.
    pub fn stop(mut self) -> Result<()> {
        self.camera.stop().map_err(Error::CamStopError)?;

        info!("OV580 stream stopped");

        Ok(())
    }
}

impl CamStream for Ov580Stream {
    type Frame = StereoFrame;

    /// Capture a frame from the camera.
    ///
    /// Blocks until the device delivers the next frame, drops the trailing metadata
    /// row and unpacks the paired-byte rows into a side-by-side grayscale frame. A
    /// read failure is returned as [`Error::CameraCaptureError`], leaving the caller
    /// to decide whether to retry or stop the stream.
    fn capture(&mut self) -> Result<Self::Frame> {
        let raw = self.camera.capture().map_err(Error::CameraCaptureError)?;

        let timestamp = raw.get_timestamp();

        let start = Instant::now();

        let mut data = vec![0u8; self.geom.frame_bytes()];
        unpack_paired_rows(&raw, &mut data, &self.geom)?;

        trace!("Unpacked frame in {}us", start.elapsed().as_micros());

        Ok(StereoFrame::new(data, self.geom, timestamp))
    }
}
