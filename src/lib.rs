//! # OV580 stereo fisheye camera stream
//!
//! This crate provides the ability to acquire frames from an OV580-based stereo
//! fisheye grayscale camera (the stereo module found in Nreal Light and similar AR
//! glasses), unpack the driver's mis-tagged two-channel pixel layout into a
//! side-by-side pair of grayscale images, and return them for further processing.
//! Under the hood this uses [`rscam`](https://github.com/loyd/rscam) to access cameras over V4L2,
//! therefore currently only Linux is supported.
//!
//! The device reports frames of `width x (height + 1)` two-byte YUYV pixels, where
//! the extra row carries a timestamp and the two bytes of every pixel are really two
//! independent grayscale samples. Captures drop the timestamp row and reclassify the
//! bytes, yielding a `2 * width x height` single-channel frame with the left fisheye
//! view in the first `width` columns and the right view in the rest.
//!
//! ## Dependencies
//!
//! Before installing make sure that the following dependencies are installed:
//!
//! - V4L2 - video for linux 2, including the dev headers
//!
//! ### Ubuntu
//!
//! ```shell
//! sudo apt install v4l-utils libv4l-dev
//! ```
//!
//! ## Installation
//!
//! Once the dependencies are met add the following to your project's `Cargo.toml`
//!
//! ```toml
//! [dependencies]
//! ov580_camstream = "0.1"
//! ```
//!
//! ## Usage
//!
//! Streams are constructed through the builder API:
//!
//! ```rust,no_run
//! use ov580_camstream::prelude::*;
//!
//! let mut camstream = Ov580StreamBuilder::new()
//!     // The path that the device can be found at, which returns a result.
//!     // Alternatively use .device_index(0)
//!     .path("/dev/video0")
//!     .expect("Cannot find camera at specified path")
//!     // Frame geometry, alternatively loaded from a file with .geometry_from_file(...)
//!     .geometry(FrameGeometry::default())
//!     // Construct the object, opening and starting the camera
//!     .build()
//!     .expect("Failed to open camera");
//!
//! let frame = camstream.capture().expect("Failed to get camera frame");
//! let (left, right) = frame.to_luma8_pair();
//! ```

#[deny(missing_docs)]

// -----------------------------------------------------------------------------------------------
// EXPORTS
// -----------------------------------------------------------------------------------------------

pub use builder::{Configurable, Ov580StreamBuilder};
pub use camstream::{CamStream, Ov580Stream};
pub use error::{Error, Result};
pub use frame::{unpack_paired_rows, FrameGeometry, StereoFrame};

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

mod builder;
mod camstream;
mod error;
mod frame;

pub mod prelude {
    pub use crate::{CamStream, Ov580Stream, StereoFrame};
    pub use crate::{Configurable, Ov580StreamBuilder};
    pub use crate::FrameGeometry;
}
