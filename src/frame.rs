//! # Frame Geometry and Unpacking Module
//!
//! This module provides the frame geometry configuration for an OV580 stream, the
//! paired-byte unpack routine which recovers the side-by-side grayscale layout, and
//! the [`StereoFrame`] type returned by captures.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use derive_more::Display;
use image::GrayImage;
use ndarray::{s, ArrayView2};
use serde::Deserialize;

use crate::error::{Error, Result};

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// Geometry of the frames delivered by the camera.
///
/// `width` and `height` describe a single fisheye image. The device packs the left and
/// right images into one frame of `width` two-byte cells per row, and appends one
/// extra row carrying a timestamp below the image, so the resolution requested from
/// V4L2 is `width x (height + 1)`.
#[derive(Clone, Copy, Debug, Deserialize, Display, PartialEq)]
#[display(fmt = "{}x{}@{}fps", width, height, fps)]
pub struct FrameGeometry {
    /// Width of a single fisheye image in pixels, equal to the number of two-byte
    /// cells per captured row.
    pub width: u32,

    /// Height of the image portion of the frame, excluding the metadata row.
    pub height: u32,

    /// Target frame rate.
    pub fps: u32,
}

/// A frame from an OV580 stream containing both fisheye images.
///
/// The images are stored side by side in a single `2 * width x height` grayscale
/// buffer, left eye in columns `0..width`, right eye in columns `width..2 * width`.
pub struct StereoFrame {
    data: Vec<u8>,

    geom: FrameGeometry,

    /// The V4L2 timestamp of the captured frame
    timestamp: u64,
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl Default for FrameGeometry {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            fps: 30,
        }
    }
}

impl FrameGeometry {
    /// Check the geometry once at stream-build time.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidGeometryError(format!(
                "zero-sized frame ({})",
                self
            )));
        }

        if self.fps == 0 {
            return Err(Error::InvalidGeometryError(String::from(
                "frame rate must be non-zero",
            )));
        }

        Ok(())
    }

    /// Number of bytes in one row, identical for the packed input and the unpacked
    /// output.
    pub fn row_bytes(&self) -> usize {
        self.width as usize * 2
    }

    /// Number of bytes in the image portion of a frame.
    pub fn frame_bytes(&self) -> usize {
        self.row_bytes() * self.height as usize
    }

    /// Width of the unpacked frame holding both images.
    pub fn combined_width(&self) -> u32 {
        self.width * 2
    }

    /// The resolution to request from the device, including the metadata row.
    pub fn capture_resolution(&self) -> (u32, u32) {
        (self.width, self.height + 1)
    }

    /// The V4L2 frame interval corresponding to the target frame rate.
    pub fn interval(&self) -> (u32, u32) {
        (1, self.fps)
    }
}

impl StereoFrame {
    /// Wrap an unpacked buffer. `data` must be exactly `geom.frame_bytes()` long.
    pub(crate) fn new(data: Vec<u8>, geom: FrameGeometry, timestamp: u64) -> Self {
        debug_assert_eq!(data.len(), geom.frame_bytes());

        Self {
            data,
            geom,
            timestamp,
        }
    }

    /// Get the width of an individual image in the frame
    pub fn width(&self) -> u32 {
        self.geom.width
    }

    /// Get the height of an individual image in the frame
    pub fn height(&self) -> u32 {
        self.geom.height
    }

    /// Get the width of the combined side-by-side frame
    pub fn combined_width(&self) -> u32 {
        self.geom.combined_width()
    }

    /// Get the V4L2 timestamp of the frame
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// The raw row-major grayscale bytes of the combined frame.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// One row of the combined frame, or `None` if `y` is out of bounds.
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.geom.height {
            return None;
        }

        let offset = y as usize * self.geom.row_bytes();
        self.data.get(offset..offset + self.geom.row_bytes())
    }

    /// View the combined frame as a `height x 2 * width` array.
    pub fn view(&self) -> ArrayView2<u8> {
        ArrayView2::from_shape(
            (self.geom.height as usize, self.geom.row_bytes()),
            &self.data,
        )
        .expect("Frame buffer length does not match its geometry")
    }

    /// View of the left fisheye image.
    pub fn left_view(&self) -> ArrayView2<u8> {
        let width = self.geom.width as usize;

        self.view().slice_move(s![.., ..width])
    }

    /// View of the right fisheye image.
    pub fn right_view(&self) -> ArrayView2<u8> {
        let width = self.geom.width as usize;

        self.view().slice_move(s![.., width..])
    }

    /// Convert the frame into a pair of luma images
    pub fn to_luma8_pair(&self) -> (GrayImage, GrayImage) {
        let width = self.geom.width as usize;
        let mut left = Vec::with_capacity(width * self.geom.height as usize);
        let mut right = Vec::with_capacity(width * self.geom.height as usize);

        for row in self.data.chunks_exact(self.geom.row_bytes()) {
            left.extend_from_slice(&row[..width]);
            right.extend_from_slice(&row[width..]);
        }

        (
            GrayImage::from_raw(self.geom.width, self.geom.height, left)
                .expect("Left image buffer has the wrong size"),
            GrayImage::from_raw(self.geom.width, self.geom.height, right)
                .expect("Right image buffer has the wrong size"),
        )
    }

    /// Convert the frame into a single luma image holding both views side by side.
    pub fn into_combined(self) -> GrayImage {
        GrayImage::from_raw(self.geom.combined_width(), self.geom.height, self.data)
            .expect("Frame buffer length does not match its geometry")
    }
}

// -----------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Unpack the paired-byte rows of a captured frame into `dst`.
///
/// The device reports `geom.width` two-channel pixels per row, but each channel is an
/// independent grayscale sample, so unpacking is a verbatim row copy over whole-row
/// slices. Only the interpretation of the bytes changes, one two-byte cell becomes
/// two one-byte pixels. Bytes past the image rows in `src`, such as the timestamp
/// row the device appends, are ignored.
///
/// `src` must hold at least `geom.frame_bytes()` bytes and `dst` exactly that many.
pub fn unpack_paired_rows(src: &[u8], dst: &mut [u8], geom: &FrameGeometry) -> Result<()> {
    let row_bytes = geom.row_bytes();
    let frame_bytes = geom.frame_bytes();

    if src.len() < frame_bytes {
        return Err(Error::ShortFrameError {
            expected: frame_bytes,
            actual: src.len(),
        });
    }

    if dst.len() != frame_bytes {
        return Err(Error::OutputSizeError {
            expected: frame_bytes,
            actual: dst.len(),
        });
    }

    for (src_row, dst_row) in src[..frame_bytes]
        .chunks_exact(row_bytes)
        .zip(dst.chunks_exact_mut(row_bytes))
    {
        dst_row.copy_from_slice(src_row);
    }

    Ok(())
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {

    use super::*;

    /// A small geometry keeps the test buffers readable, the routine does not care
    /// about the actual dimensions.
    fn small_geom() -> FrameGeometry {
        FrameGeometry {
            width: 4,
            height: 3,
            fps: 30,
        }
    }

    /// Build a packed source frame where every byte is distinct, plus one metadata
    /// row of 0xFF.
    fn packed_src(geom: &FrameGeometry) -> Vec<u8> {
        let mut src: Vec<u8> = (0..geom.frame_bytes()).map(|i| i as u8).collect();
        src.extend(std::iter::repeat(0xFF).take(geom.row_bytes()));
        src
    }

    /// Test that unpacked rows are byte-identical to the source rows
    #[test]
    fn test_identity_copy() {
        let geom = small_geom();
        let src = packed_src(&geom);
        let mut dst = vec![0u8; geom.frame_bytes()];

        unpack_paired_rows(&src, &mut dst, &geom).expect("Unpack failed");

        assert_eq!(dst, src[..geom.frame_bytes()]);
    }

    /// Test that the byte pair of input cell c lands at output columns 2c and 2c + 1
    #[test]
    fn test_interleave_preserved() {
        let geom = small_geom();
        let src = packed_src(&geom);
        let mut dst = vec![0u8; geom.frame_bytes()];

        unpack_paired_rows(&src, &mut dst, &geom).expect("Unpack failed");

        for row in 0..geom.height as usize {
            for cell in 0..geom.width as usize {
                let src_idx = row * geom.row_bytes() + cell * 2;
                let dst_row = &dst[row * geom.row_bytes()..(row + 1) * geom.row_bytes()];

                assert_eq!(dst_row[cell * 2], src[src_idx]);
                assert_eq!(dst_row[cell * 2 + 1], src[src_idx + 1]);
            }
        }
    }

    /// Test that the metadata row never reaches the output
    #[test]
    fn test_metadata_row_ignored() {
        let geom = small_geom();
        let src = packed_src(&geom);
        let mut dst = vec![0u8; geom.frame_bytes()];

        unpack_paired_rows(&src, &mut dst, &geom).expect("Unpack failed");

        assert_eq!(dst.len(), geom.frame_bytes());
        assert!(!dst.contains(&0xFF));
    }

    /// Test that unpacking the same source twice yields identical output
    #[test]
    fn test_idempotent() {
        let geom = small_geom();
        let src = packed_src(&geom);

        let mut first = vec![0u8; geom.frame_bytes()];
        unpack_paired_rows(&src, &mut first, &geom).expect("First unpack failed");

        let mut second = vec![0u8; geom.frame_bytes()];
        unpack_paired_rows(&src, &mut second, &geom).expect("Second unpack failed");

        assert_eq!(first, second);
    }

    /// Test that undersized buffers are rejected rather than read or written out of
    /// bounds
    #[test]
    fn test_buffer_size_errors() {
        let geom = small_geom();
        let src = packed_src(&geom);

        let mut dst = vec![0u8; geom.frame_bytes()];
        match unpack_paired_rows(&src[..geom.frame_bytes() - 1], &mut dst, &geom) {
            Err(Error::ShortFrameError { expected, actual }) => {
                assert_eq!(expected, geom.frame_bytes());
                assert_eq!(actual, geom.frame_bytes() - 1);
            }
            other => panic!("Expected ShortFrameError, got {:?}", other),
        }

        let mut short_dst = vec![0u8; geom.frame_bytes() - 1];
        match unpack_paired_rows(&src, &mut short_dst, &geom) {
            Err(Error::OutputSizeError { .. }) => (),
            other => panic!("Expected OutputSizeError, got {:?}", other),
        }
    }

    /// Test that the left and right views split the frame down the middle
    #[test]
    fn test_left_right_split() {
        let geom = small_geom();
        let src = packed_src(&geom);
        let mut dst = vec![0u8; geom.frame_bytes()];
        unpack_paired_rows(&src, &mut dst, &geom).expect("Unpack failed");

        let frame = StereoFrame::new(dst, geom, 0);

        let left = frame.left_view();
        let right = frame.right_view();
        assert_eq!(left.dim(), (3, 4));
        assert_eq!(right.dim(), (3, 4));

        for row in 0..geom.height as usize {
            let full = frame.row(row as u32).expect("Missing row");

            for col in 0..geom.width as usize {
                assert_eq!(left[[row, col]], full[col]);
                assert_eq!(right[[row, col]], full[geom.width as usize + col]);
            }
        }

        let (left_img, right_img) = frame.to_luma8_pair();
        assert_eq!(left_img.dimensions(), (4, 3));
        assert_eq!(right_img.dimensions(), (4, 3));
        assert_eq!(left_img.get_pixel(0, 1)[0], frame.row(1).unwrap()[0]);
        assert_eq!(right_img.get_pixel(0, 1)[0], frame.row(1).unwrap()[4]);
    }

    /// Test the default OV580 geometry and its derived sizes
    #[test]
    fn test_default_geometry() {
        let geom = FrameGeometry::default();

        assert_eq!(geom.row_bytes(), 1280);
        assert_eq!(geom.frame_bytes(), 1280 * 480);
        assert_eq!(geom.combined_width(), 1280);
        assert_eq!(geom.capture_resolution(), (640, 481));
        assert_eq!(geom.interval(), (1, 30));
        assert_eq!(format!("{}", geom), "640x480@30fps");
    }

    /// Test that degenerate geometries fail validation
    #[test]
    fn test_validate() {
        assert!(FrameGeometry::default().validate().is_ok());

        let zero_width = FrameGeometry {
            width: 0,
            ..FrameGeometry::default()
        };
        assert!(zero_width.validate().is_err());

        let zero_fps = FrameGeometry {
            fps: 0,
            ..FrameGeometry::default()
        };
        assert!(zero_fps.validate().is_err());
    }

    /// Test that out of bounds rows are rejected
    #[test]
    fn test_row_bounds() {
        let geom = small_geom();
        let frame = StereoFrame::new(vec![0u8; geom.frame_bytes()], geom, 0);

        assert!(frame.row(2).is_some());
        assert!(frame.row(3).is_none());
    }
}
