//! # OV580 Preview Test
//!
//! Designed to test live display of the stereo fisheye stream.

use minifb::{Key, Window, WindowOptions};
use ov580_camstream::prelude::*;

const WIDTH: usize = 640 * 2;
const HEIGHT: usize = 480;

// -----------------------------------------------------------------------------------------------
// MAIN
// -----------------------------------------------------------------------------------------------

#[test]
#[ignore = "requires an OV580 camera at /dev/video0"]
fn preview() -> Result<(), Box<dyn std::error::Error>> {

    // Building the stream first means a missing camera fails the test before any
    // window is created
    let mut camstream = Ov580StreamBuilder::new()
        .path("/dev/video0")?
        .geometry(FrameGeometry::default())
        .build()?;

    let mut buffer: Vec<u32> = vec![0; WIDTH * HEIGHT];

    let mut window = Window::new(
        "OV580",
        WIDTH,
        HEIGHT,
        WindowOptions {
            resize: true,
            ..WindowOptions::default()
        }
    )?;

    window.limit_update_rate(Some(std::time::Duration::from_micros(16600)));

    while window.is_open() && !window.is_key_down(Key::Escape) {
        let frame = camstream.capture()?;

        for (px, luma) in buffer.iter_mut().zip(frame.as_bytes()) {
            *px = luma_to_u32(*luma);
        }

        window.update_with_buffer(&buffer, WIDTH, HEIGHT)?;
    }

    camstream.stop()?;

    Ok(())
}

fn luma_to_u32(luma: u8) -> u32 {
    (luma as u32) << 16 | (luma as u32) << 8 | luma as u32
}
