//! Screenshot capture and downscaling.
//!
//! `screencapture` writes a PNG to a single-use temp file; the pipeline
//! reads it back, resamples it to the display's logical dimensions when
//! they differ (HiDPI captures come back at the backing resolution), and
//! hands the result on as base64. Resampling happens in-process so
//! capture needs no second binary.

use std::sync::{Arc, Mutex, OnceLock};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use fast_image_resize::images::{Image, ImageRef};
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::{ImageBuffer, ImageFormat, Rgba};

use crate::display::Display;
use crate::error::{Error, Result};
use crate::result::ActionResult;
use crate::runner::{self, ProcessRunner};

/// Captures one display and normalizes the artifact to logical size.
pub struct ScreenshotPipeline {
    display: Display,
    runner: Arc<dyn ProcessRunner>,
}

impl ScreenshotPipeline {
    pub fn new(display: Display, runner: Arc<dyn ProcessRunner>) -> Self {
        ScreenshotPipeline { display, runner }
    }

    /// Takes a screenshot and returns it base64-encoded in the result.
    ///
    /// Every failure in here is a [`Error::CaptureFailed`]; capture has no
    /// soft-failure mode.
    pub fn capture(&self) -> Result<ActionResult> {
        let file = tempfile::Builder::new()
            .prefix("screenshot_")
            .suffix(".png")
            .tempfile()
            .map_err(|err| Error::CaptureFailed(format!("temp file: {err}")))?;
        let path = file.path();

        // screencapture numbers displays from 1 in enumeration order.
        let quoted_path = runner::quote(&path.to_string_lossy())
            .map_err(|err| Error::CaptureFailed(err.to_string()))?;
        let command = format!("screencapture -C -D {} -x {}", self.display.id + 1, quoted_path);
        let output = self
            .runner
            .run(&command)
            .map_err(|err| Error::CaptureFailed(err.to_string()))?;

        let data = std::fs::read(path).unwrap_or_default();
        if data.is_empty() {
            let detail = if output.stderr.is_empty() {
                format!("no artifact at {}", path.display())
            } else {
                output.stderr.trim().to_string()
            };
            return Err(Error::CaptureFailed(detail));
        }

        // Downscale to logical size only; coordinate capping stays in the
        // mapper and never shrinks the image itself.
        let (width, height) = (self.display.width, self.display.height);
        let png = resample_png(&data, width, height)?;
        tracing::debug!(
            display = self.display.id,
            width,
            height,
            bytes = png.len(),
            "captured screenshot"
        );
        Ok(ActionResult::default().with_image(STANDARD.encode(&png)))
    }
}

static RESIZER: OnceLock<Mutex<Resizer>> = OnceLock::new();

/// Re-encodes `data` at `target_w`x`target_h`, passing it through
/// untouched when the dimensions already match.
fn resample_png(data: &[u8], target_w: u32, target_h: u32) -> Result<Vec<u8>> {
    let decoded = image::load_from_memory(data)
        .map_err(|err| Error::CaptureFailed(format!("PNG decode failed: {err}")))?;
    if decoded.width() == target_w && decoded.height() == target_h {
        return Ok(data.to_vec());
    }

    let rgba = decoded.into_rgba8();
    let (src_w, src_h) = rgba.dimensions();
    let src_image = ImageRef::new(src_w, src_h, rgba.as_raw(), PixelType::U8x4)
        .map_err(|err| Error::CaptureFailed(format!("Resize source error: {err}")))?;
    let mut dst_image = Image::new(target_w, target_h, PixelType::U8x4);
    let options = ResizeOptions::new().resize_alg(ResizeAlg::Interpolation(FilterType::Bilinear));

    let resizer = RESIZER.get_or_init(|| Mutex::new(Resizer::new()));
    resizer
        .lock()
        .map_err(|_| Error::CaptureFailed("Resize lock poisoned".into()))?
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(|err| Error::CaptureFailed(format!("Resize failed: {err}")))?;

    let buffer: ImageBuffer<Rgba<u8>, Vec<u8>> =
        ImageBuffer::from_raw(target_w, target_h, dst_image.into_vec())
            .ok_or_else(|| Error::CaptureFailed("Failed to create image buffer".into()))?;
    let mut png = Vec::new();
    buffer
        .write_to(&mut std::io::Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|err| Error::CaptureFailed(format!("PNG encoding failed: {err}")))?;
    Ok(png)
}
