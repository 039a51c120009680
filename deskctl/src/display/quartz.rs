//! CoreGraphics-backed display provider.
//!
//! `CGDisplayBounds` already reports global coordinates with the origin at
//! the main display's top-left corner, so the offsets map straight onto
//! [`Display`] with no axis flip.

use core_graphics::display::CGDisplay;

use crate::display::{Display, DisplayProvider};
use crate::error::{Error, Result};

pub struct QuartzDisplays;

impl DisplayProvider for QuartzDisplays {
    fn displays(&self) -> Result<Vec<Display>> {
        let ids = CGDisplay::active_displays()
            .map_err(|code| Error::DisplayQueryFailed(format!("CGGetActiveDisplayList ({code})")))?;

        let mut displays = Vec::with_capacity(ids.len());
        for (index, id) in ids.into_iter().enumerate() {
            let screen = CGDisplay::new(id);
            let bounds = screen.bounds();
            let width = bounds.size.width.round() as u32;
            let height = bounds.size.height.round() as u32;
            let scale_factor = screen
                .display_mode()
                .filter(|_| width > 0)
                .map(|mode| mode.pixel_width() as f64 / width as f64)
                .unwrap_or(1.0);
            displays.push(Display {
                id: index as u32,
                width,
                height,
                origin_x: bounds.origin.x.round() as i32,
                origin_y: bounds.origin.y.round() as i32,
                scale_factor,
            });
        }
        Ok(displays)
    }
}
