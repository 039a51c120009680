//! Display enumeration and lookup.
//!
//! Geometry comes in through the [`DisplayProvider`] port so the rest of the
//! crate never talks to the window server directly. The macOS binding lives
//! in [`quartz`]; tests and dry runs use [`StaticDisplays`].

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::scaling::CoordinateMapper;

#[cfg(target_os = "macos")]
pub mod quartz;

/// One connected display in logical (point) units.
///
/// `origin_x`/`origin_y` place the display's top-left corner in the global
/// device coordinate space anchored at the main display's top-left corner.
/// Displays left of or above the main display have negative origins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Display {
    /// Zero-based enumeration index; `screencapture` numbers the same
    /// displays from 1.
    pub id: u32,
    pub width: u32,
    pub height: u32,
    pub origin_x: i32,
    pub origin_y: i32,
    /// Backing pixels per point, 1.0 for non-HiDPI panels.
    pub scale_factor: f64,
}

impl Display {
    /// A display at the global origin with no HiDPI backing. Offsets and
    /// scale are layered on with the `with_*` builders.
    pub fn new(id: u32, width: u32, height: u32) -> Self {
        Display {
            id,
            width,
            height,
            origin_x: 0,
            origin_y: 0,
            scale_factor: 1.0,
        }
    }

    pub fn with_origin(mut self, x: i32, y: i32) -> Self {
        self.origin_x = x;
        self.origin_y = y;
        self
    }

    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// Human-readable one-liner for CLI listings. The number shown is the
    /// zero-based index `resolve` and the `--display` flag take.
    pub fn description(&self) -> String {
        format!(
            "Display {} ({}x{} @ {},{})",
            self.id, self.width, self.height, self.origin_x, self.origin_y
        )
    }
}

/// Source of display geometry.
pub trait DisplayProvider: Send + Sync {
    /// Connected displays in a stable order, main display first.
    fn displays(&self) -> Result<Vec<Display>>;
}

/// Provider over a fixed list. Fixture for tests and non-macOS builds.
pub struct StaticDisplays(Vec<Display>);

impl StaticDisplays {
    pub fn new(displays: Vec<Display>) -> Self {
        StaticDisplays(displays)
    }
}

impl DisplayProvider for StaticDisplays {
    fn displays(&self) -> Result<Vec<Display>> {
        Ok(self.0.clone())
    }
}

/// Index-based lookup over a [`DisplayProvider`].
///
/// The registry re-queries the provider on every call so hotplugged
/// displays are picked up without a restart. `resolve` is strict; falling
/// back to another display on a bad index is the caller's decision.
pub struct DisplayRegistry {
    provider: Box<dyn DisplayProvider>,
}

impl DisplayRegistry {
    pub fn new(provider: Box<dyn DisplayProvider>) -> Self {
        DisplayRegistry { provider }
    }

    /// Registry over the native window server. Off macOS there is nothing
    /// to enumerate and every lookup reports zero available displays.
    pub fn platform() -> Self {
        #[cfg(target_os = "macos")]
        {
            DisplayRegistry::new(Box::new(quartz::QuartzDisplays))
        }
        #[cfg(not(target_os = "macos"))]
        {
            DisplayRegistry::new(Box::new(StaticDisplays::new(Vec::new())))
        }
    }

    pub fn list(&self) -> Result<Vec<Display>> {
        self.provider.displays()
    }

    pub fn resolve(&self, index: u32) -> Result<Display> {
        let displays = self.provider.displays()?;
        displays
            .get(index as usize)
            .copied()
            .ok_or(Error::DisplayNotFound {
                index,
                available: displays.len(),
            })
    }

    pub fn mapper(&self, index: u32) -> Result<CoordinateMapper> {
        Ok(CoordinateMapper::new(self.resolve(index)?))
    }
}
