//! Coordinate translation between agent space and device space.
//!
//! Models see and address the screen in a canonical low resolution so their
//! coordinate arithmetic stays in a range they handle well. Each display is
//! mapped to the first canonical target that matches its aspect ratio, and
//! only when that actually shrinks the image; everything else is identity.

use crate::display::Display;
use crate::error::{Error, Result};

/// A canonical resolution the agent coordinate space can be capped at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalingTarget {
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
}

impl ScalingTarget {
    fn ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

/// Candidate targets in scan order: 4:3, 16:10, ~16:9.
pub const SCALING_TARGETS: &[ScalingTarget] = &[
    ScalingTarget {
        name: "XGA",
        width: 1024,
        height: 768,
    },
    ScalingTarget {
        name: "WXGA",
        width: 1280,
        height: 800,
    },
    ScalingTarget {
        name: "FWXGA",
        width: 1366,
        height: 768,
    },
];

const RATIO_TOLERANCE: f64 = 0.02;

/// Bidirectional mapping between agent coordinates (relative to one
/// display, possibly capped to a [`ScalingTarget`]) and global device
/// coordinates (shared by every display, in points).
#[derive(Debug, Clone, Copy)]
pub struct CoordinateMapper {
    display: Display,
    scaled_width: u32,
    scaled_height: u32,
    // canonical / display, 1.0 under identity
    x_scale: f64,
    y_scale: f64,
}

impl CoordinateMapper {
    pub fn new(display: Display) -> Self {
        let ratio = display.width as f64 / display.height as f64;
        let target = SCALING_TARGETS
            .iter()
            .find(|t| (t.ratio() - ratio).abs() < RATIO_TOLERANCE);
        match target {
            // The first ratio match decides; it only applies when it shrinks.
            Some(t) if t.width < display.width => CoordinateMapper {
                display,
                scaled_width: t.width,
                scaled_height: t.height,
                x_scale: t.width as f64 / display.width as f64,
                y_scale: t.height as f64 / display.height as f64,
            },
            _ => CoordinateMapper {
                display,
                scaled_width: display.width,
                scaled_height: display.height,
                x_scale: 1.0,
                y_scale: 1.0,
            },
        }
    }

    /// Dimensions of the agent coordinate space for this display.
    pub fn scaled_size(&self) -> (u32, u32) {
        (self.scaled_width, self.scaled_height)
    }

    pub fn is_identity(&self) -> bool {
        self.scaled_width == self.display.width && self.scaled_height == self.display.height
    }

    /// Agent coordinate → global device coordinate.
    ///
    /// Bounds are checked against the scaled dimensions before anything
    /// else; the edge itself (`x == width`) is in bounds.
    pub fn to_device(&self, x: u32, y: u32) -> Result<(i32, i32)> {
        if x > self.scaled_width || y > self.scaled_height {
            return Err(Error::OutOfBounds { x, y });
        }
        let dx = (x as f64 / self.x_scale).round() as i32 + self.display.origin_x;
        let dy = (y as f64 / self.y_scale).round() as i32 + self.display.origin_y;
        Ok((dx, dy))
    }

    /// Global device coordinate → agent coordinate.
    ///
    /// Positions left of or above this display clamp to the agent-space
    /// edge, so agent coordinates are never negative.
    pub fn to_agent(&self, x: i32, y: i32) -> (u32, u32) {
        let local_x = (x - self.display.origin_x).max(0) as f64;
        let local_y = (y - self.display.origin_y).max(0) as f64;
        (
            (local_x * self.x_scale).round() as u32,
            (local_y * self.y_scale).round() as u32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wqxga_display_caps_to_wxga() {
        let mapper = CoordinateMapper::new(Display::new(0, 2560, 1600));
        assert_eq!(mapper.scaled_size(), (1280, 800));
        assert_eq!(mapper.to_device(640, 400).unwrap(), (1280, 800));
        assert_eq!(mapper.to_agent(1280, 800), (640, 400));
        // The far corner maps edge to edge in both directions.
        assert_eq!(mapper.to_device(1280, 800).unwrap(), (2560, 1600));
        assert_eq!(mapper.to_agent(2560, 1600), (1280, 800));
    }

    #[test]
    fn full_hd_display_caps_to_fwxga() {
        let mapper = CoordinateMapper::new(Display::new(0, 1920, 1080));
        assert_eq!(mapper.scaled_size(), (1366, 768));
        assert!(!mapper.is_identity());
    }

    #[test]
    fn small_display_keeps_identity() {
        // XGA matches the 4:3 ratio but would not shrink anything.
        let mapper = CoordinateMapper::new(Display::new(0, 1024, 768));
        assert_eq!(mapper.scaled_size(), (1024, 768));
        assert!(mapper.is_identity());

        let mapper = CoordinateMapper::new(Display::new(0, 800, 600));
        assert_eq!(mapper.scaled_size(), (800, 600));
    }

    #[test]
    fn odd_ratio_display_keeps_identity() {
        // 2:1 is outside every target's tolerance band.
        let mapper = CoordinateMapper::new(Display::new(0, 3200, 1600));
        assert_eq!(mapper.scaled_size(), (3200, 1600));
    }

    #[test]
    fn round_trips_stay_within_one_unit() {
        let mapper = CoordinateMapper::new(Display::new(0, 1920, 1080));
        for &x in &[0u32, 1, 137, 500, 683, 1365, 1366] {
            for &y in &[0u32, 1, 99, 384, 767, 768] {
                let (dx, dy) = mapper.to_device(x, y).unwrap();
                let (rx, ry) = mapper.to_agent(dx, dy);
                assert!(rx.abs_diff(x) <= 1, "x: {x} -> {dx} -> {rx}");
                assert!(ry.abs_diff(y) <= 1, "y: {y} -> {dy} -> {ry}");
            }
        }
    }

    #[test]
    fn bounds_check_is_strictly_greater_than() {
        let mapper = CoordinateMapper::new(Display::new(0, 2560, 1600));
        assert!(mapper.to_device(1280, 800).is_ok());
        assert!(matches!(
            mapper.to_device(1281, 800),
            Err(Error::OutOfBounds { x: 1281, y: 800 })
        ));
        assert!(matches!(
            mapper.to_device(0, 801),
            Err(Error::OutOfBounds { .. })
        ));
    }

    #[test]
    fn out_of_bounds_message_names_the_coordinates() {
        let mapper = CoordinateMapper::new(Display::new(0, 1280, 800));
        let err = mapper.to_device(4000, 50).unwrap_err();
        assert_eq!(err.to_string(), "Coordinates 4000, 50 are out of bounds");
    }

    #[test]
    fn origin_offset_lands_in_global_space() {
        let display = Display::new(1, 1280, 800).with_origin(1920, 0);
        let mapper = CoordinateMapper::new(display);
        assert_eq!(mapper.to_device(10, 10).unwrap(), (1930, 10));
        assert_eq!(mapper.to_agent(1930, 10), (10, 10));
    }

    #[test]
    fn negative_origin_round_trips() {
        let display = Display::new(1, 2560, 1600).with_origin(-2560, -300);
        let mapper = CoordinateMapper::new(display);
        let (dx, dy) = mapper.to_device(0, 0).unwrap();
        assert_eq!((dx, dy), (-2560, -300));
        assert_eq!(mapper.to_agent(dx, dy), (0, 0));
    }

    #[test]
    fn agent_coordinates_clamp_at_zero() {
        let display = Display::new(1, 1280, 800).with_origin(1920, 0);
        let mapper = CoordinateMapper::new(display);
        // Pointer parked on the display to the left.
        assert_eq!(mapper.to_agent(500, 40), (0, 40));
    }
}
