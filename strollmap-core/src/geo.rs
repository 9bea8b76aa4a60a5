//! Geographic and pixel-space geometry.
//!
//! Converts the on-screen print frame into a geographic bounding box through
//! the host map's projection. Pixel rectangles are axis-aligned and expressed
//! in viewport pixels; [`frame_bounds`] translates them into the map
//! container's coordinate space before unprojecting.

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

/// Default initial view center (Tokyo).
pub const DEFAULT_CENTER: LatLng = LatLng {
    lat: 35.6895,
    lng: 139.6917,
};

/// Default initial zoom level.
pub const DEFAULT_ZOOM: f64 = 13.0;

/// Maximum zoom supported by the street tile source.
pub const MAX_TILE_ZOOM: f64 = 19.0;

/// A geographic coordinate pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Longitude in degrees, positive east.
    pub lng: f64,
}

impl LatLng {
    /// Create a coordinate pair.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A geographic bounding box normalized to south-west / north-east corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    /// South-west-most corner.
    pub south_west: LatLng,
    /// North-east-most corner.
    pub north_east: LatLng,
}

impl GeoBounds {
    /// Build a bounding box from two arbitrary corners.
    ///
    /// The corners are normalized per axis, so the caller need not know which
    /// pixel corner maps to the geographically lesser one. Projections can
    /// invert axes at certain rotations even though north-up is the common
    /// case.
    #[must_use]
    pub fn from_corners(a: LatLng, b: LatLng) -> Self {
        Self {
            south_west: LatLng::new(a.lat.min(b.lat), a.lng.min(b.lng)),
            north_east: LatLng::new(a.lat.max(b.lat), a.lng.max(b.lng)),
        }
    }

    /// Check whether a coordinate lies within the box (inclusive).
    #[must_use]
    pub fn contains(&self, point: LatLng) -> bool {
        point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
            && point.lng >= self.south_west.lng
            && point.lng <= self.north_east.lng
    }

    /// Check whether another box lies entirely within this one.
    #[must_use]
    pub fn contains_bounds(&self, other: &GeoBounds) -> bool {
        self.contains(other.south_west) && self.contains(other.north_east)
    }

    /// Geographic midpoint of the box.
    #[must_use]
    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }
}

/// A point in viewport pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    /// Pixels from the left edge.
    pub x: f64,
    /// Pixels from the top edge.
    pub y: f64,
}

impl PixelPoint {
    /// Create a pixel point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in viewport pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelRect {
    /// Left edge in pixels.
    pub x: f64,
    /// Top edge in pixels.
    pub y: f64,
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl PixelRect {
    /// Create a rectangle from its top-left origin and size.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A rectangle with no usable area (zero-size, negative, or NaN).
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Top-left corner.
    #[must_use]
    pub const fn top_left(&self) -> PixelPoint {
        PixelPoint::new(self.x, self.y)
    }

    /// Bottom-right corner.
    #[must_use]
    pub fn bottom_right(&self) -> PixelPoint {
        PixelPoint::new(self.x + self.width, self.y + self.height)
    }

    /// The same rectangle shifted by a pixel offset.
    #[must_use]
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// Maps container-pixel coordinates to geographic coordinates and back.
///
/// Implemented by the host map for its current view. Both directions are
/// relative to the map container's top-left origin.
pub trait Projection {
    /// Invert the projection: container pixels to geographic coordinates.
    fn unproject(&self, point: PixelPoint) -> LatLng;

    /// Apply the projection: geographic coordinates to container pixels.
    fn project(&self, coord: LatLng) -> PixelPoint;
}

/// Convert an on-screen print frame into a geographic bounding box.
///
/// `frame` and `surface` are both viewport-pixel rectangles; the frame is
/// first translated into surface-relative pixels, then its top-left and
/// bottom-right corners are unprojected and normalized.
///
/// # Errors
///
/// Returns [`CoreError::GeometryUnavailable`] when either rectangle is not
/// laid out (zero-size). Callers must not proceed to export in that case.
pub fn frame_bounds<P: Projection + ?Sized>(
    projection: &P,
    frame: PixelRect,
    surface: PixelRect,
) -> CoreResult<GeoBounds> {
    if frame.is_degenerate() || surface.is_degenerate() {
        return Err(CoreError::GeometryUnavailable);
    }

    let relative = frame.translated(-surface.x, -surface.y);
    let top_left = projection.unproject(relative.top_left());
    let bottom_right = projection.unproject(relative.bottom_right());

    Ok(GeoBounds::from_corners(top_left, bottom_right))
}
