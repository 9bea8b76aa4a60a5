//! Capability traits for the host map, raster capture, and print flow.
//!
//! Everything the pipeline needs from the outside world lives behind these
//! traits: the interactive map widget, the detached surface it can spawn,
//! the region-to-image capture capability, and the platform print dialog.

use async_trait::async_trait;
use tokio::sync::mpsc;

use strollmap_core::{GeoBounds, LatLng, MarkerVisual, PixelRect, Projection};

use crate::error::{ExportError, ExportResult};

/// Snapshot of the interactive map's current view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    /// View center.
    pub center: LatLng,
    /// Current zoom level.
    pub zoom: f64,
    /// Geographic bounds of the visible area.
    pub bounds: GeoBounds,
}

/// Pixel dimensions of a rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PixelSize {
    /// Create a pixel size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// The interactive host map the user annotates.
///
/// The projection methods inherited from [`Projection`] are relative to the
/// map container's top-left origin for the current view.
#[async_trait]
pub trait HostMap: Projection + Send + Sync {
    /// Current center, zoom, and visible bounds.
    fn view(&self) -> MapView;

    /// Viewport-pixel rectangle of the map's rendering surface.
    fn container_rect(&self) -> PixelRect;

    /// Subscribe to map clicks as geographic coordinates.
    fn clicks(&self) -> mpsc::UnboundedReceiver<LatLng>;

    /// Move the view to the current device location.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Map`] when geolocation is unavailable or
    /// denied.
    async fn locate(&self) -> ExportResult<()>;
}

/// A detached rendering surface confined to a geographic bounding box.
///
/// Never part of the interactive viewport; the factory keeps it off-screen
/// or hidden so preparing an export doesn't flash unrelated content.
#[async_trait]
pub trait RasterSurface: Send + Sync {
    /// Surface dimensions in pixels.
    fn size(&self) -> PixelSize;

    /// Replicate a marker onto the surface.
    fn place_marker(&mut self, visual: MarkerVisual, position: LatLng);

    /// Resolve once tiles and layout have settled.
    ///
    /// Tile loading is asynchronous network work; the pipeline bounds this
    /// wait with a timeout and captures whatever has rendered by then.
    async fn wait_ready(&mut self);

    /// Tear down the surface and any off-screen resources.
    ///
    /// Called exactly once by the pipeline, on success and on every failure
    /// path after construction.
    async fn release(&mut self);
}

/// Constructs detached surfaces; the only component allowed to do so.
#[async_trait]
pub trait SurfaceFactory: Send + Sync {
    /// Build a hidden surface fit to `bounds` at the given pixel size, with
    /// no zoom or attribution chrome.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Surface`] when construction fails.
    async fn create(
        &self,
        bounds: GeoBounds,
        size: PixelSize,
    ) -> ExportResult<Box<dyn RasterSurface>>;
}

/// A captured fixed-resolution raster image (PNG bytes plus dimensions).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    /// PNG-encoded pixels.
    pub bytes: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl RasterImage {
    /// Wrap PNG bytes, decoding them once to learn the dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Capture`] when the bytes are not a decodable
    /// image.
    pub fn from_png(bytes: Vec<u8>) -> ExportResult<Self> {
        let decoded = image::load_from_memory(&bytes)
            .map_err(|e| ExportError::Capture(format!("undecodable capture: {e}")))?;
        Ok(Self {
            width: decoded.width(),
            height: decoded.height(),
            bytes,
        })
    }
}

/// Rasterizes a settled surface's rendered region into an image.
///
/// May fail for platform reasons (permission denial, cross-origin content
/// taint); the pipeline surfaces that as an export failure with no partial
/// output.
#[async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Produce a fixed-resolution image of the surface.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Capture`] when the capability errors.
    async fn capture(&self, surface: &dyn RasterSurface) -> ExportResult<RasterImage>;
}

/// A job handed to the platform print flow.
pub enum PrintJob<'a> {
    /// Print the prepared surface directly; its region becomes the printed
    /// content.
    Surface(&'a dyn RasterSurface),
    /// Print a composed fixed-page document (PDF bytes).
    Document(&'a [u8]),
}

/// Invokes the platform print dialog for a prepared job.
#[async_trait]
pub trait PrintSink: Send + Sync {
    /// Present the job to the user's print flow.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Sink`] when the platform flow cannot open.
    async fn present(&self, job: PrintJob<'_>) -> ExportResult<()>;
}
