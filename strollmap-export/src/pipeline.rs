//! The print/export state machine.
//!
//! One run walks `Idle -> PreparingSurface -> AwaitingSettle -> Capturing`
//! and back to `Idle` on every exit path. The pipeline is the only component
//! that creates and destroys detached surfaces or reaches the platform print
//! flow, and it guards against re-entrant triggers: a second request while a
//! run is in flight is ignored with [`ExportError::Busy`].

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use strollmap_core::{frame_bounds, marker_visual, GeoBounds, PixelRect, Stamp};

use crate::document::{compose_pdf, PageLayout};
use crate::error::{ExportError, ExportResult};
use crate::map::{
    CaptureDevice, HostMap, PixelSize, PrintJob, PrintSink, RasterSurface, SurfaceFactory,
};

/// Observable pipeline phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No export in flight.
    Idle,
    /// Resolving bounds and building the detached surface.
    PreparingSurface,
    /// Waiting for tiles and layout to settle.
    AwaitingSettle,
    /// Handing the settled surface to capture or print.
    Capturing,
}

/// Which geographic region to export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportRegion {
    /// The host map's full current view.
    CurrentView,
    /// The on-screen print frame, via the coordinate transform.
    PrintFrame,
}

/// How the settled surface becomes output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// Invoke the native print dialog against the prepared surface.
    PrintDialog,
    /// Capture and embed the image in a fixed-page PDF document.
    Pdf,
    /// Capture and return the raw image artifact.
    Png,
}

/// A single print/export request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRequest {
    /// Target region.
    pub region: ExportRegion,
    /// Output strategy.
    pub format: ExportFormat,
}

/// Successful pipeline outcome.
#[derive(Debug)]
pub enum ExportOutput {
    /// The platform print dialog was presented.
    Printed,
    /// A composed PDF document.
    Document(Vec<u8>),
    /// A raw captured image.
    Image(crate::map::RasterImage),
}

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Fixed pixel size of the detached output surface.
    pub page_size: PixelSize,
    /// Upper bound on waiting for tiles/layout to settle.
    pub settle_timeout: Duration,
    /// Physical page layout for document composition.
    pub layout: PageLayout,
}

impl Default for ExportConfig {
    /// A4 portrait at 96 dpi with a 1.5 s settle deadline.
    fn default() -> Self {
        Self {
            page_size: PixelSize::new(794, 1123),
            settle_timeout: Duration::from_millis(1500),
            layout: PageLayout::default(),
        }
    }
}

/// Orchestrates snapshot, secondary rendering, settling, and capture.
pub struct ExportPipeline {
    map: Arc<dyn HostMap>,
    surfaces: Arc<dyn SurfaceFactory>,
    capture: Arc<dyn CaptureDevice>,
    sink: Arc<dyn PrintSink>,
    config: ExportConfig,
    phase: Mutex<Phase>,
}

impl ExportPipeline {
    /// Create a pipeline over the given collaborators.
    #[must_use]
    pub fn new(
        map: Arc<dyn HostMap>,
        surfaces: Arc<dyn SurfaceFactory>,
        capture: Arc<dyn CaptureDevice>,
        sink: Arc<dyn PrintSink>,
        config: ExportConfig,
    ) -> Self {
        Self {
            map,
            surfaces,
            capture,
            sink,
            config,
            phase: Mutex::new(Phase::Idle),
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        *self
            .phase
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// The pipeline configuration.
    #[must_use]
    pub const fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Run one export over a store snapshot.
    ///
    /// `frame` is the laid-out print frame rectangle in viewport pixels,
    /// required when the request targets [`ExportRegion::PrintFrame`].
    ///
    /// # Errors
    ///
    /// [`ExportError::Busy`] when a run is already in flight;
    /// [`ExportError::Geometry`] when the frame region cannot be resolved;
    /// surface, capture, document, and sink failures otherwise. The detached
    /// surface is released and the phase returns to `Idle` on every path.
    pub async fn export(
        &self,
        stamps: &[Stamp],
        frame: Option<PixelRect>,
        request: ExportRequest,
    ) -> ExportResult<ExportOutput> {
        let _guard = self.begin(request)?;

        let bounds = self.resolve_bounds(request.region, frame)?;
        let mut surface = self.surfaces.create(bounds, self.config.page_size).await?;
        for stamp in stamps {
            surface.place_marker(marker_visual(stamp), stamp.position);
        }
        tracing::debug!(count = stamps.len(), "markers replicated onto surface");

        self.set_phase(Phase::AwaitingSettle);
        if tokio::time::timeout(self.config.settle_timeout, surface.wait_ready())
            .await
            .is_err()
        {
            tracing::warn!(
                timeout = ?self.config.settle_timeout,
                "surface did not settle in time, capturing current state"
            );
        }

        self.set_phase(Phase::Capturing);
        let result = self.finish(surface.as_ref(), request.format).await;

        surface.release().await;
        match &result {
            Ok(_) => tracing::info!(format = ?request.format, "export complete"),
            Err(error) => tracing::warn!(%error, "export failed"),
        }
        result
    }

    /// Claim the pipeline for one run, or refuse while a run is in flight.
    fn begin(&self, request: ExportRequest) -> ExportResult<PhaseGuard<'_>> {
        let mut phase = self
            .phase
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if *phase != Phase::Idle {
            tracing::warn!(in_flight = ?*phase, "export trigger ignored, pipeline busy");
            return Err(ExportError::Busy);
        }
        *phase = Phase::PreparingSurface;
        tracing::info!(region = ?request.region, format = ?request.format, "export started");
        Ok(PhaseGuard { pipeline: self })
    }

    fn set_phase(&self, phase: Phase) {
        *self
            .phase
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = phase;
    }

    /// Resolve the target bounding box for the requested region.
    fn resolve_bounds(
        &self,
        region: ExportRegion,
        frame: Option<PixelRect>,
    ) -> ExportResult<GeoBounds> {
        match region {
            ExportRegion::CurrentView => Ok(self.map.view().bounds),
            ExportRegion::PrintFrame => {
                let frame = frame.ok_or(strollmap_core::CoreError::GeometryUnavailable)?;
                let bounds = frame_bounds(&*self.map, frame, self.map.container_rect())?;
                Ok(bounds)
            }
        }
    }

    /// Turn the settled surface into the requested output.
    async fn finish(
        &self,
        surface: &dyn RasterSurface,
        format: ExportFormat,
    ) -> ExportResult<ExportOutput> {
        match format {
            ExportFormat::PrintDialog => {
                self.sink.present(PrintJob::Surface(surface)).await?;
                Ok(ExportOutput::Printed)
            }
            ExportFormat::Pdf => {
                let image = self.capture.capture(surface).await?;
                let pdf = compose_pdf(&image, &self.config.layout)?;
                Ok(ExportOutput::Document(pdf))
            }
            ExportFormat::Png => {
                let image = self.capture.capture(surface).await?;
                Ok(ExportOutput::Image(image))
            }
        }
    }
}

/// Restores `Idle` when a run ends, on every exit path.
struct PhaseGuard<'a> {
    pipeline: &'a ExportPipeline,
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        self.pipeline.set_phase(Phase::Idle);
    }
}
