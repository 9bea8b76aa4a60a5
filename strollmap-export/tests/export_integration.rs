//! Integration tests for the export pipeline (strollmap-export).
//!
//! Drives the full state machine against counting mock collaborators:
//! surface accounting, settle timing, capture failures, re-entrancy, and
//! controller intent routing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use strollmap_core::{
    CoreError, GeoBounds, LatLng, MarkerVisual, PixelPoint, PixelRect, Projection, StampKind,
};
use strollmap_export::{
    CaptureDevice, Controller, ExportConfig, ExportError, ExportFormat, ExportOutput,
    ExportPipeline, ExportRegion, ExportRequest, ExportResult, HostMap, Intent, MapView, PageLayout,
    PixelSize, PrintJob, PrintSink, RasterImage, RasterSurface, SurfaceFactory,
};

// ==========================================================================
// Mock collaborators
// ==========================================================================

/// Linear north-up host map over a fixed view.
struct TestMap {
    bounds: GeoBounds,
    container: PixelRect,
    clicks_rx: Mutex<Option<mpsc::UnboundedReceiver<LatLng>>>,
}

impl TestMap {
    fn new() -> (Arc<Self>, mpsc::UnboundedSender<LatLng>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let map = Arc::new(Self {
            bounds: GeoBounds::from_corners(LatLng::new(35.0, 139.0), LatLng::new(36.0, 140.0)),
            container: PixelRect::new(0.0, 0.0, 1000.0, 800.0),
            clicks_rx: Mutex::new(Some(rx)),
        });
        (map, tx)
    }
}

impl Projection for TestMap {
    fn unproject(&self, point: PixelPoint) -> LatLng {
        let fx = point.x / self.container.width;
        let fy = point.y / self.container.height;
        LatLng::new(
            self.bounds.north_east.lat - fy * (self.bounds.north_east.lat - self.bounds.south_west.lat),
            self.bounds.south_west.lng + fx * (self.bounds.north_east.lng - self.bounds.south_west.lng),
        )
    }

    fn project(&self, coord: LatLng) -> PixelPoint {
        let fx = (coord.lng - self.bounds.south_west.lng)
            / (self.bounds.north_east.lng - self.bounds.south_west.lng);
        let fy = (self.bounds.north_east.lat - coord.lat)
            / (self.bounds.north_east.lat - self.bounds.south_west.lat);
        PixelPoint::new(fx * self.container.width, fy * self.container.height)
    }
}

#[async_trait]
impl HostMap for TestMap {
    fn view(&self) -> MapView {
        MapView {
            center: self.bounds.center(),
            zoom: 13.0,
            bounds: self.bounds,
        }
    }

    fn container_rect(&self) -> PixelRect {
        self.container
    }

    fn clicks(&self) -> mpsc::UnboundedReceiver<LatLng> {
        self.clicks_rx
            .lock()
            .expect("clicks lock")
            .take()
            .expect("clicks subscribed once")
    }

    async fn locate(&self) -> ExportResult<()> {
        Ok(())
    }
}

/// Shared allocation ledger for detached surfaces.
#[derive(Default)]
struct SurfaceLog {
    created: AtomicUsize,
    released: AtomicUsize,
    active: AtomicUsize,
    max_active: AtomicUsize,
    markers: AtomicUsize,
    last_bounds: Mutex<Option<GeoBounds>>,
}

struct TestSurface {
    size: PixelSize,
    log: Arc<SurfaceLog>,
    ready_delay: Option<Duration>,
}

#[async_trait]
impl RasterSurface for TestSurface {
    fn size(&self) -> PixelSize {
        self.size
    }

    fn place_marker(&mut self, _visual: MarkerVisual, _position: LatLng) {
        self.log.markers.fetch_add(1, Ordering::SeqCst);
    }

    async fn wait_ready(&mut self) {
        match self.ready_delay {
            Some(delay) => tokio::time::sleep(delay).await,
            // Tiles never settle; the pipeline's timeout must cover this.
            None => std::future::pending::<()>().await,
        }
    }

    async fn release(&mut self) {
        self.log.released.fetch_add(1, Ordering::SeqCst);
        self.log.active.fetch_sub(1, Ordering::SeqCst);
    }
}

struct TestFactory {
    log: Arc<SurfaceLog>,
    ready_delay: Option<Duration>,
    fail: bool,
}

#[async_trait]
impl SurfaceFactory for TestFactory {
    async fn create(
        &self,
        bounds: GeoBounds,
        size: PixelSize,
    ) -> ExportResult<Box<dyn RasterSurface>> {
        if self.fail {
            return Err(ExportError::Surface("construction refused".to_string()));
        }
        self.log.created.fetch_add(1, Ordering::SeqCst);
        let active = self.log.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.log.max_active.fetch_max(active, Ordering::SeqCst);
        *self.log.last_bounds.lock().expect("bounds lock") = Some(bounds);
        Ok(Box::new(TestSurface {
            size,
            log: Arc::clone(&self.log),
            ready_delay: self.ready_delay,
        }))
    }
}

struct TestCapture {
    fail: bool,
}

#[async_trait]
impl CaptureDevice for TestCapture {
    async fn capture(&self, surface: &dyn RasterSurface) -> ExportResult<RasterImage> {
        if self.fail {
            return Err(ExportError::Capture("permission denied".to_string()));
        }
        let size = surface.size();
        let mut bytes = Vec::new();
        image::RgbaImage::from_pixel(
            size.width.min(16),
            size.height.min(16),
            image::Rgba([230, 230, 230, 255]),
        )
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("encode");
        RasterImage::from_png(bytes)
    }
}

#[derive(Default)]
struct TestSink {
    printed: AtomicUsize,
}

#[async_trait]
impl PrintSink for TestSink {
    async fn present(&self, job: PrintJob<'_>) -> ExportResult<()> {
        assert!(matches!(job, PrintJob::Surface(_) | PrintJob::Document(_)));
        self.printed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ==========================================================================
// Harness
// ==========================================================================

struct Harness {
    map: Arc<TestMap>,
    clicks_tx: mpsc::UnboundedSender<LatLng>,
    log: Arc<SurfaceLog>,
    sink: Arc<TestSink>,
    pipeline: Arc<ExportPipeline>,
}

struct HarnessOptions {
    ready_delay: Option<Duration>,
    fail_capture: bool,
    fail_surface: bool,
    settle_timeout: Duration,
}

impl Default for HarnessOptions {
    fn default() -> Self {
        Self {
            ready_delay: Some(Duration::from_millis(1)),
            fail_capture: false,
            fail_surface: false,
            settle_timeout: Duration::from_millis(250),
        }
    }
}

fn harness(options: HarnessOptions) -> Harness {
    let (map, clicks_tx) = TestMap::new();
    let log = Arc::new(SurfaceLog::default());
    let sink = Arc::new(TestSink::default());
    let factory = Arc::new(TestFactory {
        log: Arc::clone(&log),
        ready_delay: options.ready_delay,
        fail: options.fail_surface,
    });
    let capture = Arc::new(TestCapture {
        fail: options.fail_capture,
    });
    let config = ExportConfig {
        page_size: PixelSize::new(160, 120),
        settle_timeout: options.settle_timeout,
        layout: PageLayout::default(),
    };
    let pipeline = Arc::new(ExportPipeline::new(
        Arc::clone(&map) as Arc<dyn HostMap>,
        factory,
        capture,
        Arc::clone(&sink) as Arc<dyn PrintSink>,
        config,
    ));
    Harness {
        map,
        clicks_tx,
        log,
        sink,
        pipeline,
    }
}

fn bench_stamps(count: usize) -> Vec<strollmap_core::Stamp> {
    let mut store = strollmap_core::StampStore::new();
    for i in 0..count {
        #[allow(clippy::cast_precision_loss)]
        let offset = i as f64 * 0.01;
        store
            .add(StampKind::Bench, LatLng::new(35.2 + offset, 139.2 + offset), None)
            .expect("add");
    }
    store.list()
}

// ==========================================================================
// Pipeline runs
// ==========================================================================

#[tokio::test]
async fn test_full_view_pdf_export() {
    let h = harness(HarnessOptions::default());
    let stamps = bench_stamps(3);

    let output = h
        .pipeline
        .export(
            &stamps,
            None,
            ExportRequest {
                region: ExportRegion::CurrentView,
                format: ExportFormat::Pdf,
            },
        )
        .await
        .expect("export");

    let ExportOutput::Document(pdf) = output else {
        panic!("expected a document");
    };
    assert_eq!(&pdf[0..5], b"%PDF-");

    assert_eq!(h.log.created.load(Ordering::SeqCst), 1);
    assert_eq!(h.log.released.load(Ordering::SeqCst), 1);
    assert_eq!(h.log.markers.load(Ordering::SeqCst), 3);
    assert_eq!(h.pipeline.phase(), strollmap_export::Phase::Idle);
}

#[tokio::test]
async fn test_png_export_returns_image() {
    let h = harness(HarnessOptions::default());

    let output = h
        .pipeline
        .export(
            &bench_stamps(1),
            None,
            ExportRequest {
                region: ExportRegion::CurrentView,
                format: ExportFormat::Png,
            },
        )
        .await
        .expect("export");

    let ExportOutput::Image(image) = output else {
        panic!("expected an image");
    };
    assert_eq!(&image.bytes[0..4], &[137, 80, 78, 71]);
    assert!(image.width > 0);
}

#[tokio::test]
async fn test_print_dialog_strategy_reaches_sink() {
    let h = harness(HarnessOptions::default());

    let output = h
        .pipeline
        .export(
            &bench_stamps(2),
            None,
            ExportRequest {
                region: ExportRegion::CurrentView,
                format: ExportFormat::PrintDialog,
            },
        )
        .await
        .expect("export");

    assert!(matches!(output, ExportOutput::Printed));
    assert_eq!(h.sink.printed.load(Ordering::SeqCst), 1);
    assert_eq!(h.log.released.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_sink_accepts_composed_document() {
    let h = harness(HarnessOptions::default());

    let output = h
        .pipeline
        .export(
            &bench_stamps(1),
            None,
            ExportRequest {
                region: ExportRegion::CurrentView,
                format: ExportFormat::Pdf,
            },
        )
        .await
        .expect("export");
    let ExportOutput::Document(pdf) = output else {
        panic!("expected a document");
    };

    // A composed document can be routed to the platform print flow.
    h.sink
        .present(PrintJob::Document(&pdf))
        .await
        .expect("present");
    assert_eq!(h.sink.printed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_frame_region_strictly_contained_in_view() {
    let h = harness(HarnessOptions::default());
    let frame = PixelRect::new(200.0, 160.0, 400.0, 320.0);

    h.pipeline
        .export(
            &[],
            Some(frame),
            ExportRequest {
                region: ExportRegion::PrintFrame,
                format: ExportFormat::Png,
            },
        )
        .await
        .expect("export");

    let requested =
        (*h.log.last_bounds.lock().expect("bounds lock")).expect("bounds recorded");
    let view = h.map.view().bounds;
    assert!(view.contains_bounds(&requested));
    assert!(requested.north_east.lng - requested.south_west.lng < 1.0);
    assert!(requested.north_east.lat - requested.south_west.lat < 1.0);
}

// ==========================================================================
// Failure paths release every resource
// ==========================================================================

#[tokio::test]
async fn test_missing_frame_geometry_fails_before_surface() {
    let h = harness(HarnessOptions::default());

    let result = h
        .pipeline
        .export(
            &[],
            None,
            ExportRequest {
                region: ExportRegion::PrintFrame,
                format: ExportFormat::Pdf,
            },
        )
        .await;

    assert!(matches!(
        result,
        Err(ExportError::Geometry(CoreError::GeometryUnavailable))
    ));
    assert_eq!(h.log.created.load(Ordering::SeqCst), 0);
    assert_eq!(h.pipeline.phase(), strollmap_export::Phase::Idle);
}

#[tokio::test]
async fn test_degenerate_frame_fails_before_surface() {
    let h = harness(HarnessOptions::default());

    let result = h
        .pipeline
        .export(
            &[],
            Some(PixelRect::new(10.0, 10.0, 0.0, 100.0)),
            ExportRequest {
                region: ExportRegion::PrintFrame,
                format: ExportFormat::Pdf,
            },
        )
        .await;

    assert!(matches!(result, Err(ExportError::Geometry(_))));
    assert_eq!(h.log.created.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_capture_failure_still_releases_surface() {
    let h = harness(HarnessOptions {
        fail_capture: true,
        ..HarnessOptions::default()
    });

    let result = h
        .pipeline
        .export(
            &bench_stamps(1),
            None,
            ExportRequest {
                region: ExportRegion::CurrentView,
                format: ExportFormat::Pdf,
            },
        )
        .await;

    assert!(matches!(result, Err(ExportError::Capture(_))));
    assert_eq!(h.log.created.load(Ordering::SeqCst), 1);
    assert_eq!(h.log.released.load(Ordering::SeqCst), 1);
    assert_eq!(h.log.active.load(Ordering::SeqCst), 0);
    assert_eq!(h.pipeline.phase(), strollmap_export::Phase::Idle);
}

#[tokio::test]
async fn test_surface_construction_failure_returns_to_idle() {
    let h = harness(HarnessOptions {
        fail_surface: true,
        ..HarnessOptions::default()
    });

    let result = h
        .pipeline
        .export(
            &[],
            None,
            ExportRequest {
                region: ExportRegion::CurrentView,
                format: ExportFormat::Pdf,
            },
        )
        .await;

    assert!(matches!(result, Err(ExportError::Surface(_))));
    assert_eq!(h.log.created.load(Ordering::SeqCst), 0);
    assert_eq!(h.pipeline.phase(), strollmap_export::Phase::Idle);
}

// ==========================================================================
// Timing
// ==========================================================================

#[tokio::test]
async fn test_settle_timeout_still_captures() {
    let h = harness(HarnessOptions {
        ready_delay: None, // never settles
        settle_timeout: Duration::from_millis(20),
        ..HarnessOptions::default()
    });

    let output = h
        .pipeline
        .export(
            &[],
            None,
            ExportRequest {
                region: ExportRegion::CurrentView,
                format: ExportFormat::Png,
            },
        )
        .await
        .expect("export despite unsettled tiles");

    assert!(matches!(output, ExportOutput::Image(_)));
    assert_eq!(h.log.created.load(Ordering::SeqCst), 1);
    assert_eq!(h.log.released.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_reentrant_trigger_is_ignored() {
    let h = harness(HarnessOptions {
        ready_delay: Some(Duration::from_millis(60)),
        ..HarnessOptions::default()
    });

    let pipeline = Arc::clone(&h.pipeline);
    let first = tokio::spawn(async move {
        pipeline
            .export(
                &bench_stamps(1),
                None,
                ExportRequest {
                    region: ExportRegion::CurrentView,
                    format: ExportFormat::Png,
                },
            )
            .await
    });

    // Let the first run reach the settle wait, then trigger again.
    tokio::time::sleep(Duration::from_millis(10)).await;
    let second = h
        .pipeline
        .export(
            &[],
            None,
            ExportRequest {
                region: ExportRegion::CurrentView,
                format: ExportFormat::Png,
            },
        )
        .await;
    assert!(matches!(second, Err(ExportError::Busy)));

    let first = first.await.expect("join").expect("first export");
    assert!(matches!(first, ExportOutput::Image(_)));

    // Only one detached surface ever existed at once.
    assert_eq!(h.log.max_active.load(Ordering::SeqCst), 1);
    assert_eq!(h.log.created.load(Ordering::SeqCst), 1);
    assert_eq!(h.log.released.load(Ordering::SeqCst), 1);
    assert_eq!(h.pipeline.phase(), strollmap_export::Phase::Idle);
}

// ==========================================================================
// Controller intents
// ==========================================================================

#[tokio::test]
async fn test_controller_print_uses_frame_when_visible() {
    let h = harness(HarnessOptions::default());
    let mut controller = Controller::new(
        Arc::clone(&h.map) as Arc<dyn HostMap>,
        Arc::clone(&h.pipeline),
    );

    controller
        .session_mut()
        .print_frame_mut()
        .set_rect(PixelRect::new(200.0, 160.0, 400.0, 320.0));
    controller
        .handle_intent(Intent::TogglePrintPreview)
        .await
        .expect("toggle");

    let output = controller
        .handle_intent(Intent::Print)
        .await
        .expect("print")
        .expect("output");
    assert!(matches!(output, ExportOutput::Printed));

    let requested =
        (*h.log.last_bounds.lock().expect("bounds lock")).expect("bounds recorded");
    let view = h.map.view().bounds;
    assert!(view.contains_bounds(&requested));
    assert!(requested.north_east.lng - requested.south_west.lng < 1.0);
}

#[tokio::test]
async fn test_controller_print_falls_back_to_current_view() {
    let h = harness(HarnessOptions::default());
    let mut controller = Controller::new(
        Arc::clone(&h.map) as Arc<dyn HostMap>,
        Arc::clone(&h.pipeline),
    );

    // Frame hidden: full current view is exported.
    let output = controller
        .handle_intent(Intent::ExportPdf)
        .await
        .expect("export")
        .expect("output");
    assert!(matches!(output, ExportOutput::Document(_)));

    let requested =
        (*h.log.last_bounds.lock().expect("bounds lock")).expect("bounds recorded");
    assert_eq!(requested, h.map.view().bounds);
}

#[tokio::test]
async fn test_controller_locate_and_preview_do_not_export() {
    let h = harness(HarnessOptions::default());
    let mut controller = Controller::new(
        Arc::clone(&h.map) as Arc<dyn HostMap>,
        Arc::clone(&h.pipeline),
    );

    let located = controller.handle_intent(Intent::Locate).await.expect("locate");
    assert!(located.is_none());
    let toggled = controller
        .handle_intent(Intent::TogglePrintPreview)
        .await
        .expect("toggle");
    assert!(toggled.is_none());

    assert_eq!(h.log.created.load(Ordering::SeqCst), 0);
    assert!(controller.session().print_frame().is_visible());
}

#[tokio::test]
async fn test_controller_drains_click_stream() {
    let h = harness(HarnessOptions::default());
    let mut controller = Controller::new(
        Arc::clone(&h.map) as Arc<dyn HostMap>,
        Arc::clone(&h.pipeline),
    );

    controller.select_tool(StampKind::Bench);
    h.clicks_tx.send(LatLng::new(35.3, 139.3)).expect("send");
    h.clicks_tx.send(LatLng::new(35.4, 139.4)).expect("send");
    drop(h.clicks_tx);

    controller.drive_clicks().await;
    assert_eq!(controller.session().store().len(), 2);
}

#[tokio::test]
async fn test_failed_export_leaves_store_untouched() {
    let h = harness(HarnessOptions {
        fail_capture: true,
        ..HarnessOptions::default()
    });
    let mut controller = Controller::new(
        Arc::clone(&h.map) as Arc<dyn HostMap>,
        Arc::clone(&h.pipeline),
    );

    controller.select_tool(StampKind::Bench);
    controller.on_map_click(LatLng::new(35.3, 139.3));

    let result = controller.handle_intent(Intent::ExportPdf).await;
    assert!(matches!(result, Err(ExportError::Capture(_))));
    assert_eq!(controller.session().store().len(), 1);
    assert_eq!(h.pipeline.phase(), strollmap_export::Phase::Idle);
}
