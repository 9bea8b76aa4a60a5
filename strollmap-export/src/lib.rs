//! # Strollmap Export
//!
//! The print/export pipeline: turns the current annotation session into a
//! printable artifact by re-rendering the target region on a detached map
//! surface and capturing it once tiles have settled.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │             strollmap-export                │
//! ├─────────────────────────────────────────────┤
//! │  Capability Traits │  Export Pipeline       │
//! │  - HostMap         │  - Idle                │
//! │  - SurfaceFactory  │  - PreparingSurface    │
//! │  - CaptureDevice   │  - AwaitingSettle      │
//! │  - PrintSink       │  - Capturing           │
//! ├─────────────────────────────────────────────┤
//! │  Page Document     │  Controller            │
//! │  - A4 layout       │  - Toolbar intents     │
//! │  - Attribution     │  - Click routing       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! The interactive map widget, tile fetching, and actual raster capture are
//! external collaborators behind the traits in [`map`]; this crate owns the
//! orchestration and the fixed-page document composition only.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod controller;
pub mod document;
pub mod error;
pub mod map;
pub mod pipeline;

pub use controller::{Controller, Intent};
pub use document::{compose_pdf, PageLayout};
pub use error::{ExportError, ExportResult};
pub use map::{
    CaptureDevice, HostMap, MapView, PixelSize, PrintJob, PrintSink, RasterImage, RasterSurface,
    SurfaceFactory,
};
pub use pipeline::{
    ExportConfig, ExportFormat, ExportOutput, ExportPipeline, ExportRegion, ExportRequest, Phase,
};

/// Export crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
