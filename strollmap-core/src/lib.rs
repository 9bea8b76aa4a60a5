//! # Strollmap Core
//!
//! Annotation core for printable walking-route maps: the stamp data model,
//! the ordered annotation store, the print-frame coordinate transform, and
//! the interactive session state machine.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              strollmap-core                 │
//! ├─────────────────────────────────────────────┤
//! │  Stamp Model     │  Coordinate Transform    │
//! │  - Categories    │  - Pixel rectangles      │
//! │  - Positions     │  - Projection trait      │
//! │  - Memo text     │  - Frame -> GeoBounds    │
//! ├─────────────────────────────────────────────┤
//! │  Stamp Store     │  Session State           │
//! │  - Ordered adds  │  - Armed tool            │
//! │  - Removal by id │  - Pending memo          │
//! │  - Snapshots     │  - Print frame           │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Everything here is synchronous and free of I/O; the asynchronous
//! export/print pipeline lives in `strollmap-export`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod geo;
pub mod marker;
pub mod session;
pub mod stamp;
pub mod store;

pub use error::{CoreError, CoreResult};
pub use geo::{
    frame_bounds, GeoBounds, LatLng, PixelPoint, PixelRect, Projection, DEFAULT_CENTER,
    DEFAULT_ZOOM, MAX_TILE_ZOOM,
};
pub use marker::{marker_visual, popup, MarkerVisual, Popup};
pub use session::{ClickOutcome, PrintFrame, SessionState};
pub use stamp::{Stamp, StampId, StampKind};
pub use store::StampStore;

/// Core crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
