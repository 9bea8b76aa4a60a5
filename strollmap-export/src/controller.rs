//! Routes user interaction between the session, host map, and pipeline.
//!
//! The controller owns the session state and holds shared handles to the
//! pipeline and the host map. Map clicks mutate the session; toolbar intents
//! either adjust the view (locate, preview toggle) or launch an export run
//! over the current store snapshot.

use std::sync::Arc;

use strollmap_core::{ClickOutcome, LatLng, SessionState, StampId, StampKind};

use crate::error::ExportResult;
use crate::map::HostMap;
use crate::pipeline::{ExportFormat, ExportOutput, ExportPipeline, ExportRegion, ExportRequest};

/// A toolbar intent outside of stamp-tool selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Print the current map through the native dialog.
    Print,
    /// Export the current map as a PDF document.
    ExportPdf,
    /// Move the view to the device's location.
    Locate,
    /// Show or hide the print frame.
    TogglePrintPreview,
}

/// Session-scoped interaction controller.
pub struct Controller {
    session: SessionState,
    map: Arc<dyn HostMap>,
    pipeline: Arc<ExportPipeline>,
}

impl Controller {
    /// Create a controller for a fresh session.
    #[must_use]
    pub fn new(map: Arc<dyn HostMap>, pipeline: Arc<ExportPipeline>) -> Self {
        Self {
            session: SessionState::new(),
            map,
            pipeline,
        }
    }

    /// Read-only access to the session.
    #[must_use]
    pub const fn session(&self) -> &SessionState {
        &self.session
    }

    /// Mutable access to the session (layout callbacks update the print
    /// frame rectangle through this).
    pub fn session_mut(&mut self) -> &mut SessionState {
        &mut self.session
    }

    /// Route a map click into the session.
    pub fn on_map_click(&mut self, position: LatLng) -> ClickOutcome {
        self.session.handle_click(position)
    }

    /// Arm or disarm a stamp tool.
    pub fn select_tool(&mut self, kind: StampKind) {
        self.session.select_tool(kind);
    }

    /// Resolve the pending memo with user text.
    pub fn confirm_memo(&mut self, text: &str) -> Option<StampId> {
        self.session.confirm_memo(text)
    }

    /// Dismiss the memo prompt.
    pub fn cancel_memo(&mut self) {
        self.session.cancel_memo();
    }

    /// Remove a stamp from its popup's delete control.
    pub fn remove_stamp(&mut self, id: StampId) -> bool {
        self.session.remove_stamp(id)
    }

    /// Handle a toolbar intent.
    ///
    /// Print and PDF intents return the pipeline's output; view intents
    /// return `None`.
    ///
    /// # Errors
    ///
    /// Propagates pipeline and host-map failures; the session state is never
    /// altered by a failed intent.
    pub async fn handle_intent(&mut self, intent: Intent) -> ExportResult<Option<ExportOutput>> {
        match intent {
            Intent::TogglePrintPreview => {
                let visible = self.session.print_frame_mut().toggle();
                tracing::debug!(visible, "print preview toggled");
                Ok(None)
            }
            Intent::Locate => {
                self.map.locate().await?;
                Ok(None)
            }
            Intent::Print => self.run_export(ExportFormat::PrintDialog).await.map(Some),
            Intent::ExportPdf => self.run_export(ExportFormat::Pdf).await.map(Some),
        }
    }

    /// Drain host-map clicks into the session until the stream closes.
    pub async fn drive_clicks(&mut self) {
        let mut clicks = self.map.clicks();
        while let Some(position) = clicks.recv().await {
            let outcome = self.on_map_click(position);
            tracing::debug!(?outcome, "map click routed");
        }
    }

    /// Launch the pipeline over the current snapshot.
    ///
    /// The print frame constrains the region when it is visible and laid
    /// out; otherwise the full current view is exported.
    async fn run_export(&self, format: ExportFormat) -> ExportResult<ExportOutput> {
        let frame = self.session.print_frame().laid_out();
        let region = if frame.is_some() {
            ExportRegion::PrintFrame
        } else {
            ExportRegion::CurrentView
        };
        let stamps = self.session.store().list();
        self.pipeline
            .export(&stamps, frame, ExportRequest { region, format })
            .await
    }
}
