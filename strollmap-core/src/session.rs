//! Interactive session state: armed tool, pending memo, print frame.
//!
//! One [`SessionState`] exists per session; it owns the stamp store and the
//! transient interaction state, with construction and teardown at session
//! boundaries rather than process-wide globals. All transitions happen on
//! discrete event callbacks, so mutations are strictly ordered by event
//! arrival.

use serde::{Deserialize, Serialize};

use crate::geo::{LatLng, PixelRect};
use crate::stamp::{StampId, StampKind};
use crate::store::StampStore;

/// Outcome of routing a map click through the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// No tool armed; the click is ignored.
    Ignored,
    /// A stamp was placed directly.
    Placed(StampId),
    /// A memo placement is now pending; the text prompt should open.
    MemoPrompt,
}

/// The on-screen print frame rectangle and its visibility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PrintFrame {
    rect: Option<PixelRect>,
    visible: bool,
}

impl PrintFrame {
    /// Record the frame's current layout rectangle (viewport pixels).
    pub fn set_rect(&mut self, rect: PixelRect) {
        self.rect = Some(rect);
    }

    /// Mark the frame as detached from layout.
    pub fn clear_rect(&mut self) {
        self.rect = None;
    }

    /// Flip visibility; returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }

    /// Whether the frame is currently shown.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// The frame rectangle, if it is visible and usable for export.
    ///
    /// Returns `None` when hidden, detached, or zero-size.
    #[must_use]
    pub fn laid_out(&self) -> Option<PixelRect> {
        if !self.visible {
            return None;
        }
        self.rect.filter(|rect| !rect.is_degenerate())
    }
}

/// Per-session interaction state machine.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    store: StampStore,
    tool: Option<StampKind>,
    pending_memo: Option<LatLng>,
    print_frame: PrintFrame,
}

impl SessionState {
    /// Create a fresh session with an empty store and no armed tool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only access to the stamp store.
    #[must_use]
    pub const fn store(&self) -> &StampStore {
        &self.store
    }

    /// The currently armed tool, if any.
    #[must_use]
    pub const fn selected_tool(&self) -> Option<StampKind> {
        self.tool
    }

    /// The coordinate awaiting memo text, if any.
    #[must_use]
    pub const fn pending_memo(&self) -> Option<LatLng> {
        self.pending_memo
    }

    /// Read-only access to the print frame.
    #[must_use]
    pub const fn print_frame(&self) -> &PrintFrame {
        &self.print_frame
    }

    /// Mutable access to the print frame.
    pub fn print_frame_mut(&mut self) -> &mut PrintFrame {
        &mut self.print_frame
    }

    /// Arm or disarm a tool.
    ///
    /// Selecting the armed tool disarms it; selecting another replaces it.
    /// Existing placements are never discarded.
    pub fn select_tool(&mut self, kind: StampKind) {
        if self.tool == Some(kind) {
            self.tool = None;
        } else {
            self.tool = Some(kind);
        }
        tracing::debug!(tool = ?self.tool, "tool selection changed");
    }

    /// Route a map click according to the armed tool.
    ///
    /// Plain categories place immediately and leave the tool armed for
    /// repeated stamping. The memo tool records a pending placement instead;
    /// a second memo click before resolution replaces it (last click wins).
    pub fn handle_click(&mut self, position: LatLng) -> ClickOutcome {
        match self.tool {
            None => ClickOutcome::Ignored,
            Some(StampKind::Memo) => {
                self.pending_memo = Some(position);
                ClickOutcome::MemoPrompt
            }
            Some(kind) => self
                .store
                .add(kind, position, None)
                .map_or(ClickOutcome::Ignored, ClickOutcome::Placed),
        }
    }

    /// Resolve the pending memo placement with user text.
    ///
    /// Empty-after-trim text is a complete no-op: the placement stays
    /// pending and the prompt remains open. On success the memo stamp is
    /// added, the placement clears, and the tool disarms.
    pub fn confirm_memo(&mut self, text: &str) -> Option<StampId> {
        let position = self.pending_memo?;
        match self.store.add(StampKind::Memo, position, Some(text)) {
            Ok(id) => {
                self.pending_memo = None;
                self.tool = None;
                Some(id)
            }
            Err(error) => {
                tracing::debug!(%error, "memo confirmation rejected");
                None
            }
        }
    }

    /// Dismiss the memo prompt: clears the pending placement and disarms
    /// the tool without touching the store.
    pub fn cancel_memo(&mut self) {
        self.pending_memo = None;
        self.tool = None;
    }

    /// Remove a stamp unconditionally (deletion intent from its popup).
    pub fn remove_stamp(&mut self, id: StampId) -> bool {
        self.store.remove(id)
    }
}
