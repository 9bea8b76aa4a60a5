//! Rendering-technology-independent marker and popup descriptions.
//!
//! The host map consumes these descriptions; nothing here knows about DOM
//! nodes, icons, or any concrete renderer.

use serde::{Deserialize, Serialize};

use crate::stamp::{Stamp, StampKind};

/// Warning symbol used by the caution marker.
const CAUTION_SYMBOL: &str = "⚠";

/// Visual description of a stamp marker, polymorphic over category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum MarkerVisual {
    /// Colored chip carrying the category label.
    Chip {
        /// Label text.
        label: String,
        /// Background color as hex.
        color: String,
    },
    /// Bare symbol with no chip background.
    Glyph {
        /// Symbol text.
        symbol: String,
        /// Symbol color as hex.
        color: String,
    },
    /// Bubble carrying user-written memo text.
    Note {
        /// Memo text.
        text: String,
        /// Background color as hex.
        color: String,
    },
}

/// Contextual popup description for a placed stamp.
///
/// The host UI attaches its deletion control here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Popup {
    /// Popup heading (the category label).
    pub title: String,
    /// Memo body text, when present.
    pub body: Option<String>,
}

/// Describe how a stamp should look on the map.
#[must_use]
pub fn marker_visual(stamp: &Stamp) -> MarkerVisual {
    match (stamp.kind, &stamp.text) {
        (StampKind::Caution, _) => MarkerVisual::Glyph {
            symbol: CAUTION_SYMBOL.to_string(),
            color: StampKind::Caution.color().to_string(),
        },
        (StampKind::Memo, Some(text)) => MarkerVisual::Note {
            text: text.clone(),
            color: StampKind::Memo.color().to_string(),
        },
        (kind, _) => MarkerVisual::Chip {
            label: kind.label().to_string(),
            color: kind.color().to_string(),
        },
    }
}

/// Describe a stamp's contextual popup.
#[must_use]
pub fn popup(stamp: &Stamp) -> Popup {
    Popup {
        title: stamp.kind.label().to_string(),
        body: stamp.text.clone(),
    }
}
