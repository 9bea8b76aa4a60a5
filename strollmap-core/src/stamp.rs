//! Stamp annotations and the closed category catalog.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::LatLng;
use crate::{CoreError, CoreResult};

/// Unique identifier for a placed stamp.
///
/// Assigned at creation, never reused, stable for the annotation's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StampId(Uuid);

impl StampId {
    /// Create a new unique stamp ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for StampId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StampId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The closed set of annotation categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StampKind {
    /// Slide.
    Slide,
    /// Swing set.
    Swing,
    /// Pull-up bars.
    Bars,
    /// Sandbox.
    Sandbox,
    /// Jungle gym.
    JungleGym,
    /// Bench.
    Bench,
    /// Toilet.
    Toilet,
    /// Drinking fountain.
    Fountain,
    /// Water tap.
    Tap,
    /// Acorn spot.
    Acorn,
    /// Generic caution marker.
    Caution,
    /// Free-text memo.
    Memo,
}

impl StampKind {
    /// Every category, in toolbar order.
    pub const ALL: [StampKind; 12] = [
        StampKind::Slide,
        StampKind::Swing,
        StampKind::Bars,
        StampKind::Sandbox,
        StampKind::JungleGym,
        StampKind::Bench,
        StampKind::Toilet,
        StampKind::Fountain,
        StampKind::Tap,
        StampKind::Acorn,
        StampKind::Caution,
        StampKind::Memo,
    ];

    /// Display label for this category.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            StampKind::Slide => "すべり台",
            StampKind::Swing => "ブランコ",
            StampKind::Bars => "鉄棒",
            StampKind::Sandbox => "砂場",
            StampKind::JungleGym => "ジャングルジム",
            StampKind::Bench => "ベンチ",
            StampKind::Toilet => "トイレ",
            StampKind::Fountain => "水飲み場",
            StampKind::Tap => "水道",
            StampKind::Acorn => "どんぐり",
            StampKind::Caution => "注意",
            StampKind::Memo => "メモ",
        }
    }

    /// Marker color for this category, as a hex string.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            StampKind::Slide => "#fbbf24",
            StampKind::Swing => "#38bdf8",
            StampKind::Bars => "#9ca3af",
            StampKind::Sandbox => "#fb923c",
            StampKind::JungleGym => "#6366f1",
            StampKind::Bench => "#22c55e",
            StampKind::Toilet => "#3b82f6",
            StampKind::Fountain => "#06b6d4",
            StampKind::Tap => "#0891b2",
            StampKind::Acorn => "#b45309",
            StampKind::Caution => "#ef4444",
            StampKind::Memo => "#a855f7",
        }
    }

    /// Whether this is the free-text memo category.
    #[must_use]
    pub const fn is_memo(self) -> bool {
        matches!(self, StampKind::Memo)
    }
}

impl std::fmt::Display for StampKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A single placed annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stamp {
    /// Unique identifier.
    pub id: StampId,
    /// Annotation category.
    pub kind: StampKind,
    /// Geographic position, immutable once created.
    pub position: LatLng,
    /// Free text; present exactly for the memo kind.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Stamp {
    /// Construct a stamp, enforcing the memo/text invariant.
    ///
    /// Memo text is trimmed before storage.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyMemoText`] for a memo whose text is empty
    /// after trimming, and [`CoreError::UnexpectedText`] when text is
    /// supplied for any other kind.
    pub fn new(kind: StampKind, position: LatLng, text: Option<&str>) -> CoreResult<Self> {
        let text = match (kind.is_memo(), text) {
            (true, Some(raw)) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err(CoreError::EmptyMemoText);
                }
                Some(trimmed.to_string())
            }
            (true, None) => return Err(CoreError::EmptyMemoText),
            (false, Some(_)) => return Err(CoreError::UnexpectedText(kind.label().to_string())),
            (false, None) => None,
        };

        Ok(Self {
            id: StampId::new(),
            kind,
            position,
            text,
        })
    }
}
