//! Layer identity.
//!
//! Each layer kind draws ids from its own numeric range, so ids never collide
//! across kinds. Counters only move forward; an id is never handed out twice
//! by the same generator, even after the layer it named is deleted.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Width of the id range owned by each [`LayerKind`].
pub const PARTITION_WIDTH: u64 = 1 << 32;

/// Unique layer identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub u64);

impl LayerId {
    /// Kind whose range this id falls into.
    pub fn kind(&self) -> Option<LayerKind> {
        LayerKind::ALL
            .into_iter()
            .find(|kind| (kind.base()..kind.base() + PARTITION_WIDTH).contains(&self.0))
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a layer holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// Plain or cluster layer hosting individually declared markers
    Generic,
    /// Layer fed from a marker options array
    Marker,
    /// Layer fed from a polygon options array
    Polygon,
    /// Layer fed from a polyline options array
    Polyline,
}

impl LayerKind {
    pub const ALL: [LayerKind; 4] = [
        LayerKind::Generic,
        LayerKind::Marker,
        LayerKind::Polygon,
        LayerKind::Polyline,
    ];

    fn index(self) -> usize {
        match self {
            Self::Generic => 0,
            Self::Marker => 1,
            Self::Polygon => 2,
            Self::Polyline => 3,
        }
    }

    /// First id of this kind's range.
    pub fn base(self) -> u64 {
        self.index() as u64 * PARTITION_WIDTH
    }
}

/// Hands out layer ids.
///
/// Owned by the composition root; tests create their own to get
/// deterministic ids.
#[derive(Debug, Default)]
pub struct LayerIdGenerator {
    counters: [AtomicU64; 4],
}

impl LayerIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id for `kind`.
    pub fn next(&self, kind: LayerKind) -> LayerId {
        let seq = self.counters[kind.index()].fetch_add(1, Ordering::Relaxed);
        if seq >= PARTITION_WIDTH {
            tracing::warn!(?kind, seq, "layer id range exhausted, ids will overlap the next kind");
        }
        LayerId(kind.base() + seq)
    }

    /// How many ids of `kind` have been issued.
    pub fn issued(&self, kind: LayerKind) -> u64 {
        self.counters[kind.index()].load(Ordering::Relaxed)
    }
}
