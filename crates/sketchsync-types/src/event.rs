//! The draw event and the consumer-held offset into the log.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// One drawing sample appended to the log.
///
/// `timestamp` is the producer's creation time in epoch milliseconds. It is
/// advisory only: ordering is defined by append order in the log.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Event {
    /// Horizontal canvas coordinate.
    pub x: f64,
    /// Vertical canvas coordinate.
    pub y: f64,
    /// Producer-side creation time (epoch milliseconds).
    #[ts(type = "number")]
    pub timestamp: i64,
}

/// A consumer cursor: "I have already seen events `[0, offset)`".
///
/// Always within `[0, len]` of the log it was clamped against.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub struct Offset(pub usize);

impl Offset {
    /// The start of the log.
    pub const ZERO: Self = Self(0);

    /// Clamp a client-supplied offset into `[0, len]`.
    ///
    /// Negative values mean "from the start"; values past the end mean
    /// "nothing new yet". Neither is an error.
    pub fn clamp(raw: i64, len: usize) -> Self {
        if raw <= 0 {
            return Self::ZERO;
        }
        Self(usize::try_from(raw).map_or(len, |value| value.min(len)))
    }

    /// Return the position as a plain index.
    pub const fn get(self) -> usize {
        self.0
    }
}

impl core::fmt::Display for Offset {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}
