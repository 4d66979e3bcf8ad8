//! Character offset maps between two text forms.
//!
//! An [`OffsetMap`] relates every character index of a source string to an
//! index of the destination string produced from it, and back.
//!
//! ```text
//! source:  T e s t :   O n e .
//!          0 1 2 3 4 5 6 7 8 9
//!                  │  ╲
//! dest:    t e s t   o n e
//!          0 1 2 3 4 5 6 7
//! ```
//!
//! - Forward, a retained character maps to the first character it produced.
//!   A deleted character (`:` and `.` above) maps to the destination index of
//!   the nearest preceding retained character, or to 0 when nothing precedes
//!   it. Several source indices can therefore share one destination index.
//! - Backward, a destination character maps to the source character it
//!   originated from, which is always the leftmost source index mapping to it
//!   among the retained characters.
//!
//! All indices count Unicode scalar values, not bytes.

use serde::{Deserialize, Serialize};

use crate::error::NormalizeError;

/// Monotonic index correspondence between a source and a destination string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetMap {
    forward: Vec<usize>,
    backward: Vec<usize>,
}

impl OffsetMap {
    /// A map between two strings of the same length whose characters align 1:1.
    pub fn identity(len: usize) -> Self {
        Self {
            forward: (0..len).collect(),
            backward: (0..len).collect(),
        }
    }

    /// Builds a map from the origin of every destination character.
    ///
    /// `origins[j]` is the source index destination character `j` came from.
    /// Origins must be non-decreasing and below `source_len`.
    pub(crate) fn from_origins(source_len: usize, origins: Vec<usize>) -> Self {
        debug_assert!(origins.windows(2).all(|w| w[0] <= w[1]));
        debug_assert!(origins.last().map_or(true, |&o| o < source_len));

        let mut forward = Vec::with_capacity(source_len);
        let mut next = 0;
        let mut preceding: Option<usize> = None;
        for index in 0..source_len {
            if next < origins.len() && origins[next] == index {
                forward.push(next);
                while next < origins.len() && origins[next] == index {
                    next += 1;
                }
                preceding = Some(next - 1);
            } else {
                forward.push(preceding.unwrap_or(0));
            }
        }

        Self {
            forward,
            backward: origins,
        }
    }

    /// Number of characters in the source string.
    pub fn source_len(&self) -> usize {
        self.forward.len()
    }

    /// Number of characters in the destination string.
    pub fn target_len(&self) -> usize {
        self.backward.len()
    }

    /// Maps a source index to its destination index.
    pub fn forward(&self, index: usize) -> Result<usize, NormalizeError> {
        self.forward
            .get(index)
            .copied()
            .ok_or(NormalizeError::OutOfRange {
                index,
                len: self.source_len(),
            })
    }

    /// Maps a destination index back to the source character it came from.
    pub fn backward(&self, index: usize) -> Result<usize, NormalizeError> {
        self.backward
            .get(index)
            .copied()
            .ok_or(NormalizeError::OutOfRange {
                index,
                len: self.target_len(),
            })
    }

    /// Chains `self` (A to B) with `next` (B to C) into a map from A to C.
    pub fn compose(&self, next: &OffsetMap) -> OffsetMap {
        // A forward value equals `target_len` only when B is empty; such
        // positions land on the end of C.
        let forward = self
            .forward
            .iter()
            .map(|&mid| next.forward.get(mid).copied().unwrap_or(next.target_len()))
            .collect();
        let backward = next
            .backward
            .iter()
            .map(|&mid| self.backward[mid])
            .collect();
        OffsetMap { forward, backward }
    }
}
