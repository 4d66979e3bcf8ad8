//! Query text normalization layer.
//!
//! Turns user input into the text forms an NLU pipeline works with and keeps
//! an exact character correspondence between them.
//!
//! ## What we do
//!
//! - RAW to PROCESSED: per-grapheme NFC composition, control characters removed
//! - PROCESSED to NORMALIZED: wrapping punctuation stripped, lowercased,
//!   diacritics folded, separators collapsed to single spaces
//! - An [`OffsetMap`] for every transform, so spans found on normalized text
//!   can be reported against what the user actually typed
//!
//! ## Pure function guarantee
//!
//! No I/O, no clock calls, no locale dependence. Same text and config give the
//! same output and the same offsets on any machine.
//!
//! ## Invariants worth knowing
//!
//! - Offsets count Unicode scalar values, not bytes
//! - Offset maps are monotonic; many source indices may share one destination
//! - The backward map always points at a character that survived

mod config;
mod error;
mod offset;
mod pipeline;
mod token;
mod whitespace;

pub use crate::config::NormalizeConfig;
pub use crate::error::NormalizeError;
pub use crate::offset::OffsetMap;
pub use crate::pipeline::{Normalized, TextNormalizer};
pub use crate::token::{tokenize, Token};
