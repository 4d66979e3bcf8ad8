//! Configuration types for the query text normalizer.
//!
//! [`NormalizeConfig`] toggles the optional stages of the two transforms the
//! normalizer performs: RAW to PROCESSED (light cleanup) and PROCESSED to
//! NORMALIZED (the full matching form). The structural rules (wrapping
//! punctuation, separator runs, whitespace collapsing) are always applied;
//! they define what "normalized" means and are not negotiable per caller.
//!
//! # Versioning
//!
//! Any change to normalization output must be accompanied by a `version`
//! bump. Offsets stored by downstream consumers are only meaningful against
//! the version that produced them.
//!
//! # Examples
//!
//! ```rust
//! use normalize::NormalizeConfig;
//!
//! let config = NormalizeConfig::default();
//! assert_eq!(config.version, 1);
//! assert!(config.lowercase);
//! assert!(config.fold_diacritics);
//! ```
//!
//! ```rust
//! use normalize::NormalizeConfig;
//!
//! // Keep accents, e.g. for a language where they are significant.
//! let config = NormalizeConfig {
//!     fold_diacritics: false,
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::NormalizeError;

/// Configuration for [`TextNormalizer`](crate::TextNormalizer).
///
/// Serializes as:
///
/// ```json
/// {
///   "version": 1,
///   "compose_unicode": true,
///   "strip_control_chars": true,
///   "lowercase": true,
///   "fold_diacritics": true
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Version of the normalization behavior. Must be >= 1.
    pub version: u32,

    /// PROCESSED stage: compose each grapheme cluster to NFC.
    ///
    /// `"Cafe\u{0301}"` and `"Caf\u{00E9}"` produce the same processed text,
    /// and the combining accent's index maps onto the composed character.
    pub compose_unicode: bool,

    /// PROCESSED stage: drop control characters other than whitespace.
    pub strip_control_chars: bool,

    /// NORMALIZED stage: apply locale-free Unicode lowercasing.
    pub lowercase: bool,

    /// NORMALIZED stage: fold accented letters to their base letters.
    ///
    /// Uses compatibility decomposition with combining marks dropped, plus a
    /// small table for letters that have no decomposition (`ß`, `æ`, `ø`, ...).
    pub fold_diacritics: bool,
}

impl NormalizeConfig {
    /// Checks the configuration before a normalizer is built from it.
    pub fn validate(&self) -> Result<(), NormalizeError> {
        if self.version == 0 {
            return Err(NormalizeError::InvalidConfig(
                "config version must be >= 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            version: 1,
            compose_unicode: true,
            strip_control_chars: true,
            lowercase: true,
            fold_diacritics: true,
        }
    }
}
