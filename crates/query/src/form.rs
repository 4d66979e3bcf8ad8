use std::fmt;

use serde::{Deserialize, Serialize};

/// The textual views a [`Query`](crate::Query) keeps of its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextForm {
    /// The input exactly as received.
    Raw,
    /// Lightly cleaned, near 1:1 with raw.
    Processed,
    /// Fully normalized for matching.
    Normalized,
}

impl TextForm {
    pub const ALL: [TextForm; 3] = [TextForm::Raw, TextForm::Processed, TextForm::Normalized];

    pub fn as_str(&self) -> &'static str {
        match self {
            TextForm::Raw => "raw",
            TextForm::Processed => "processed",
            TextForm::Normalized => "normalized",
        }
    }
}

impl fmt::Display for TextForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}
