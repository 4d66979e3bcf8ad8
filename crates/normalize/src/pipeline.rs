use std::borrow::Cow;

use unicode_categories::UnicodeCategories;
use unicode_normalization::char::decompose_compatible;
use unicode_normalization::{is_nfc, UnicodeNormalization};
use unicode_segmentation::UnicodeSegmentation;

use crate::config::NormalizeConfig;
use crate::error::NormalizeError;
use crate::offset::OffsetMap;
use crate::whitespace::collapse_whitespace;

/// A character of work-in-progress output and the source index it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Traced {
    pub(crate) ch: char,
    pub(crate) origin: usize,
}

/// Output of one transform: the new text and its map from the input text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub text: String,
    pub map: OffsetMap,
}

impl Normalized {
    fn from_traced(source_len: usize, chars: Vec<Traced>) -> Self {
        let text = chars.iter().map(|t| t.ch).collect();
        let origins = chars.into_iter().map(|t| t.origin).collect();
        Self {
            text,
            map: OffsetMap::from_origins(source_len, origins),
        }
    }
}

/// Deterministic rule-based transform between text forms.
///
/// [`process`](Self::process) turns RAW text into PROCESSED text and
/// [`normalize`](Self::normalize) turns PROCESSED text into NORMALIZED text.
/// Both return the transformed string together with an [`OffsetMap`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextNormalizer {
    cfg: NormalizeConfig,
}

impl TextNormalizer {
    pub fn new(cfg: NormalizeConfig) -> Result<Self, NormalizeError> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &NormalizeConfig {
        &self.cfg
    }

    /// Light cleanup that keeps a near 1:1 correspondence with the input.
    pub fn process(&self, text: &str) -> Normalized {
        let mut chars = Vec::with_capacity(text.len());
        let mut char_index = 0;

        // Composition happens per grapheme cluster so that every produced
        // character can be attributed to the cluster's first character.
        for grapheme in text.graphemes(true) {
            let origin = char_index;
            char_index += grapheme.chars().count();

            let composed: Cow<str> = if self.cfg.compose_unicode && !is_nfc(grapheme) {
                Cow::Owned(grapheme.nfc().collect())
            } else {
                Cow::Borrowed(grapheme)
            };

            for ch in composed.chars() {
                if self.cfg.strip_control_chars && ch.is_control() && !ch.is_whitespace() {
                    continue;
                }
                chars.push(Traced { ch, origin });
            }
        }

        Normalized::from_traced(char_index, chars)
    }

    /// Full normalization used for matching and classification.
    ///
    /// Rules run in a fixed order; each assumes the previous ones ran:
    ///
    /// 1. strip leading and trailing wrapping punctuation
    /// 2. lowercase
    /// 3. fold diacritics
    /// 4. remove commas and trademark/registered signs
    /// 5. turn separator runs between tokens into single spaces
    /// 6. collapse whitespace and trim
    pub fn normalize(&self, text: &str) -> Normalized {
        let source_len = text.chars().count();
        let mut chars: Vec<Traced> = text
            .chars()
            .enumerate()
            .map(|(origin, ch)| Traced { ch, origin })
            .collect();

        strip_wrapping(&mut chars);
        if self.cfg.lowercase {
            chars = lowercase(chars);
        }
        if self.cfg.fold_diacritics {
            chars = fold_diacritics(chars);
        }
        chars.retain(|t| !is_removed_sign(t.ch));
        chars = replace_separators(chars);
        chars = collapse_whitespace(chars);

        Normalized::from_traced(source_len, chars)
    }
}

fn is_removed_sign(ch: char) -> bool {
    matches!(ch, ',' | '\u{2122}' | '\u{00AE}')
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '&' || ch == '\''
}

fn strip_wrapping(chars: &mut Vec<Traced>) {
    // Currency symbols may open a query ("$5 bill") but never close one.
    let start = chars
        .iter()
        .position(|t| is_word_char(t.ch) || t.ch.is_symbol_currency())
        .unwrap_or(chars.len());
    let end = chars
        .iter()
        .rposition(|t| is_word_char(t.ch))
        .map_or(start, |last| last + 1);

    if start >= end {
        chars.clear();
        return;
    }
    chars.truncate(end);
    chars.drain(..start);
}

fn lowercase(chars: Vec<Traced>) -> Vec<Traced> {
    let mut out = Vec::with_capacity(chars.len());
    for traced in chars {
        out.extend(traced.ch.to_lowercase().map(|ch| Traced {
            ch,
            origin: traced.origin,
        }));
    }
    out
}

/// Letters that carry no Unicode decomposition but still fold to ASCII.
fn fold_special(ch: char) -> Option<&'static str> {
    let folded = match ch {
        'ß' => "ss",
        'æ' => "ae",
        'Æ' => "AE",
        'œ' => "oe",
        'Œ' => "OE",
        'ø' => "o",
        'Ø' => "O",
        'ł' => "l",
        'Ł' => "L",
        'đ' | 'ð' => "d",
        'Đ' | 'Ð' => "D",
        'þ' => "th",
        'Þ' => "TH",
        'ı' => "i",
        _ => return None,
    };
    Some(folded)
}

fn fold_diacritics(chars: Vec<Traced>) -> Vec<Traced> {
    let mut out = Vec::with_capacity(chars.len());
    for traced in chars {
        let origin = traced.origin;
        // `™` decomposes to "TM"; it must reach the sign removal intact.
        if traced.ch.is_ascii() || is_removed_sign(traced.ch) {
            out.push(traced);
        } else if let Some(folded) = fold_special(traced.ch) {
            out.extend(folded.chars().map(|ch| Traced { ch, origin }));
        } else {
            decompose_compatible(traced.ch, |ch| {
                if !ch.is_mark() {
                    out.push(Traced { ch, origin });
                }
            });
        }
    }
    out
}

fn is_token_char(chars: &[Traced], idx: usize) -> bool {
    let ch = chars[idx].ch;
    if ch.is_alphanumeric() || ch == '&' || ch.is_symbol_currency() {
        return true;
    }
    if ch == '\'' {
        // Only apostrophes inside a word survive ("paul's", "don't").
        let before = idx > 0 && chars[idx - 1].ch.is_alphanumeric();
        let after = chars.get(idx + 1).is_some_and(|t| t.ch.is_alphanumeric());
        return before && after;
    }
    false
}

fn replace_separators(chars: Vec<Traced>) -> Vec<Traced> {
    let flags: Vec<bool> = (0..chars.len()).map(|i| is_token_char(&chars, i)).collect();
    let mut out = Vec::with_capacity(chars.len());
    let mut idx = 0;

    while idx < chars.len() {
        if flags[idx] {
            out.push(chars[idx]);
            idx += 1;
            continue;
        }

        let run_start = idx;
        while idx < chars.len() && !flags[idx] {
            idx += 1;
        }
        // Runs at either edge have no token on one side and vanish.
        if run_start == 0 || idx == chars.len() {
            continue;
        }

        let run = &chars[run_start..idx];
        let between_digits =
            chars[run_start - 1].ch.is_numeric() && chars[idx].ch.is_numeric();
        match run.iter().find(|t| t.ch.is_whitespace()) {
            Some(space) => out.push(Traced {
                ch: ' ',
                origin: space.origin,
            }),
            None if between_digits => out.extend_from_slice(run),
            None => out.push(Traced {
                ch: ' ',
                origin: run[0].origin,
            }),
        }
    }

    out
}
