use serde::{Deserialize, Serialize};

/// A whitespace-delimited token with character offsets into its text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Token {
    /// The token text content.
    pub text: String,
    /// Character offset (inclusive).
    pub start: usize,
    /// Character offset (exclusive).
    pub end: usize,
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        self.text.as_str()
    }
}

/// Splits normalized text into tokens with character offsets.
///
/// Normalized text is single-space separated, but any Unicode whitespace is
/// accepted as a delimiter so the helper also works on processed text.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut start: Option<usize> = None;

    for (idx, ch) in text.chars().enumerate() {
        if ch.is_whitespace() {
            if let Some(token_start) = start.take() {
                tokens.push(Token {
                    text: std::mem::take(&mut current),
                    start: token_start,
                    end: idx,
                });
            }
        } else {
            if start.is_none() {
                start = Some(idx);
            }
            current.push(ch);
        }
    }

    if let Some(token_start) = start {
        let end = token_start + current.chars().count();
        tokens.push(Token {
            text: current,
            start: token_start,
            end,
        });
    }

    tokens
}
