//! Whitespace collapsing over traced characters.
//!
//! The normalizer works on a sequence of characters that each remember the
//! source index they came from. Collapsing whitespace must keep those origins
//! intact, so this is a traced variant of the usual split-and-join.

use crate::pipeline::Traced;

/// Collapses whitespace runs to a single `' '`, trims both ends.
///
/// The surviving space of a run keeps the origin of the run's first
/// whitespace character.
pub(crate) fn collapse_whitespace(chars: Vec<Traced>) -> Vec<Traced> {
    let mut collapsed: Vec<Traced> = Vec::with_capacity(chars.len());
    let mut pending_space: Option<usize> = None;

    for traced in chars {
        if traced.ch.is_whitespace() {
            if pending_space.is_none() && !collapsed.is_empty() {
                pending_space = Some(traced.origin);
            }
            continue;
        }
        if let Some(origin) = pending_space.take() {
            collapsed.push(Traced { ch: ' ', origin });
        }
        collapsed.push(traced);
    }

    collapsed
}
