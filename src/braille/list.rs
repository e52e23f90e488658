//! Sign streams and the dot 3 disambiguation pass.
//!
//! Part signs end in a cell that would run into a following note whose first
//! cell has dot 1, 2 or 3. Once all signs of a stream are rendered, a dot 3
//! cell is inserted between such a pair. The pass looks at the concatenated
//! stream, so it also applies across sign and note boundaries.

use std::fmt;

use super::glyph::{cell_bits, Braille};
use super::sign::Sign;

/// Dots 1, 2 and 3
const LEFT_COLUMN: u8 = 0b000_111;

/// Rendered text plus whether it wants the dot 3 separator after it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub text: String,
    pub needs_dot3: bool,
}

impl Fragment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            needs_dot3: false,
        }
    }

    fn first_cell_bits(&self) -> u8 {
        self.text.chars().next().and_then(cell_bits).unwrap_or(0)
    }
}

impl From<&Sign> for Fragment {
    fn from(sign: &Sign) -> Self {
        Self {
            text: sign.text().to_string(),
            needs_dot3: sign.needs_additional_dot3(),
        }
    }
}

/// Concatenate fragments, inserting dot 3 where a flagged fragment meets a
/// fragment starting with dot 1, 2 or 3. Empty fragments are skipped.
pub fn join_fragments<I>(fragments: I) -> String
where
    I: IntoIterator<Item = Fragment>,
{
    let fragments: Vec<Fragment> = fragments
        .into_iter()
        .filter(|fragment| !fragment.text.is_empty())
        .collect();
    let mut text = String::new();
    for (index, fragment) in fragments.iter().enumerate() {
        text.push_str(&fragment.text);
        if !fragment.needs_dot3 {
            continue;
        }
        if let Some(next) = fragments.get(index + 1) {
            if next.first_cell_bits() & LEFT_COLUMN != 0 {
                text.push_str(&Braille::Dot.to_string());
            }
        }
    }
    text
}

/// An ordered sequence of signs
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SignList {
    signs: Vec<Sign>,
}

impl SignList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sign: Sign) {
        self.signs.push(sign);
    }

    pub fn signs(&self) -> &[Sign] {
        &self.signs
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sign> {
        self.signs.iter()
    }

    pub fn len(&self) -> usize {
        self.signs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signs.is_empty()
    }

    /// The braille text of all signs after disambiguation
    pub fn render(&self) -> String {
        join_fragments(self.signs.iter().map(Fragment::from))
    }
}

impl Extend<Sign> for SignList {
    fn extend<I: IntoIterator<Item = Sign>>(&mut self, iter: I) {
        self.signs.extend(iter);
    }
}

impl FromIterator<Sign> for SignList {
    fn from_iter<I: IntoIterator<Item = Sign>>(iter: I) -> Self {
        Self {
            signs: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a SignList {
    type Item = &'a Sign;
    type IntoIter = std::slice::Iter<'a, Sign>;

    fn into_iter(self) -> Self::IntoIter {
        self.signs.iter()
    }
}

impl fmt::Display for SignList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
