//! # Braille Layer
//!
//! Everything that produces braille cells, leaf first:
//!
//! - `glyph` - dot patterns to Unicode braille, the closed cell catalog
//! - `sign` - musical signs resolved to glyphs
//! - `tuplet` - tuplet signs
//! - `list` - sign streams and the dot 3 disambiguation pass
//! - `note` - one note or rest to its signs
//! - `repeat` - repeat abbreviation and occurrence counting
//! - `brf` - Braille ASCII export

pub mod brf;
pub mod glyph;
pub mod list;
pub mod note;
pub mod repeat;
pub mod sign;
pub mod tuplet;

pub use glyph::{braille, dots_to_bits, unicode_braille, Braille};
pub use list::SignList;
pub use note::BrailleNote;
pub use repeat::{repeat, OccurrenceCounter, Repeatable};
pub use sign::{PartIndicator, Sign, SignKind};
