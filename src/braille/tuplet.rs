//! Tuplet signs.
//!
//! A plain triplet is written with the single cell 23. Every other tuplet,
//! and a triplet nested in another tuplet, is written as the introducer
//! (dots 456), the lower digit cell of its arity and a closing dot 3.

use crate::error::{BrailleError, Result};
use crate::model::Tuplet;

use super::glyph::{braille, Braille};
use super::sign::Sign;

/// Inner cell per arity 2..=7. There is no sign for a 4-tuplet.
const TUPLET_DOTS: [Option<u32>; 6] = [Some(23), Some(25), None, Some(26), Some(235), Some(2356)];

pub fn tuplet_sign(tuplet: &Tuplet) -> Result<Sign> {
    let arity = tuplet.arity;
    let nested = tuplet.parent.is_some();
    if arity == 3 && !nested {
        return Ok(Sign::tuplet(arity, nested, braille(&[23])));
    }
    let inner = arity
        .checked_sub(2)
        .and_then(|index| TUPLET_DOTS.get(index as usize).copied().flatten())
        .ok_or_else(|| {
            BrailleError::unsupported(format!("no braille sign for a tuplet of {}", arity))
        })?;
    let text = format!(
        "{}{}{}",
        Braille::TupletIntroducer,
        braille(&[inner]),
        Braille::Dot
    );
    Ok(Sign::tuplet(arity, nested, text))
}
