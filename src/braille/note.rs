//! # Note Transcoding
//!
//! Turns one note or rest into its [`BrailleNote`]: every sign that must
//! directly precede or follow the value sign, in braille order.
//!
//! ## Sign order
//! 1. grace sign
//! 2. ornaments, then articulations, in the order they are attached
//! 3. accidental
//! 4. octave sign (see [`is_octave_sign_required`]) and the pitch/value cell,
//!    or a rest cell when the note has no pitch
//! 5. one dot per augmentation dot
//! 6. fingering, when enabled
//! 7. tie, or else a slur sign if a slur continues past this note
//!
//! ## Example
//! ```
//! use brlmusic::braille::note::BrailleNote;
//! use brlmusic::model::{BaseValue, Note, Pitch, Step, Value};
//!
//! let c4 = Note::pitched(Pitch::natural(Step::C, 4), Value::new(BaseValue::Quarter));
//! let first = BrailleNote::new(&c4, None, false).unwrap();
//! assert_eq!(first.text(), "⠐⠹");
//! ```

use std::fmt;

use crate::error::Result;
use crate::model::{Note, Pitch, Rest};

use super::list::SignList;
use super::repeat::Repeatable;
use super::sign::Sign;

/// The braille form of one note or rest
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BrailleNote {
    signs: SignList,
}

impl BrailleNote {
    /// Transcribe `note`. `last_pitch` is the pitch of the previous sounding
    /// note in the same voice and decides whether an octave sign is needed.
    pub fn new(note: &Note, last_pitch: Option<&Pitch>, show_fingering: bool) -> Result<Self> {
        let mut signs = SignList::new();

        if note.grace {
            signs.push(Sign::grace());
        }
        signs.extend(note.ornaments.iter().map(|&o| Sign::ornament(o)));
        signs.extend(note.articulations.iter().map(|&a| Sign::articulation(a)));
        if let Some(accidental) = note.accidental {
            signs.push(Sign::accidental(accidental));
        }

        match note.sounding_pitch() {
            Some(pitch) => {
                if is_octave_sign_required(&pitch, last_pitch) {
                    signs.push(Sign::octave(pitch.octave)?);
                }
                signs.push(Sign::pitch_and_value(pitch.step, note.value.base));
            }
            None => signs.push(Sign::rest(note.value.base)),
        }
        for _ in 0..note.value.dots {
            signs.push(Sign::augmentation_dot());
        }

        if show_fingering && !note.fingering.is_empty() {
            signs.push(Sign::fingering(&note.fingering)?);
        }

        if note.tie_start {
            signs.push(Sign::tie());
        } else if note.continues_slur() {
            signs.push(Sign::slur());
        }

        Ok(Self { signs })
    }

    pub fn rest(rest: &Rest) -> Self {
        let mut signs = SignList::new();
        signs.push(Sign::rest(rest.value.base));
        for _ in 0..rest.value.dots {
            signs.push(Sign::augmentation_dot());
        }
        Self { signs }
    }

    pub fn signs(&self) -> &SignList {
        &self.signs
    }

    pub fn text(&self) -> String {
        self.signs.render()
    }
}

impl Repeatable for BrailleNote {
    fn atom(&self) -> String {
        self.text()
    }
}

impl fmt::Display for BrailleNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.signs, f)
    }
}

/// The octave sign may be left out after a note less than a fourth away, or
/// a fourth or fifth away within the same octave. The first note of a voice
/// always gets one.
pub fn is_octave_sign_required(pitch: &Pitch, last_pitch: Option<&Pitch>) -> bool {
    match last_pitch {
        None => true,
        Some(last) => {
            let distance = pitch.distance(last);
            let close = distance < 5;
            let same_octave_leap = (5..=7).contains(&distance) && pitch.octave == last.octave;
            !(close || same_octave_leap)
        }
    }
}
