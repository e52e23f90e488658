//! # Glyph Table
//!
//! Braille cells are declared as dot patterns: an integer whose decimal
//! digits name the raised dots, so `126` means dots 1, 2 and 6. A pattern
//! folds into a 6-bit mask (dot `d` sets bit `d - 1`) which is added to the
//! base of the Unicode braille block, U+2800.
//!
//! Every cell the transcriber can produce is declared here: the [`Braille`]
//! catalog for fixed signs, and two enumerated tables for the combinatorial
//! note and rest cells.

use std::fmt;

use crate::error::{BrailleError, Result};
use crate::model::{BaseValue, Step};

/// First code point of the Unicode braille patterns block
pub const BRAILLE_BASE: u32 = 0x2800;

/// Fold a dot pattern into its 6-bit mask.
///
/// # Panics
/// Panics if a decimal digit of `dots` is not a dot number 1-6. Patterns are
/// compile-time constants of the catalog, so this never fires at runtime.
pub const fn dots_to_bits(dots: u32) -> u8 {
    let mut bits = 0u8;
    let mut rest = dots;
    while rest > 0 {
        let dot = rest % 10;
        assert!(dot >= 1 && dot <= 6, "dot numbers range from 1 to 6");
        bits |= 1 << (dot - 1);
        rest /= 10;
    }
    bits
}

/// The braille cell with the given dot mask
pub fn unicode_braille(bits: u8) -> char {
    // The block spans exactly 256 code points, so every mask is valid.
    char::from_u32(BRAILLE_BASE | bits as u32).unwrap_or('\u{2800}')
}

/// Dot mask of a braille cell, `None` for any other character
pub fn cell_bits(cell: char) -> Option<u8> {
    let code = cell as u32;
    if (BRAILLE_BASE..=BRAILLE_BASE + 0xFF).contains(&code) {
        Some((code - BRAILLE_BASE) as u8)
    } else {
        None
    }
}

/// Dot pattern of a mask, the inverse of [`dots_to_bits`]. The empty cell is 0.
pub fn bits_to_dots(bits: u8) -> u32 {
    (0..6)
        .filter(|bit| bits & (1 << bit) != 0)
        .fold(0, |dots, bit| dots * 10 + bit + 1)
}

/// One code point per pattern, concatenated into a multi-cell glyph.
pub fn braille(dots: &[u32]) -> String {
    dots.iter()
        .map(|&pattern| unicode_braille(dots_to_bits(pattern)))
        .collect()
}

/// The fixed braille music signs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Braille {
    Dot,
    WholeRest,
    DoubleFlat,
    Flat,
    Natural,
    Sharp,
    DoubleSharp,
    ValueDistinction,
    NumberSign,
    SimileSign,
    Tie,
    Slur,
    Accent,
    Martellato,
    BreathMark,
    Staccato,
    MezzoStaccato,
    Staccatissimo,
    Tenuto,
    Grace,
    Mordent,
    InvertedMordent,
    Trill,
    Turn,
    FullMeasureInAccord,
    PartMeasureInAccord,
    PartMeasureInAccordDivision,
    Octave1,
    Octave2,
    Octave3,
    Octave4,
    Octave5,
    Octave6,
    Octave7,
    Octave8,
    Octave9,
    Second,
    Third,
    Fourth,
    Fifth,
    Sixth,
    Seventh,
    OctaveInterval,
    RightHandPart,
    SoloPart,
    LeftHandPart,
    Hyphen,
    PostDottedDoubleBar,
    DottedDoubleBar,
    DoubleBar,
    Fermata,
    FermataSquare,
    FermataTent,
    TupletIntroducer,
    Finger1,
    Finger2,
    Finger3,
    Finger4,
    Finger5,
    Digit0,
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    Digit5,
    Digit6,
    Digit7,
    Digit8,
    Digit9,
    LowerDigit0,
    LowerDigit1,
    LowerDigit2,
    LowerDigit3,
    LowerDigit4,
    LowerDigit5,
    LowerDigit6,
    LowerDigit7,
    LowerDigit8,
    LowerDigit9,
}

impl Braille {
    pub const ALL: [Braille; 79] = [
        Braille::Dot,
        Braille::WholeRest,
        Braille::DoubleFlat,
        Braille::Flat,
        Braille::Natural,
        Braille::Sharp,
        Braille::DoubleSharp,
        Braille::ValueDistinction,
        Braille::NumberSign,
        Braille::SimileSign,
        Braille::Tie,
        Braille::Slur,
        Braille::Accent,
        Braille::Martellato,
        Braille::BreathMark,
        Braille::Staccato,
        Braille::MezzoStaccato,
        Braille::Staccatissimo,
        Braille::Tenuto,
        Braille::Grace,
        Braille::Mordent,
        Braille::InvertedMordent,
        Braille::Trill,
        Braille::Turn,
        Braille::FullMeasureInAccord,
        Braille::PartMeasureInAccord,
        Braille::PartMeasureInAccordDivision,
        Braille::Octave1,
        Braille::Octave2,
        Braille::Octave3,
        Braille::Octave4,
        Braille::Octave5,
        Braille::Octave6,
        Braille::Octave7,
        Braille::Octave8,
        Braille::Octave9,
        Braille::Second,
        Braille::Third,
        Braille::Fourth,
        Braille::Fifth,
        Braille::Sixth,
        Braille::Seventh,
        Braille::OctaveInterval,
        Braille::RightHandPart,
        Braille::SoloPart,
        Braille::LeftHandPart,
        Braille::Hyphen,
        Braille::PostDottedDoubleBar,
        Braille::DottedDoubleBar,
        Braille::DoubleBar,
        Braille::Fermata,
        Braille::FermataSquare,
        Braille::FermataTent,
        Braille::TupletIntroducer,
        Braille::Finger1,
        Braille::Finger2,
        Braille::Finger3,
        Braille::Finger4,
        Braille::Finger5,
        Braille::Digit0,
        Braille::Digit1,
        Braille::Digit2,
        Braille::Digit3,
        Braille::Digit4,
        Braille::Digit5,
        Braille::Digit6,
        Braille::Digit7,
        Braille::Digit8,
        Braille::Digit9,
        Braille::LowerDigit0,
        Braille::LowerDigit1,
        Braille::LowerDigit2,
        Braille::LowerDigit3,
        Braille::LowerDigit4,
        Braille::LowerDigit5,
        Braille::LowerDigit6,
        Braille::LowerDigit7,
        Braille::LowerDigit8,
        Braille::LowerDigit9,
    ];

    /// Dot patterns of the cells making up this sign
    pub fn dots(self) -> &'static [u32] {
        match self {
            Braille::Dot => &[3],
            Braille::WholeRest => &[134],
            Braille::DoubleFlat => &[126, 126],
            Braille::Flat => &[126],
            Braille::Natural => &[16],
            Braille::Sharp => &[146],
            Braille::DoubleSharp => &[146, 146],
            Braille::ValueDistinction => &[126, 2],
            Braille::NumberSign => &[3456],
            Braille::SimileSign => &[2356],
            Braille::Tie => &[4, 14],
            Braille::Slur => &[14],
            Braille::Accent => &[46, 236],
            Braille::Martellato => &[56, 236],
            Braille::BreathMark => &[6, 34],
            Braille::Staccato => &[236],
            Braille::MezzoStaccato => &[5, 236],
            Braille::Staccatissimo => &[6, 236],
            Braille::Tenuto => &[456, 236],
            Braille::Grace => &[5, 26],
            Braille::Mordent => &[5, 235, 123],
            Braille::InvertedMordent => &[6, 235, 123],
            Braille::Trill => &[235],
            Braille::Turn => &[6, 256],
            Braille::FullMeasureInAccord => &[126, 345],
            Braille::PartMeasureInAccord => &[46, 13],
            Braille::PartMeasureInAccordDivision => &[5, 2],
            Braille::Octave1 => &[4, 4],
            Braille::Octave2 => &[4],
            Braille::Octave3 => &[45],
            Braille::Octave4 => &[456],
            Braille::Octave5 => &[5],
            Braille::Octave6 => &[46],
            Braille::Octave7 => &[56],
            Braille::Octave8 => &[6],
            Braille::Octave9 => &[6, 6],
            Braille::Second => &[34],
            Braille::Third => &[346],
            Braille::Fourth => &[3456],
            Braille::Fifth => &[35],
            Braille::Sixth => &[356],
            Braille::Seventh => &[25],
            Braille::OctaveInterval => &[36],
            Braille::RightHandPart => &[46, 345],
            Braille::SoloPart => &[5, 345],
            Braille::LeftHandPart => &[456, 345],
            Braille::Hyphen => &[5],
            Braille::PostDottedDoubleBar => &[126, 2356],
            Braille::DottedDoubleBar => &[126, 23],
            Braille::DoubleBar => &[126, 13],
            Braille::Fermata => &[126, 123],
            Braille::FermataSquare => &[56, 126, 123],
            Braille::FermataTent => &[45, 126, 123],
            Braille::TupletIntroducer => &[456],
            Braille::Finger1 => &[1],
            Braille::Finger2 => &[12],
            Braille::Finger3 => &[123],
            Braille::Finger4 => &[2],
            Braille::Finger5 => &[13],
            Braille::Digit0 => &[245],
            Braille::Digit1 => &[1],
            Braille::Digit2 => &[12],
            Braille::Digit3 => &[14],
            Braille::Digit4 => &[145],
            Braille::Digit5 => &[15],
            Braille::Digit6 => &[124],
            Braille::Digit7 => &[1245],
            Braille::Digit8 => &[125],
            Braille::Digit9 => &[24],
            Braille::LowerDigit0 => &[356],
            Braille::LowerDigit1 => &[2],
            Braille::LowerDigit2 => &[23],
            Braille::LowerDigit3 => &[25],
            Braille::LowerDigit4 => &[256],
            Braille::LowerDigit5 => &[26],
            Braille::LowerDigit6 => &[235],
            Braille::LowerDigit7 => &[2356],
            Braille::LowerDigit8 => &[236],
            Braille::LowerDigit9 => &[35],
        }
    }

    /// Part signs need an extra dot 3 when a cell with dot 1, 2 or 3 follows.
    pub fn needs_additional_dot3(self) -> bool {
        matches!(
            self,
            Braille::LeftHandPart | Braille::SoloPart | Braille::RightHandPart
        )
    }

    /// Octave sign for an octave number (middle C lies in octave 4).
    pub fn octave(number: i8) -> Result<Braille> {
        let sign = match number {
            0 => Braille::Octave1,
            1 => Braille::Octave2,
            2 => Braille::Octave3,
            3 => Braille::Octave4,
            4 => Braille::Octave5,
            5 => Braille::Octave6,
            6 => Braille::Octave7,
            7 => Braille::Octave8,
            8 => Braille::Octave9,
            other => {
                return Err(BrailleError::unsupported(format!(
                    "no octave sign for octave {}",
                    other
                )))
            }
        };
        Ok(sign)
    }

    pub fn upper_digit(digit: u8) -> Option<Braille> {
        UPPER_DIGITS.get(digit as usize).copied()
    }

    pub fn lower_digit(digit: u8) -> Option<Braille> {
        LOWER_DIGITS.get(digit as usize).copied()
    }

    /// Interval sign, from a second (2) up to an octave (8)
    pub fn interval(interval: u8) -> Option<Braille> {
        match interval {
            2 => Some(Braille::Second),
            3 => Some(Braille::Third),
            4 => Some(Braille::Fourth),
            5 => Some(Braille::Fifth),
            6 => Some(Braille::Sixth),
            7 => Some(Braille::Seventh),
            8 => Some(Braille::OctaveInterval),
            _ => None,
        }
    }

    pub fn finger(finger: u8) -> Result<Braille> {
        match finger {
            1 => Ok(Braille::Finger1),
            2 => Ok(Braille::Finger2),
            3 => Ok(Braille::Finger3),
            4 => Ok(Braille::Finger4),
            5 => Ok(Braille::Finger5),
            other => Err(BrailleError::unsupported(format!(
                "no fingering sign for finger {}",
                other
            ))),
        }
    }

    /// Bit mask of the first cell
    pub fn first_cell_bits(self) -> u8 {
        self.dots().first().map_or(0, |&pattern| dots_to_bits(pattern))
    }
}

impl fmt::Display for Braille {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&braille(self.dots()))
    }
}

const UPPER_DIGITS: [Braille; 10] = [
    Braille::Digit0,
    Braille::Digit1,
    Braille::Digit2,
    Braille::Digit3,
    Braille::Digit4,
    Braille::Digit5,
    Braille::Digit6,
    Braille::Digit7,
    Braille::Digit8,
    Braille::Digit9,
];

const LOWER_DIGITS: [Braille; 10] = [
    Braille::LowerDigit0,
    Braille::LowerDigit1,
    Braille::LowerDigit2,
    Braille::LowerDigit3,
    Braille::LowerDigit4,
    Braille::LowerDigit5,
    Braille::LowerDigit6,
    Braille::LowerDigit7,
    Braille::LowerDigit8,
    Braille::LowerDigit9,
];

/// Decimal digits of `number` in upper-cell digits, most significant first
pub fn upper_number(number: usize) -> String {
    number
        .to_string()
        .bytes()
        .map(|b| UPPER_DIGITS[(b - b'0') as usize].to_string())
        .collect()
}

/// The four braille value classes; each covers two rhythmic values.
fn value_class(value: BaseValue) -> usize {
    match value {
        BaseValue::Whole | BaseValue::Sixteenth => 0,
        BaseValue::Half | BaseValue::ThirtySecond => 1,
        BaseValue::Quarter | BaseValue::SixtyFourth => 2,
        BaseValue::Eighth | BaseValue::OneHundredTwentyEighth => 3,
    }
}

fn step_index(step: Step) -> usize {
    match step {
        Step::C => 0,
        Step::D => 1,
        Step::E => 2,
        Step::F => 3,
        Step::G => 4,
        Step::A => 5,
        Step::B => 6,
    }
}

/// Note cells by value class (rows) and step C..B (columns)
const NOTE_DOTS: [[u32; 7]; 4] = [
    [13456, 1356, 12346, 123456, 12356, 2346, 23456],
    [1345, 135, 1234, 12345, 1235, 234, 2345],
    [1456, 156, 1246, 12456, 1256, 246, 2456],
    [145, 15, 124, 1245, 125, 24, 245],
];

const REST_DOTS: [u32; 4] = [134, 136, 1236, 1346];

/// Dot pattern of the cell combining a step and a rhythmic value
pub fn pitch_and_value_dots(step: Step, value: BaseValue) -> u32 {
    NOTE_DOTS[value_class(value)][step_index(step)]
}

pub fn rest_dots(value: BaseValue) -> u32 {
    REST_DOTS[value_class(value)]
}

/// Every dot pattern that can appear in transcriber output
pub fn all_patterns() -> Vec<u32> {
    let mut patterns: Vec<u32> = Braille::ALL
        .iter()
        .flat_map(|sign| sign.dots().iter().copied())
        .chain(NOTE_DOTS.iter().flatten().copied())
        .chain(REST_DOTS.iter().copied())
        .collect();
    patterns.sort_unstable();
    patterns.dedup();
    patterns
}
