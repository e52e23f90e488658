//! # Sign Catalog
//!
//! A [`Sign`] is one musical symbol in braille: a grace note sign, an octave
//! mark, the cell for a quarter C, a tuplet sign. Every sign is built from a
//! closed [`SignKind`] and resolves its glyph sequence once, at construction,
//! so rendering a sign never fails.
//!
//! Constructors for kinds whose glyphs are looked up in a partial table
//! (octaves, digits, fingers) return `Result` and fail with
//! `UnsupportedNotation` outside that table.
//!
//! ## Related Modules
//! - `glyph` - the dot patterns every sign resolves to
//! - `note` - assembles signs into a `BrailleNote`
//! - `tuplet` - builds tuplet signs

use std::fmt;

use crate::error::{BrailleError, Result};
use crate::model::{Accidental, Articulation, BaseValue, Ornament, Step};

use super::glyph::{braille, pitch_and_value_dots, rest_dots, Braille};

/// Hand or solo part indicator for keyboard music
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartIndicator {
    RightHand,
    LeftHand,
    Solo,
}

impl PartIndicator {
    fn glyph(self) -> Braille {
        match self {
            PartIndicator::RightHand => Braille::RightHandPart,
            PartIndicator::LeftHand => Braille::LeftHandPart,
            PartIndicator::Solo => Braille::SoloPart,
        }
    }
}

/// What a sign stands for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SignKind {
    Grace,
    Ornament(Ornament),
    Articulation(Articulation),
    Accidental(Accidental),
    Octave(i8),
    PitchAndValue(Step, BaseValue),
    Rest(BaseValue),
    AugmentationDot,
    Tie,
    Slur,
    Tuplet { arity: u32, nested: bool },
    Digit(u8),
    LowerDigit(u8),
    Fingering(Vec<u8>),
    PartIndicator(PartIndicator),
}

/// Presentation category of a sign. Has no bearing on the braille output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignCategory {
    Ornament,
    Articulation,
    Accidental,
    Octave,
    Note,
    Rest,
    Dot,
    Connective,
    Tuplet,
    Number,
    Fingering,
    PartIndicator,
}

impl SignCategory {
    /// RGB color used by viewers highlighting signs by category
    pub fn color(self) -> (u8, u8, u8) {
        match self {
            SignCategory::Ornament => (0, 255, 0),
            SignCategory::Articulation => (0, 250, 154),
            SignCategory::Accidental => (255, 140, 0),
            SignCategory::Octave => (0, 0, 255),
            SignCategory::Note | SignCategory::Rest | SignCategory::Dot => (0, 0, 0),
            SignCategory::Connective => (139, 69, 19),
            SignCategory::Tuplet | SignCategory::Number => (128, 0, 128),
            SignCategory::Fingering => (255, 0, 255),
            SignCategory::PartIndicator => (255, 0, 0),
        }
    }
}

/// One braille music sign with its resolved glyphs
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sign {
    kind: SignKind,
    text: String,
}

impl Sign {
    fn fixed(kind: SignKind, glyph: Braille) -> Self {
        Self {
            kind,
            text: glyph.to_string(),
        }
    }

    pub fn grace() -> Self {
        Self::fixed(SignKind::Grace, Braille::Grace)
    }

    pub fn ornament(ornament: Ornament) -> Self {
        let glyph = match ornament {
            Ornament::Mordent => Braille::Mordent,
            Ornament::InvertedMordent => Braille::InvertedMordent,
            Ornament::Trill => Braille::Trill,
            Ornament::Turn => Braille::Turn,
        };
        Self::fixed(SignKind::Ornament(ornament), glyph)
    }

    pub fn articulation(articulation: Articulation) -> Self {
        let glyph = match articulation {
            Articulation::Accent => Braille::Accent,
            Articulation::StrongAccent => Braille::Martellato,
            Articulation::BreathMark => Braille::BreathMark,
            Articulation::Staccato => Braille::Staccato,
            Articulation::MezzoStaccato => Braille::MezzoStaccato,
            Articulation::Staccatissimo => Braille::Staccatissimo,
            Articulation::Tenuto => Braille::Tenuto,
        };
        Self::fixed(SignKind::Articulation(articulation), glyph)
    }

    pub fn accidental(accidental: Accidental) -> Self {
        let glyph = match accidental {
            Accidental::Sharp => Braille::Sharp,
            Accidental::DoubleSharp => Braille::DoubleSharp,
            Accidental::Flat => Braille::Flat,
            Accidental::DoubleFlat => Braille::DoubleFlat,
            Accidental::Natural => Braille::Natural,
        };
        Self::fixed(SignKind::Accidental(accidental), glyph)
    }

    pub fn octave(octave: i8) -> Result<Self> {
        Ok(Self::fixed(SignKind::Octave(octave), Braille::octave(octave)?))
    }

    pub fn pitch_and_value(step: Step, value: BaseValue) -> Self {
        Self {
            kind: SignKind::PitchAndValue(step, value),
            text: braille(&[pitch_and_value_dots(step, value)]),
        }
    }

    pub fn rest(value: BaseValue) -> Self {
        Self {
            kind: SignKind::Rest(value),
            text: braille(&[rest_dots(value)]),
        }
    }

    pub fn augmentation_dot() -> Self {
        Self::fixed(SignKind::AugmentationDot, Braille::Dot)
    }

    pub fn tie() -> Self {
        Self::fixed(SignKind::Tie, Braille::Tie)
    }

    pub fn slur() -> Self {
        Self::fixed(SignKind::Slur, Braille::Slur)
    }

    /// A tuplet sign from already looked-up glyphs; see `tuplet::tuplet_sign`.
    pub(crate) fn tuplet(arity: u32, nested: bool, text: String) -> Self {
        Self {
            kind: SignKind::Tuplet { arity, nested },
            text,
        }
    }

    pub fn digit(digit: u8) -> Result<Self> {
        let glyph = Braille::upper_digit(digit)
            .ok_or_else(|| BrailleError::unsupported(format!("{} is not a digit", digit)))?;
        Ok(Self::fixed(SignKind::Digit(digit), glyph))
    }

    pub fn lower_digit(digit: u8) -> Result<Self> {
        let glyph = Braille::lower_digit(digit)
            .ok_or_else(|| BrailleError::unsupported(format!("{} is not a digit", digit)))?;
        Ok(Self::fixed(SignKind::LowerDigit(digit), glyph))
    }

    /// Finger numbers of one note, joined by the finger change cell.
    pub fn fingering(fingers: &[u8]) -> Result<Self> {
        let cells = fingers
            .iter()
            .map(|&finger| Braille::finger(finger).map(|glyph| glyph.to_string()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            kind: SignKind::Fingering(fingers.to_vec()),
            text: cells.join(&Braille::Slur.to_string()),
        })
    }

    pub fn part_indicator(indicator: PartIndicator) -> Self {
        Self::fixed(SignKind::PartIndicator(indicator), indicator.glyph())
    }

    pub fn kind(&self) -> &SignKind {
        &self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of braille cells
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Requires an extra dot 3 cell when the next cell has dot 1, 2 or 3.
    pub fn needs_additional_dot3(&self) -> bool {
        match &self.kind {
            SignKind::PartIndicator(indicator) => indicator.glyph().needs_additional_dot3(),
            _ => false,
        }
    }

    pub fn category(&self) -> SignCategory {
        match &self.kind {
            SignKind::Grace | SignKind::Ornament(_) => SignCategory::Ornament,
            SignKind::Articulation(_) => SignCategory::Articulation,
            SignKind::Accidental(_) => SignCategory::Accidental,
            SignKind::Octave(_) => SignCategory::Octave,
            SignKind::PitchAndValue(..) => SignCategory::Note,
            SignKind::Rest(_) => SignCategory::Rest,
            SignKind::AugmentationDot => SignCategory::Dot,
            SignKind::Tie | SignKind::Slur => SignCategory::Connective,
            SignKind::Tuplet { .. } => SignCategory::Tuplet,
            SignKind::Digit(_) | SignKind::LowerDigit(_) => SignCategory::Number,
            SignKind::Fingering(_) => SignCategory::Fingering,
            SignKind::PartIndicator(_) => SignCategory::PartIndicator,
        }
    }

    pub fn description(&self) -> String {
        match &self.kind {
            SignKind::Grace => "Indicates that this is a grace note".to_string(),
            SignKind::Ornament(ornament) => match ornament {
                Ornament::Mordent => "A mordent sign".to_string(),
                Ornament::InvertedMordent => "An inverted mordent sign".to_string(),
                Ornament::Trill => "A trill sign".to_string(),
                Ornament::Turn => "A turn sign".to_string(),
            },
            SignKind::Articulation(articulation) => match articulation {
                Articulation::Accent => "An accent sign".to_string(),
                Articulation::StrongAccent => "A martellato (strong accent) sign".to_string(),
                Articulation::BreathMark => "A breath mark".to_string(),
                Articulation::Staccato => "A staccato sign".to_string(),
                Articulation::MezzoStaccato => "A mezzo staccato sign".to_string(),
                Articulation::Staccatissimo => "A staccatissimo sign".to_string(),
                Articulation::Tenuto => "A tenuto sign".to_string(),
            },
            SignKind::Accidental(accidental) => format!("A {} sign", accidental),
            SignKind::Octave(octave) => format!("Octave sign for octave {}", octave),
            SignKind::PitchAndValue(step, value) => {
                format!("The note {:?} with value {:?}", step, value)
            }
            SignKind::Rest(value) => format!("A {:?} rest", value),
            SignKind::AugmentationDot => "An augmentation dot".to_string(),
            SignKind::Tie => "A tie to the next note".to_string(),
            SignKind::Slur => "A slur to the next note".to_string(),
            SignKind::Tuplet { arity, .. } => format!("Indicates a tuplet of {}", arity),
            SignKind::Digit(digit) => format!("Upper digit {}", digit),
            SignKind::LowerDigit(digit) => format!("Lower digit {}", digit),
            SignKind::Fingering(fingers) => format!("Fingering {:?}", fingers),
            SignKind::PartIndicator(PartIndicator::RightHand) => {
                "Right hand part".to_string()
            }
            SignKind::PartIndicator(PartIndicator::LeftHand) => "Left hand part".to_string(),
            SignKind::PartIndicator(PartIndicator::Solo) => "Solo part".to_string(),
        }
    }
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_signs() {
        assert_eq!(Sign::grace().text(), braille(&[5, 26]));
        assert_eq!(Sign::ornament(Ornament::Mordent).len(), 3);
        assert_eq!(
            Sign::articulation(Articulation::StrongAccent).text(),
            braille(&[56, 236])
        );
        assert_eq!(Sign::accidental(Accidental::DoubleFlat).text(), braille(&[126, 126]));
    }

    #[test]
    fn test_fingering_joins_fingers() {
        let sign = Sign::fingering(&[1, 3]).unwrap();
        assert_eq!(sign.text(), braille(&[1, 14, 123]));
        assert!(Sign::fingering(&[6]).is_err());
    }

    #[test]
    fn test_part_indicators_need_dot3() {
        assert!(Sign::part_indicator(PartIndicator::LeftHand).needs_additional_dot3());
        assert!(Sign::part_indicator(PartIndicator::Solo).needs_additional_dot3());
        assert!(!Sign::tie().needs_additional_dot3());
    }

    #[test]
    fn test_categories_and_descriptions() {
        let sign = Sign::accidental(Accidental::Sharp);
        assert_eq!(sign.category(), SignCategory::Accidental);
        assert_eq!(sign.description(), "A sharp sign");
        assert_eq!(Sign::ornament(Ornament::Trill).category().color(), (0, 255, 0));
    }

    #[test]
    fn test_digits_out_of_range() {
        assert_eq!(Sign::digit(7).unwrap().text(), braille(&[1245]));
        assert_eq!(Sign::lower_digit(0).unwrap().text(), braille(&[356]));
        assert!(Sign::digit(10).is_err());
    }
}
