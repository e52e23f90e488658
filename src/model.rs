//! # Score Model
//!
//! The read-only event timeline handed to the transcriber by the ingestion
//! layer.
//!
//! ## Type Hierarchy
//! ```text
//! Score
//!   └── Vec<Part>
//!         ├── name
//!         ├── TupletArena (tuplets of this part, parents always earlier)
//!         └── Vec<Event> (time ordered)
//!
//! Event (enum)
//!   ├── Note        pitched, unpitched or pitchless note
//!   ├── Rest
//!   ├── StartBar    declares the staff count of the following measure
//!   ├── EndBar
//!   ├── ClefChange  bound to one staff
//!   └── KeyChange   bound to one staff, or to all staves when `staff` is None
//! ```
//!
//! ## Vertical events
//! Bar lines (and key changes without a staff) apply to every staff at once;
//! the segmenter copies them into each staff stream. Everything else names
//! the staff it lives on, and notes and rests also name their voice.

use std::fmt;
use std::str::FromStr;

use num_rational::Rational32;

use crate::error::{BrailleError, Result};

/// Position of a clef or key change, in whole notes from the start of the part.
pub type Offset = Rational32;

/// Diatonic step (note name) of a pitch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Step {
    /// Semitones above C
    pub fn semitone(self) -> i32 {
        match self {
            Step::C => 0,
            Step::D => 2,
            Step::E => 4,
            Step::F => 5,
            Step::G => 7,
            Step::A => 9,
            Step::B => 11,
        }
    }
}

impl FromStr for Step {
    type Err = BrailleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "C" | "c" => Ok(Step::C),
            "D" | "d" => Ok(Step::D),
            "E" | "e" => Ok(Step::E),
            "F" | "f" => Ok(Step::F),
            "G" | "g" => Ok(Step::G),
            "A" | "a" => Ok(Step::A),
            "B" | "b" => Ok(Step::B),
            other => Err(BrailleError::invariant(format!("unknown step '{}'", other))),
        }
    }
}

/// A sounding (or displayed) pitch. Middle C is C4, MIDI 60.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pitch {
    pub step: Step,
    /// Chromatic alteration in semitones (-1 = flat, 1 = sharp)
    pub alter: i8,
    pub octave: i8,
}

impl Pitch {
    pub fn new(step: Step, alter: i8, octave: i8) -> Self {
        Self { step, alter, octave }
    }

    pub fn natural(step: Step, octave: i8) -> Self {
        Self::new(step, 0, octave)
    }

    pub fn midi(&self) -> i32 {
        (self.octave as i32 + 1) * 12 + self.step.semitone() + self.alter as i32
    }

    /// Distance in semitones, regardless of direction
    pub fn distance(&self, other: &Pitch) -> u32 {
        (self.midi() - other.midi()).unsigned_abs()
    }
}

/// Undotted rhythmic value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseValue {
    Whole,
    Half,
    Quarter,
    Eighth,
    Sixteenth,
    ThirtySecond,
    SixtyFourth,
    OneHundredTwentyEighth,
}

impl FromStr for BaseValue {
    type Err = BrailleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "whole" => Ok(BaseValue::Whole),
            "half" => Ok(BaseValue::Half),
            "quarter" => Ok(BaseValue::Quarter),
            "eighth" => Ok(BaseValue::Eighth),
            "16th" => Ok(BaseValue::Sixteenth),
            "32nd" => Ok(BaseValue::ThirtySecond),
            "64th" => Ok(BaseValue::SixtyFourth),
            "128th" => Ok(BaseValue::OneHundredTwentyEighth),
            other => Err(BrailleError::invariant(format!(
                "unknown note value '{}'",
                other
            ))),
        }
    }
}

/// Rhythmic value: base duration plus augmentation dots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Value {
    pub base: BaseValue,
    pub dots: u8,
}

impl Value {
    pub fn new(base: BaseValue) -> Self {
        Self { base, dots: 0 }
    }

    pub fn dotted(base: BaseValue, dots: u8) -> Self {
        Self { base, dots }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accidental {
    Sharp,
    DoubleSharp,
    Flat,
    DoubleFlat,
    Natural,
}

impl FromStr for Accidental {
    type Err = BrailleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "sharp" => Ok(Accidental::Sharp),
            "double-sharp" => Ok(Accidental::DoubleSharp),
            "flat" => Ok(Accidental::Flat),
            "flat-flat" | "double-flat" => Ok(Accidental::DoubleFlat),
            "natural" => Ok(Accidental::Natural),
            other => Err(BrailleError::invariant(format!(
                "unknown accidental '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Accidental {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Accidental::Sharp => "sharp",
            Accidental::DoubleSharp => "double sharp",
            Accidental::Flat => "flat",
            Accidental::DoubleFlat => "double flat",
            Accidental::Natural => "natural",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ornament {
    Mordent,
    InvertedMordent,
    Trill,
    Turn,
}

impl FromStr for Ornament {
    type Err = BrailleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "mordent" => Ok(Ornament::Mordent),
            "inverted-mordent" => Ok(Ornament::InvertedMordent),
            "trill" | "trill-mark" => Ok(Ornament::Trill),
            "turn" => Ok(Ornament::Turn),
            other => Err(BrailleError::invariant(format!(
                "unknown ornament '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Articulation {
    Accent,
    StrongAccent,
    BreathMark,
    Staccato,
    MezzoStaccato,
    Staccatissimo,
    Tenuto,
}

impl FromStr for Articulation {
    type Err = BrailleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "accent" => Ok(Articulation::Accent),
            "strong-accent" => Ok(Articulation::StrongAccent),
            "breath-mark" => Ok(Articulation::BreathMark),
            "staccato" => Ok(Articulation::Staccato),
            "mezzo-staccato" | "detached-legato" => Ok(Articulation::MezzoStaccato),
            "staccatissimo" => Ok(Articulation::Staccatissimo),
            "tenuto" => Ok(Articulation::Tenuto),
            other => Err(BrailleError::invariant(format!(
                "unknown articulation '{}'",
                other
            ))),
        }
    }
}

/// Index of a tuplet inside its part's [`TupletArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TupletId(pub usize);

/// N notes in the time of the enclosing value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tuplet {
    pub arity: u32,
    pub parent: Option<TupletId>,
}

/// Owns the tuplets of one part. A parent always lives at a smaller index
/// than its children, so parent chains are finite and acyclic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TupletArena {
    tuplets: Vec<Tuplet>,
}

impl TupletArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, arity: u32, parent: Option<TupletId>) -> Result<TupletId> {
        if arity < 2 {
            return Err(BrailleError::invariant(format!(
                "tuplet arity must be at least 2, got {}",
                arity
            )));
        }
        if let Some(TupletId(p)) = parent {
            if p >= self.tuplets.len() {
                return Err(BrailleError::malformed(format!(
                    "tuplet {} refers to parent {} which is not declared before it",
                    self.tuplets.len(),
                    p
                )));
            }
        }
        self.tuplets.push(Tuplet { arity, parent });
        Ok(TupletId(self.tuplets.len() - 1))
    }

    pub fn get(&self, id: TupletId) -> Option<&Tuplet> {
        self.tuplets.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.tuplets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuplets.is_empty()
    }

    /// The tuplet itself followed by its ancestors, innermost first.
    pub fn chain(&self, id: TupletId) -> Vec<&Tuplet> {
        let mut chain = Vec::new();
        let mut current = self.get(id);
        while let Some(tuplet) = current {
            chain.push(tuplet);
            current = tuplet.parent.and_then(|p| self.get(p));
        }
        chain
    }
}

/// Membership of a note in one slur
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlurMembership {
    pub id: u32,
    /// This note is the last note of the slur
    pub last: bool,
}

/// A note: pitched, unpitched (percussion) or without any pitch (rest-like)
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub pitch: Option<Pitch>,
    /// Display pitch of an unpitched instrument
    pub unpitched: Option<Pitch>,
    pub value: Value,
    pub accidental: Option<Accidental>,
    pub ornaments: Vec<Ornament>,
    pub articulations: Vec<Articulation>,
    pub tie_start: bool,
    pub slurs: Vec<SlurMembership>,
    pub fingering: Vec<u8>,
    pub grace: bool,
    /// Innermost enclosing tuplet
    pub tuplet: Option<TupletId>,
    /// How many tuplet levels begin on this note, counted from the innermost
    pub tuplet_starts: u8,
    pub staff: String,
    pub voice: String,
}

impl Note {
    pub fn new(pitch: Option<Pitch>, value: Value) -> Self {
        Self {
            pitch,
            unpitched: None,
            value,
            accidental: None,
            ornaments: Vec::new(),
            articulations: Vec::new(),
            tie_start: false,
            slurs: Vec::new(),
            fingering: Vec::new(),
            grace: false,
            tuplet: None,
            tuplet_starts: 0,
            staff: "1".to_string(),
            voice: "1".to_string(),
        }
    }

    pub fn pitched(pitch: Pitch, value: Value) -> Self {
        Self::new(Some(pitch), value)
    }

    pub fn on(mut self, staff: &str, voice: &str) -> Self {
        self.staff = staff.to_string();
        self.voice = voice.to_string();
        self
    }

    /// The pitch used for rendering: the real pitch, else the unpitched
    /// display position.
    pub fn sounding_pitch(&self) -> Option<Pitch> {
        self.pitch.or(self.unpitched)
    }

    /// A slur continues after this note
    pub fn continues_slur(&self) -> bool {
        self.slurs.iter().any(|slur| !slur.last)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rest {
    pub value: Value,
    pub staff: String,
    pub voice: String,
}

impl Rest {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            staff: "1".to_string(),
            voice: "1".to_string(),
        }
    }

    pub fn on(mut self, staff: &str, voice: &str) -> Self {
        self.staff = staff.to_string();
        self.voice = voice.to_string();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClefSign {
    G,
    F,
    C,
}

impl FromStr for ClefSign {
    type Err = BrailleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "G" => Ok(ClefSign::G),
            "F" => Ok(ClefSign::F),
            "C" => Ok(ClefSign::C),
            other => Err(BrailleError::invariant(format!("unknown clef sign '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clef {
    pub sign: ClefSign,
    pub line: u8,
}

impl Default for Clef {
    fn default() -> Self {
        Self {
            sign: ClefSign::G,
            line: 2,
        }
    }
}

impl Clef {
    pub fn new(sign: ClefSign, line: u8) -> Self {
        Self { sign, line }
    }

    pub fn is_treble(&self) -> bool {
        self.sign == ClefSign::G && self.line == 2
    }

    pub fn is_bass(&self) -> bool {
        self.sign == ClefSign::F && self.line == 4
    }

    /// Direction in which chord intervals are read: downwards (-1) for the
    /// treble clef and anything unusual, upwards (1) for the bass clef.
    pub fn chord_direction(&self) -> i8 {
        if self.is_bass() {
            1
        } else {
            -1
        }
    }
}

/// Number of sharps (positive) or flats (negative)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeySignature {
    pub fifths: i8,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Note(Note),
    Rest(Rest),
    StartBar { staves: usize },
    EndBar,
    ClefChange {
        offset: Offset,
        clef: Clef,
        staff: String,
    },
    KeyChange {
        offset: Offset,
        key: KeySignature,
        staff: Option<String>,
    },
}

impl Event {
    /// Applies to every staff of a segment at once
    pub fn is_vertical(&self) -> bool {
        match self {
            Event::StartBar { .. } | Event::EndBar => true,
            Event::KeyChange { staff, .. } => staff.is_none(),
            Event::Note(_) | Event::Rest(_) | Event::ClefChange { .. } => false,
        }
    }

    pub fn staff_name(&self) -> Option<&str> {
        match self {
            Event::Note(note) => Some(&note.staff),
            Event::Rest(rest) => Some(&rest.staff),
            Event::ClefChange { staff, .. } => Some(staff),
            Event::KeyChange { staff, .. } => staff.as_deref(),
            Event::StartBar { .. } | Event::EndBar => None,
        }
    }

    pub fn voice_name(&self) -> Option<&str> {
        match self {
            Event::Note(note) => Some(&note.voice),
            Event::Rest(rest) => Some(&rest.voice),
            _ => None,
        }
    }

    pub fn is_rest(&self) -> bool {
        match self {
            Event::Rest(_) => true,
            Event::Note(note) => note.sounding_pitch().is_none(),
            _ => false,
        }
    }

    pub fn pitch(&self) -> Option<Pitch> {
        match self {
            Event::Note(note) => note.pitch,
            _ => None,
        }
    }
}

/// One instrument's event timeline
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Part {
    pub name: String,
    pub events: Vec<Event>,
    pub tuplets: TupletArena,
}

impl Part {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Score {
    pub title: Option<String>,
    pub parts: Vec<Part>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midi_numbers() {
        assert_eq!(Pitch::natural(Step::C, 4).midi(), 60);
        assert_eq!(Pitch::natural(Step::A, 4).midi(), 69);
        assert_eq!(Pitch::new(Step::B, -1, 3).midi(), 58);
        assert_eq!(Pitch::natural(Step::C, 5).distance(&Pitch::natural(Step::C, 4)), 12);
    }

    #[test]
    fn test_unknown_kinds_are_invariant_violations() {
        let err = "schleifer".parse::<Ornament>().unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvariantViolation);
        assert!("spiccato".parse::<Articulation>().is_err());
        assert!("quarter-sharp".parse::<Accidental>().is_err());
        assert_eq!("strong-accent".parse::<Articulation>().unwrap(), Articulation::StrongAccent);
    }

    #[test]
    fn test_tuplet_arena_rejects_forward_parents() {
        let mut arena = TupletArena::new();
        let outer = arena.push(3, None).unwrap();
        let inner = arena.push(3, Some(outer)).unwrap();
        assert_eq!(arena.chain(inner).len(), 2);
        assert!(arena.push(5, Some(TupletId(7))).is_err());
        assert!(arena.push(1, None).is_err());
    }

    #[test]
    fn test_vertical_events() {
        assert!(Event::EndBar.is_vertical());
        assert!(Event::StartBar { staves: 2 }.is_vertical());
        let key = Event::KeyChange {
            offset: Offset::from_integer(0),
            key: KeySignature { fifths: 1 },
            staff: None,
        };
        assert!(key.is_vertical());
        assert!(!Event::Rest(Rest::new(Value::new(BaseValue::Half))).is_vertical());
    }

    #[test]
    fn test_clef_chord_direction() {
        assert_eq!(Clef::default().chord_direction(), -1);
        assert_eq!(Clef::new(ClefSign::F, 4).chord_direction(), 1);
        assert!(Clef::new(ClefSign::F, 4).is_bass());
    }
}
