//! # Timeline Loader
//!
//! Reads a fully resolved event timeline from YAML into the [`Score`] model.
//! Every event is a mapping with a `type` key; names of kinds (values,
//! accidentals, ornaments, articulations, clef signs) are plain strings.
//!
//! ## Example
//! ```rust
//! use brlmusic::timeline::load;
//!
//! let score = load(r#"
//! parts:
//!   - name: Flute
//!     events:
//!       - { type: start-bar, staves: 1 }
//!       - { type: note, step: C, octave: 4, value: quarter }
//!       - { type: rest, value: half, dots: 1 }
//!       - { type: end-bar }
//! "#)?;
//! assert_eq!(score.parts[0].events.len(), 4);
//! # Ok::<(), brlmusic::BrailleError>(())
//! ```
//!
//! ## Errors
//! - YAML syntax and shape problems → `TimelineError`
//! - unknown names of a closed kind → `InvariantViolation`
//! - tuplets whose parent is not declared before them, notes referring to
//!   undeclared tuplets → `MalformedTimeline`

use serde::Deserialize;

use crate::error::{BrailleError, Position, Result};
use crate::model::{
    Accidental, Articulation, BaseValue, Clef, ClefSign, Event, KeySignature, Note, Offset,
    Ornament, Part, Pitch, Rest, Score, SlurMembership, Step, TupletArena, TupletId, Value,
};

const DEFAULT_STAFF: &str = "1";
const DEFAULT_VOICE: &str = "1";

#[derive(Deserialize, Debug)]
#[serde(rename_all = "kebab-case")]
struct RawScore {
    title: Option<String>,
    #[serde(default)]
    parts: Vec<RawPart>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "kebab-case")]
struct RawPart {
    #[serde(default)]
    name: String,
    #[serde(default)]
    tuplets: Vec<RawTuplet>,
    #[serde(default)]
    events: Vec<RawEvent>,
}

#[derive(Deserialize, Debug)]
struct RawTuplet {
    arity: u32,
    parent: Option<usize>,
}

/// Staff and voice names may be written as strings or numbers.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
enum RawName {
    Text(String),
    Number(i64),
}

impl RawName {
    fn into_name(name: Option<RawName>, default: &str) -> String {
        match name {
            Some(RawName::Text(text)) => text,
            Some(RawName::Number(number)) => number.to_string(),
            None => default.to_string(),
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum RawEvent {
    StartBar {
        staves: usize,
    },
    EndBar,
    Note(RawNote),
    Rest {
        value: String,
        #[serde(default)]
        dots: u8,
        staff: Option<RawName>,
        voice: Option<RawName>,
    },
    ClefChange {
        offset: Option<Offset>,
        sign: String,
        line: u8,
        staff: Option<RawName>,
    },
    KeyChange {
        offset: Option<Offset>,
        fifths: i8,
        staff: Option<RawName>,
    },
}

#[derive(Deserialize, Debug)]
struct RawPitch {
    step: String,
    #[serde(default)]
    alter: i8,
    octave: i8,
}

#[derive(Deserialize, Debug)]
struct RawSlur {
    id: u32,
    #[serde(default)]
    last: bool,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "kebab-case")]
struct RawNote {
    step: Option<String>,
    alter: Option<i8>,
    octave: Option<i8>,
    unpitched: Option<RawPitch>,
    value: String,
    #[serde(default)]
    dots: u8,
    accidental: Option<String>,
    #[serde(default)]
    ornaments: Vec<String>,
    #[serde(default)]
    articulations: Vec<String>,
    #[serde(default)]
    fingering: Vec<u8>,
    #[serde(default)]
    tie_start: bool,
    #[serde(default)]
    slurs: Vec<RawSlur>,
    #[serde(default)]
    grace: bool,
    tuplet: Option<usize>,
    #[serde(default)]
    tuplet_starts: u8,
    staff: Option<RawName>,
    voice: Option<RawName>,
}

/// Load a score from a YAML timeline document.
pub fn load(source: &str) -> Result<Score> {
    let raw: RawScore =
        serde_yaml::from_str(source).map_err(|e| BrailleError::TimelineError(e.to_string()))?;

    let parts = raw
        .parts
        .into_iter()
        .enumerate()
        .map(|(index, part)| convert_part(part).map_err(|e| e.at(Position::part(index))))
        .collect::<Result<Vec<_>>>()?;

    Ok(Score {
        title: raw.title,
        parts,
    })
}

fn convert_part(raw: RawPart) -> Result<Part> {
    let mut tuplets = TupletArena::new();
    for tuplet in &raw.tuplets {
        tuplets.push(tuplet.arity, tuplet.parent.map(TupletId))?;
    }

    let mut events = Vec::with_capacity(raw.events.len());
    let mut measure = 0;
    for event in raw.events {
        let is_end_bar = matches!(event, RawEvent::EndBar);
        let event = convert_event(event, &tuplets)
            .map_err(|e| e.at(Position::default().with_measure(measure)))?;
        events.push(event);
        if is_end_bar {
            measure += 1;
        }
    }

    Ok(Part {
        name: raw.name,
        events,
        tuplets,
    })
}

fn convert_event(raw: RawEvent, tuplets: &TupletArena) -> Result<Event> {
    let event = match raw {
        RawEvent::StartBar { staves } => Event::StartBar { staves },
        RawEvent::EndBar => Event::EndBar,
        RawEvent::Note(note) => Event::Note(convert_note(note, tuplets)?),
        RawEvent::Rest {
            value,
            dots,
            staff,
            voice,
        } => Event::Rest(Rest {
            value: Value::dotted(value.parse::<BaseValue>()?, dots),
            staff: RawName::into_name(staff, DEFAULT_STAFF),
            voice: RawName::into_name(voice, DEFAULT_VOICE),
        }),
        RawEvent::ClefChange {
            offset,
            sign,
            line,
            staff,
        } => Event::ClefChange {
            offset: offset.unwrap_or_else(|| Offset::from_integer(0)),
            clef: Clef::new(sign.parse::<ClefSign>()?, line),
            staff: RawName::into_name(staff, DEFAULT_STAFF),
        },
        RawEvent::KeyChange {
            offset,
            fifths,
            staff,
        } => Event::KeyChange {
            offset: offset.unwrap_or_else(|| Offset::from_integer(0)),
            key: KeySignature { fifths },
            staff: staff.map(|name| RawName::into_name(Some(name), DEFAULT_STAFF)),
        },
    };
    Ok(event)
}

fn convert_pitch(
    step: Option<String>,
    alter: Option<i8>,
    octave: Option<i8>,
) -> Result<Option<Pitch>> {
    match (step, octave) {
        (Some(step), Some(octave)) => Ok(Some(Pitch::new(
            step.parse::<Step>()?,
            alter.unwrap_or(0),
            octave,
        ))),
        (None, None) if alter.is_none() => Ok(None),
        _ => Err(BrailleError::TimelineError(
            "a note pitch needs both step and octave".to_string(),
        )),
    }
}

fn convert_note(raw: RawNote, tuplets: &TupletArena) -> Result<Note> {
    let pitch = convert_pitch(raw.step, raw.alter, raw.octave)?;
    let unpitched = match raw.unpitched {
        Some(p) => Some(Pitch::new(p.step.parse::<Step>()?, p.alter, p.octave)),
        None => None,
    };

    let tuplet = raw.tuplet.map(TupletId);
    if let Some(id) = tuplet {
        if tuplets.get(id).is_none() {
            return Err(BrailleError::malformed(format!(
                "note refers to undeclared tuplet {}",
                id.0
            )));
        }
    }

    Ok(Note {
        pitch,
        unpitched,
        value: Value::dotted(raw.value.parse::<BaseValue>()?, raw.dots),
        accidental: raw
            .accidental
            .as_deref()
            .map(str::parse::<Accidental>)
            .transpose()?,
        ornaments: raw
            .ornaments
            .iter()
            .map(|name| name.parse::<Ornament>())
            .collect::<Result<Vec<_>>>()?,
        articulations: raw
            .articulations
            .iter()
            .map(|name| name.parse::<Articulation>())
            .collect::<Result<Vec<_>>>()?,
        tie_start: raw.tie_start,
        slurs: raw
            .slurs
            .iter()
            .map(|slur| SlurMembership {
                id: slur.id,
                last: slur.last,
            })
            .collect(),
        fingering: raw.fingering,
        grace: raw.grace,
        tuplet,
        tuplet_starts: raw.tuplet_starts,
        staff: RawName::into_name(raw.staff, DEFAULT_STAFF),
        voice: RawName::into_name(raw.voice, DEFAULT_VOICE),
    })
}
