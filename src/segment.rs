//! # Segmentation Module
//!
//! Splits a part's flat event timeline into the windows the transcriber
//! renders one at a time.
//!
//! ## Purpose
//! A part can change its number of staves (a piano part dropping to one
//! staff, an ossia appearing). Braille writes each staff as its own block of
//! lines, so the timeline is cut into segments of consecutive measures that
//! share a staff count, and each segment is split into one stream per staff.
//!
//! ## Rules
//!
//! ### Segments
//! - Events accumulate into the current segment up to and including an `EndBar`
//! - The event after an `EndBar` must be a `StartBar`
//! - A `StartBar` declaring a different staff count opens a new segment
//! - The last segment is kept even when it is incomplete or empty
//!
//! ### Staves
//! - Vertical events (bar lines, global key changes) go to every staff
//! - Any other event names its staff; the first unseen name binds to the next
//!   free staff slot, in order of appearance
//! - A segment must bind exactly as many names as it declares staves
//!
//! ### Measures and voices
//! - A staff stream is cut into measures at every `EndBar`
//! - Within a measure, events are grouped by voice name in order of first
//!   appearance
//!
//! ## Example
//! ```rust
//! use brlmusic::model::{BaseValue, Event, Rest, Value};
//! use brlmusic::segment::segments;
//!
//! let rest = Event::Rest(Rest::new(Value::new(BaseValue::Whole)));
//! let events = vec![
//!     Event::StartBar { staves: 1 },
//!     rest.clone(),
//!     Event::EndBar,
//!     Event::StartBar { staves: 1 },
//!     rest,
//!     Event::EndBar,
//! ];
//! let segments = segments(&events)?;
//! assert_eq!(segments.len(), 1);
//! assert_eq!(segments[0].staff_count(), 1);
//! # Ok::<(), brlmusic::BrailleError>(())
//! ```
//!
//! ## Related Modules
//! - `model` - the `Event` timeline being segmented
//! - `transcriber` - walks segments, staves, measures and voices

use std::collections::HashMap;

use crate::error::{BrailleError, Result};
use crate::model::{Clef, Event, KeySignature, Offset};

/// Maximal run of measures sharing one declared staff count
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Segment {
    events: Vec<Event>,
}

impl Segment {
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Staff count of the first `StartBar`, 0 when there is none
    pub fn staff_count(&self) -> usize {
        self.events
            .iter()
            .find_map(|event| match event {
                Event::StartBar { staves } => Some(*staves),
                _ => None,
            })
            .unwrap_or(0)
    }

    /// Split the segment into exactly `staff_count()` staff streams. A
    /// segment without a start bar has no staves and renders nothing.
    pub fn staves(&self) -> Result<Vec<Staff>> {
        let count = self.staff_count();
        if count == 0 {
            return Ok(Vec::new());
        }
        let mut staves: Vec<Staff> = (0..count).map(|_| Staff::default()).collect();
        let mut slots: HashMap<&str, usize> = HashMap::new();

        for event in &self.events {
            if event.is_vertical() {
                for staff in staves.iter_mut() {
                    staff.push(event.clone());
                }
                continue;
            }
            let Some(name) = event.staff_name() else {
                continue;
            };
            let next_slot = slots.len();
            let slot = *slots.entry(name).or_insert(next_slot);
            let staff = staves.get_mut(slot).ok_or_else(|| {
                BrailleError::malformed(format!(
                    "staff '{}' does not fit into a segment of {} staves",
                    name, count
                ))
            })?;
            if staff.name.is_none() {
                staff.name = Some(name.to_string());
            }
            staff.push(event.clone());
        }

        if slots.len() < count {
            return Err(BrailleError::malformed(format!(
                "segment declares {} staves but names only {}",
                count,
                slots.len()
            )));
        }
        Ok(staves)
    }

    pub fn staff(&self, index: usize) -> Result<Staff> {
        let count = self.staff_count();
        self.staves()?.into_iter().nth(index).ok_or_else(|| {
            BrailleError::malformed(format!(
                "staff {} requested from a segment of {} staves",
                index, count
            ))
        })
    }
}

/// Cut a part's timeline into segments.
pub fn segments(events: &[Event]) -> Result<Vec<Segment>> {
    let mut segments = vec![Segment::default()];
    let mut index = 0;

    loop {
        while let Some(event) = events.get(index) {
            index += 1;
            if let Some(current) = segments.last_mut() {
                current.events.push(event.clone());
            }
            if matches!(event, Event::EndBar) {
                break;
            }
        }

        let Some(next) = events.get(index) else {
            return Ok(segments);
        };
        let Event::StartBar { staves } = next else {
            return Err(BrailleError::malformed(format!(
                "expected a start bar after the end bar at event {}",
                index - 1
            )));
        };
        let current_count = segments.last().map_or(0, Segment::staff_count);
        if *staves != current_count {
            segments.push(Segment::default());
        }
    }
}

/// The events of one staff within a segment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Staff {
    name: Option<String>,
    events: Vec<Event>,
    clefs: Vec<(Offset, Clef)>,
    keys: Vec<(Offset, KeySignature)>,
}

impl Staff {
    fn push(&mut self, event: Event) {
        match &event {
            Event::ClefChange { offset, clef, .. } => self.clefs.push((*offset, *clef)),
            Event::KeyChange { offset, key, .. } => self.keys.push((*offset, *key)),
            _ => {}
        }
        self.events.push(event);
    }

    /// Staff name bound to this slot; `None` if only vertical events landed here
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Clef in effect at `offset`, treble before the first change
    pub fn clef_at(&self, offset: Offset) -> Clef {
        latest_at(&self.clefs, offset).unwrap_or_default()
    }

    /// Key in effect at `offset`, no accidentals before the first change
    pub fn key_at(&self, offset: Offset) -> KeySignature {
        latest_at(&self.keys, offset).unwrap_or_default()
    }

    pub fn chord_direction(&self, offset: Offset) -> i8 {
        self.clef_at(offset).chord_direction()
    }

    /// The staff's events cut at every end bar. Events after the last end
    /// bar form no measure.
    pub fn measures(&self) -> Vec<Measure> {
        let mut measures = Vec::new();
        let mut current = Measure::default();
        for event in &self.events {
            if matches!(event, Event::EndBar) {
                measures.push(std::mem::take(&mut current));
            } else {
                current.push(event.clone());
            }
        }
        measures
    }
}

fn latest_at<T: Copy>(changes: &[(Offset, T)], offset: Offset) -> Option<T> {
    changes
        .iter()
        .filter(|(at, _)| *at <= offset)
        .last()
        .map(|(_, value)| *value)
}

/// Events of one staff between two bar lines
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Measure {
    events: Vec<Event>,
}

impl Measure {
    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Notes and rests grouped by voice name, in order of first appearance
    pub fn voices(&self) -> Vec<Voice> {
        let mut voices: Vec<Voice> = Vec::new();
        for event in &self.events {
            let Some(name) = event.voice_name() else {
                continue;
            };
            match voices.iter_mut().find(|voice| voice.name == name) {
                Some(voice) => voice.events.push(event.clone()),
                None => voices.push(Voice {
                    name: name.to_string(),
                    events: vec![event.clone()],
                }),
            }
        }
        voices
    }

    pub fn in_accord(&self) -> InAccord {
        InAccord {
            voices: self.voices(),
        }
    }
}

/// Named sequence of notes and rests within one measure
#[derive(Debug, Clone, PartialEq)]
pub struct Voice {
    name: String,
    events: Vec<Event>,
}

impl Voice {
    pub fn new(name: &str, events: Vec<Event>) -> Self {
        Self {
            name: name.to_string(),
            events,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Length of the common prefix with `other`
    pub fn count_equals_at_beginning(&self, other: &Voice) -> usize {
        self.events
            .iter()
            .zip(&other.events)
            .take_while(|(a, b)| a == b)
            .count()
    }

    /// Length of the common suffix with `other`. Suffix matching is not
    /// implemented; this always returns 0.
    pub fn count_equals_at_end(&self, _other: &Voice) -> usize {
        0
    }

    /// True when no event of the voice sounds
    pub fn rests_only(&self) -> bool {
        self.events.iter().all(Event::is_rest)
    }

    /// Rounded mean MIDI number of the pitched notes, 0 without any
    pub fn average_pitch(&self) -> i32 {
        let pitches: Vec<i32> = self
            .events
            .iter()
            .filter_map(Event::pitch)
            .map(|pitch| pitch.midi())
            .collect();
        if pitches.is_empty() {
            return 0;
        }
        let sum: i32 = pitches.iter().sum();
        (sum as f64 / pitches.len() as f64).round() as i32
    }

    /// Exchange names with `other`, relabelling the events of both voices.
    pub fn swap_names(&mut self, other: &mut Voice) {
        std::mem::swap(&mut self.name, &mut other.name);
        relabel(&mut self.events, &self.name);
        relabel(&mut other.events, &other.name);
    }
}

fn relabel(events: &mut [Event], name: &str) {
    for event in events {
        match event {
            Event::Note(note) => note.voice = name.to_string(),
            Event::Rest(rest) => rest.voice = name.to_string(),
            _ => {}
        }
    }
}

/// The voices sharing one measure. More than one voice means they are
/// written in accord, separated by the full measure in-accord sign.
#[derive(Debug, Clone, PartialEq)]
pub struct InAccord {
    voices: Vec<Voice>,
}

impl InAccord {
    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn is_in_accord(&self) -> bool {
        self.voices.len() > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BaseValue, ClefSign, Note, Pitch, Rest, Step, Value};

    fn quarter(step: Step, staff: &str, voice: &str) -> Event {
        Event::Note(
            Note::pitched(Pitch::natural(step, 4), Value::new(BaseValue::Quarter)).on(staff, voice),
        )
    }

    fn measure(staves: usize, body: Vec<Event>) -> Vec<Event> {
        let mut events = vec![Event::StartBar { staves }];
        events.extend(body);
        events.push(Event::EndBar);
        events
    }

    #[test]
    fn test_segments_split_on_staff_count_change() {
        let mut events = Vec::new();
        events.extend(measure(2, vec![quarter(Step::C, "1", "1"), quarter(Step::C, "2", "2")]));
        events.extend(measure(2, vec![quarter(Step::D, "1", "1"), quarter(Step::D, "2", "2")]));
        events.extend(measure(3, vec![quarter(Step::E, "1", "1")]));

        let segments = segments(&events).unwrap();
        let counts: Vec<usize> = segments.iter().map(Segment::staff_count).collect();
        assert_eq!(counts, vec![2, 3]);

        let end_bars = segments[0]
            .events()
            .iter()
            .filter(|e| matches!(e, Event::EndBar))
            .count();
        assert_eq!(end_bars, 2, "both 2-staff measures stay in the first segment");
        assert_eq!(segments[1].events()[1], quarter(Step::E, "1", "1"));
    }

    #[test]
    fn test_missing_start_bar_is_malformed() {
        let events = vec![
            Event::StartBar { staves: 1 },
            Event::EndBar,
            quarter(Step::C, "1", "1"),
        ];
        let err = segments(&events).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::MalformedTimeline);
    }

    #[test]
    fn test_trailing_partial_segment_is_kept() {
        let mut events = measure(1, vec![quarter(Step::C, "1", "1")]);
        events.push(Event::StartBar { staves: 2 });
        events.push(quarter(Step::D, "1", "1"));

        let segments = segments(&events).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].staff_count(), 2);
        assert_eq!(segments[1].events().len(), 2);
    }

    #[test]
    fn test_empty_timeline_yields_one_empty_segment() {
        let segments = segments(&[]).unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].staff_count(), 0);
    }

    #[test]
    fn test_segment_without_start_bar_has_no_staves() {
        let mut events = vec![quarter(Step::C, "1", "1"), Event::EndBar];
        events.extend(measure(1, vec![quarter(Step::D, "1", "1")]));

        let segments = segments(&events).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].staff_count(), 0);
        assert!(segments[0].staves().unwrap().is_empty());
        assert_eq!(segments[1].staves().unwrap().len(), 1);
    }

    #[test]
    fn test_staves_bind_names_greedily() {
        let events = measure(
            2,
            vec![
                quarter(Step::C, "lower", "2"),
                quarter(Step::E, "upper", "1"),
                quarter(Step::D, "lower", "2"),
            ],
        );
        let segment = &segments(&events).unwrap()[0];
        let staves = segment.staves().unwrap();
        assert_eq!(staves.len(), 2);
        assert_eq!(staves[0].name(), Some("lower"));
        assert_eq!(staves[1].name(), Some("upper"));
        // start bar, two notes, end bar
        assert_eq!(staves[0].events().len(), 4);
        assert_eq!(staves[1].events().len(), 3);
        assert_eq!(segment.staff(1).unwrap(), staves[1]);
    }

    #[test]
    fn test_staff_name_mismatch_is_malformed() {
        let too_many = measure(1, vec![quarter(Step::C, "1", "1"), quarter(Step::C, "2", "1")]);
        let err = segments(&too_many).unwrap()[0].staves().unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::MalformedTimeline);

        let too_few = measure(2, vec![quarter(Step::C, "1", "1")]);
        let err = segments(&too_few).unwrap()[0].staff(0).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::MalformedTimeline);
    }

    #[test]
    fn test_clef_and_key_timelines() {
        let events = measure(
            1,
            vec![
                quarter(Step::C, "1", "1"),
                Event::ClefChange {
                    offset: Offset::new(1, 2),
                    clef: Clef::new(ClefSign::F, 4),
                    staff: "1".to_string(),
                },
                Event::KeyChange {
                    offset: Offset::new(1, 4),
                    key: KeySignature { fifths: -3 },
                    staff: None,
                },
            ],
        );
        let staff = segments(&events).unwrap()[0].staff(0).unwrap();
        assert!(staff.clef_at(Offset::new(0, 1)).is_treble());
        assert!(staff.clef_at(Offset::new(1, 2)).is_bass());
        assert_eq!(staff.chord_direction(Offset::new(3, 4)), 1);
        assert_eq!(staff.key_at(Offset::new(0, 1)).fifths, 0);
        assert_eq!(staff.key_at(Offset::new(1, 2)).fifths, -3);
    }

    #[test]
    fn test_measures_and_voices() {
        let mut events = measure(
            1,
            vec![
                quarter(Step::C, "1", "1"),
                quarter(Step::E, "1", "2"),
                quarter(Step::D, "1", "1"),
            ],
        );
        events.extend(measure(1, vec![quarter(Step::G, "1", "1")]));
        let staff = segments(&events).unwrap()[0].staff(0).unwrap();
        let measures = staff.measures();
        assert_eq!(measures.len(), 2);

        let voices = measures[0].voices();
        let names: Vec<&str> = voices.iter().map(Voice::name).collect();
        assert_eq!(names, vec!["1", "2"]);
        assert_eq!(voices[0].events().len(), 2);
        assert!(measures[0].in_accord().is_in_accord());
        assert!(!measures[1].in_accord().is_in_accord());
    }

    #[test]
    fn test_voice_analysis() {
        let upper = Voice::new("1", vec![quarter(Step::C, "1", "1"), quarter(Step::E, "1", "1")]);
        let lower = Voice::new("2", vec![quarter(Step::C, "1", "2"), quarter(Step::G, "1", "2")]);
        // voice names differ, so the events differ
        assert_eq!(upper.count_equals_at_beginning(&lower), 0);
        assert_eq!(upper.count_equals_at_beginning(&upper.clone()), 2);
        assert_eq!(upper.count_equals_at_end(&upper.clone()), 0);
        assert_eq!(upper.average_pitch(), 62);
        assert!(!upper.rests_only());

        let rests = Voice::new(
            "3",
            vec![Event::Rest(Rest::new(Value::new(BaseValue::Half)).on("1", "3"))],
        );
        assert!(rests.rests_only());
        assert_eq!(rests.average_pitch(), 0);
    }

    #[test]
    fn test_swap_names_relabels_events() {
        let mut first = Voice::new("1", vec![quarter(Step::C, "1", "1")]);
        let mut second = Voice::new("2", vec![quarter(Step::D, "1", "2")]);
        first.swap_names(&mut second);
        assert_eq!(first.name(), "2");
        assert_eq!(first.events()[0].voice_name(), Some("2"));
        assert_eq!(second.name(), "1");
        assert_eq!(second.events()[0].voice_name(), Some("1"));
    }
}
