//! # Transcriber
//!
//! Drives one transcription run over a [`Score`]:
//!
//! ```text
//! Part ──▶ segments ──▶ staves ──▶ measures ──▶ voices ──▶ BrailleNote
//!                                                              │
//!                        PageWriter ◀── fragments + dot 3 pass ◀┘
//! ```
//!
//! ## Layout
//! - Each part starts on a new line with its name on a line of its own
//! - Each staff of a segment starts a new line, indented to column 2
//! - Voices of a measure are joined by the in-accord sign; every measure is
//!   followed by a space
//! - A voice that does not fit on the current line starts the next one
//!
//! ## Run state
//! The page writer, the occurrence counter and the last pitch of each voice
//! belong to the run. [`Transcriber::transcribe`] resets the first two, and
//! last pitches are forgotten at the start of every staff block.
//!
//! ## Related Modules
//! - `segment` - cuts the timeline into segments, staves, measures and voices
//! - `braille::note` - transcodes a note or rest
//! - `page` - line and page layout

use std::collections::HashMap;

use crate::braille::list::{join_fragments, Fragment};
use crate::braille::note::BrailleNote;
use crate::braille::repeat::{runs, OccurrenceCounter, Repeatable};
use crate::braille::sign::{PartIndicator, Sign};
use crate::braille::tuplet::tuplet_sign;
use crate::braille::Braille;
use crate::error::{BrailleError, ErrorKind, Position, Result};
use crate::model::{Event, Note, Part, Pitch, Score};
use crate::options::{Options, UnsupportedPolicy};
use crate::page::PageWriter;
use crate::segment::{segments, Measure, Segment, Voice};

/// Column every staff block starts at
const STAFF_INDENT: usize = 2;

/// One rendered element of a voice
#[derive(Debug, Clone, PartialEq)]
enum VoiceItem {
    Tuplet(Sign),
    Note(BrailleNote),
}

impl Repeatable for VoiceItem {
    fn atom(&self) -> String {
        match self {
            VoiceItem::Tuplet(sign) => sign.atom(),
            VoiceItem::Note(note) => note.atom(),
        }
    }
}

/// Context of one transcription run
#[derive(Debug, Clone)]
pub struct Transcriber {
    options: Options,
    writer: PageWriter,
    occurrences: OccurrenceCounter<BrailleNote>,
}

impl Transcriber {
    pub fn new(options: Options) -> Self {
        let writer = PageWriter::new(options.page_width, options.page_height);
        Self {
            options,
            writer,
            occurrences: OccurrenceCounter::new(),
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Transcribe a whole score, starting from an empty first page. A failed
    /// run leaves no text and no counts behind.
    pub fn transcribe(&mut self, score: &Score) -> Result<String> {
        self.writer.reset();
        self.occurrences.clear();

        for (index, part) in score.parts.iter().enumerate() {
            if let Err(e) = self.transcribe_part(part) {
                self.writer.reset();
                self.occurrences.clear();
                return Err(e.at(Position::part(index)));
            }
        }

        log::info!(
            "transcribed {} part(s), {} note(s), ending on page {}",
            score.parts.len(),
            self.occurrences.total(),
            self.writer.page_number()
        );
        Ok(self.writer.as_str().to_string())
    }

    /// Every note and rest of the last run, counted by braille equality
    pub fn occurrences(&self) -> &OccurrenceCounter<BrailleNote> {
        &self.occurrences
    }

    /// Text written so far
    pub fn text(&self) -> &str {
        self.writer.as_str()
    }

    fn transcribe_part(&mut self, part: &Part) -> Result<()> {
        if self.writer.character_count() > 0 {
            self.writer.new_line();
        }
        self.writer.print_line(&part.name);
        for (index, segment) in segments(&part.events)?.iter().enumerate() {
            self.transcribe_segment(part, segment)
                .map_err(|e| e.at(Position::default().with_segment(index)))?;
        }
        Ok(())
    }

    fn transcribe_segment(&mut self, part: &Part, segment: &Segment) -> Result<()> {
        let staves = segment.staves()?;
        log::debug!(
            "part '{}': segment with {} staves",
            part.name,
            staves.len()
        );
        let hands = staves.len() == 2 && self.options.part_indicators;

        for (staff_index, staff) in staves.iter().enumerate() {
            log::debug!("staff {} ({:?})", staff_index + 1, staff.name());
            if self.writer.character_count() > 0 {
                self.writer.new_line();
            }
            self.writer.indent_to(STAFF_INDENT);

            let mut indicator = match (hands, staff_index) {
                (true, 0) => Some(PartIndicator::RightHand),
                (true, _) => Some(PartIndicator::LeftHand),
                (false, _) => None,
            };
            let mut last_pitches: HashMap<String, Pitch> = HashMap::new();

            for (measure_index, measure) in staff.measures().iter().enumerate() {
                self.transcribe_measure(part, measure, &mut indicator, &mut last_pitches)
                    .map_err(|e| e.at(Position::default().with_measure(measure_index)))?;
            }
        }
        Ok(())
    }

    fn transcribe_measure(
        &mut self,
        part: &Part,
        measure: &Measure,
        indicator: &mut Option<PartIndicator>,
        last_pitches: &mut HashMap<String, Pitch>,
    ) -> Result<()> {
        let in_accord = measure.in_accord();
        let voices = in_accord.voices();

        for (voice_index, voice) in voices.iter().enumerate() {
            let mut fragments = Vec::new();
            if let Some(indicator) = indicator.take() {
                fragments.push(Fragment::from(&Sign::part_indicator(indicator)));
            }
            let items = self.voice_items(part, voice, last_pitches)?;
            fragments.extend(self.render_items(&items));

            let braille = join_fragments(fragments);
            log::trace!("voice '{}': {}", voice.name(), braille);

            if self.writer.character_count() > 0 && !self.writer.fits(&braille) {
                self.writer.new_line();
            }
            self.writer.print_string(&braille);
            if voice_index + 1 < voices.len() {
                self.writer
                    .print_string(&Braille::FullMeasureInAccord.to_string());
            }
        }
        self.writer.print_string(" ");
        Ok(())
    }

    fn voice_items(
        &mut self,
        part: &Part,
        voice: &Voice,
        last_pitches: &mut HashMap<String, Pitch>,
    ) -> Result<Vec<VoiceItem>> {
        let mut items = Vec::new();
        for event in voice.events() {
            let braille_note = match event {
                Event::Note(note) => {
                    for sign in self.tuplet_signs(part, note)? {
                        items.push(VoiceItem::Tuplet(sign));
                    }
                    let last_pitch = last_pitches.get(voice.name());
                    let braille_note = self.transcode_note(note, last_pitch)?;
                    if let Some(pitch) = note.sounding_pitch() {
                        last_pitches.insert(voice.name().to_string(), pitch);
                    }
                    braille_note
                }
                Event::Rest(rest) => BrailleNote::rest(rest),
                _ => continue,
            };
            self.occurrences.add(&braille_note);
            items.push(VoiceItem::Note(braille_note));
        }
        Ok(items)
    }

    fn transcode_note(&self, note: &Note, last_pitch: Option<&Pitch>) -> Result<BrailleNote> {
        let mut show_fingering = self.options.show_fingering;
        if show_fingering {
            if let Err(e) = Sign::fingering(&note.fingering) {
                if !self.omits(&e) {
                    return Err(e);
                }
                log::warn!("omitting fingering: {}", e);
                show_fingering = false;
            }
        }
        BrailleNote::new(note, last_pitch, show_fingering)
    }

    /// Signs of the tuplets starting on `note`, outermost first
    fn tuplet_signs(&self, part: &Part, note: &Note) -> Result<Vec<Sign>> {
        if note.tuplet_starts == 0 {
            return Ok(Vec::new());
        }
        let id = note.tuplet.ok_or_else(|| {
            BrailleError::malformed(format!(
                "note starts {} tuplet(s) but belongs to none",
                note.tuplet_starts
            ))
        })?;
        let chain = part.tuplets.chain(id);
        let starts = note.tuplet_starts as usize;
        if starts > chain.len() {
            return Err(BrailleError::malformed(format!(
                "note starts {} tuplet(s) but is nested in only {}",
                starts,
                chain.len()
            )));
        }

        let mut signs = Vec::with_capacity(starts);
        for tuplet in chain[..starts].iter().rev() {
            match tuplet_sign(tuplet) {
                Ok(sign) => signs.push(sign),
                Err(e) if self.omits(&e) => log::warn!("omitting tuplet sign: {}", e),
                Err(e) => return Err(e),
            }
        }
        Ok(signs)
    }

    fn omits(&self, error: &BrailleError) -> bool {
        error.kind() == ErrorKind::UnsupportedNotation
            && self.options.unsupported == UnsupportedPolicy::Omit
    }

    fn render_items(&self, items: &[VoiceItem]) -> Vec<Fragment> {
        if self.options.compress_repeats {
            runs(items)
                .into_iter()
                .map(|(item, count)| Fragment::new(item.repeated(count)))
                .collect()
        } else {
            items.iter().map(|item| Fragment::new(item.atom())).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::braille::glyph::braille;
    use crate::model::{BaseValue, Rest, Step, TupletId, Value};

    fn quarter(step: Step, octave: i8) -> Event {
        Event::Note(Note::pitched(
            Pitch::natural(step, octave),
            Value::new(BaseValue::Quarter),
        ))
    }

    fn one_measure(name: &str, body: Vec<Event>) -> Part {
        let mut part = Part::new(name);
        part.events.push(Event::StartBar { staves: 1 });
        part.events.extend(body);
        part.events.push(Event::EndBar);
        part
    }

    fn score(parts: Vec<Part>) -> Score {
        Score { title: None, parts }
    }

    #[test]
    fn test_single_voice_line() {
        let part = one_measure(
            "Flute",
            vec![
                Event::Rest(Rest::new(Value::new(BaseValue::Quarter))),
                quarter(Step::C, 4),
                quarter(Step::C, 5),
                quarter(Step::A, 4),
            ],
        );
        let text = Transcriber::new(Options::default())
            .transcribe(&score(vec![part]))
            .unwrap();
        let expected = format!("Flute\n  {} ", braille(&[1236, 5, 1456, 46, 1456, 246]));
        assert_eq!(text, expected);
    }

    #[test]
    fn test_voices_joined_in_accord() {
        let upper = Note::pitched(Pitch::natural(Step::E, 4), Value::new(BaseValue::Half));
        let lower = Note::pitched(Pitch::natural(Step::C, 4), Value::new(BaseValue::Half)).on("1", "2");
        let part = one_measure("Organ", vec![Event::Note(upper), Event::Note(lower)]);
        let text = Transcriber::new(Options::default())
            .transcribe(&score(vec![part]))
            .unwrap();
        let expected = format!("Organ\n  {} ", braille(&[5, 1234, 126, 345, 5, 1345]));
        assert_eq!(text, expected);
    }

    #[test]
    fn test_last_pitch_is_tracked_per_voice() {
        let events = vec![
            quarter(Step::C, 4),
            Event::Note(
                Note::pitched(Pitch::natural(Step::C, 2), Value::new(BaseValue::Quarter)).on("1", "2"),
            ),
            quarter(Step::D, 4),
        ];
        let part = one_measure("Piano", events);
        let text = Transcriber::new(Options::default())
            .transcribe(&score(vec![part]))
            .unwrap();
        // D4 follows C4 in voice 1 and needs no octave sign
        let expected = format!(
            "Piano\n  {} ",
            braille(&[5, 1456, 156, 126, 345, 45, 1456])
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn test_hand_indicators_on_two_staves() {
        let mut part = Part::new("Piano");
        part.events = vec![
            Event::StartBar { staves: 2 },
            quarter(Step::E, 4),
            Event::Rest(Rest::new(Value::new(BaseValue::Quarter)).on("2", "2")),
            Event::EndBar,
        ];
        let text = Transcriber::new(Options::default())
            .transcribe(&score(vec![part.clone()]))
            .unwrap();
        let right = braille(&[46, 345, 5, 1246]);
        let left = braille(&[456, 345, 3, 1236]);
        assert_eq!(text, format!("Piano\n  {} \n  {} ", right, left));

        let options = Options {
            part_indicators: false,
            ..Options::default()
        };
        let plain = Transcriber::new(options)
            .transcribe(&score(vec![part]))
            .unwrap();
        assert_eq!(
            plain,
            format!("Piano\n  {} \n  {} ", braille(&[5, 1246]), braille(&[1236]))
        );
    }

    #[test]
    fn test_long_voice_wraps() {
        let options = Options {
            page_width: 8,
            ..Options::default()
        };
        let body = vec![quarter(Step::C, 4), quarter(Step::D, 4), quarter(Step::E, 4)];
        let mut part = one_measure("P", body.clone());
        part.events.push(Event::StartBar { staves: 1 });
        part.events.extend(body);
        part.events.push(Event::EndBar);

        let text = Transcriber::new(options)
            .transcribe(&score(vec![part]))
            .unwrap();
        let first = braille(&[5, 1456, 156, 1246]);
        let second = braille(&[1456, 156, 1246]);
        // "  " + 4 cells + " " leaves 1 column for 3 more cells
        assert_eq!(text, format!("P\n  {} \n{} ", first, second));
    }

    #[test]
    fn test_nested_tuplet_signs_outermost_first() {
        let mut part = Part::new("Violin");
        let outer = part.tuplets.push(3, None).unwrap();
        let inner = part.tuplets.push(3, Some(outer)).unwrap();
        let mut note = Note::pitched(Pitch::natural(Step::G, 4), Value::new(BaseValue::Eighth));
        note.tuplet = Some(inner);
        note.tuplet_starts = 2;
        part.events = vec![Event::StartBar { staves: 1 }, Event::Note(note), Event::EndBar];

        let text = Transcriber::new(Options::default())
            .transcribe(&score(vec![part]))
            .unwrap();
        let expected = format!("Violin\n  {} ", braille(&[23, 456, 25, 3, 5, 125]));
        assert_eq!(text, expected);
    }

    #[test]
    fn test_too_many_tuplet_starts_is_malformed() {
        let mut part = Part::new("Violin");
        let id = part.tuplets.push(5, None).unwrap();
        let mut note = Note::pitched(Pitch::natural(Step::G, 4), Value::new(BaseValue::Eighth));
        note.tuplet = Some(id);
        note.tuplet_starts = 2;
        part.events = vec![Event::StartBar { staves: 1 }, Event::Note(note), Event::EndBar];

        let err = Transcriber::new(Options::default())
            .transcribe(&score(vec![part]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedTimeline);
        assert_eq!(
            err.position(),
            Some(Position::part(0).with_segment(0).with_measure(0))
        );
    }

    #[test]
    fn test_four_tuplet_policy() {
        let mut part = Part::new("Violin");
        part.tuplets.push(4, None).unwrap();
        let mut note = Note::pitched(Pitch::natural(Step::G, 4), Value::new(BaseValue::Eighth));
        note.tuplet = Some(TupletId(0));
        note.tuplet_starts = 1;
        part.events = vec![Event::StartBar { staves: 1 }, Event::Note(note), Event::EndBar];
        let scores = score(vec![part]);

        let err = Transcriber::new(Options::default())
            .transcribe(&scores)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedNotation);

        let lenient = Options {
            unsupported: UnsupportedPolicy::Omit,
            ..Options::default()
        };
        let text = Transcriber::new(lenient).transcribe(&scores).unwrap();
        assert_eq!(text, format!("Violin\n  {} ", braille(&[5, 125])));
    }

    #[test]
    fn test_compressed_repeats() {
        let body = vec![
            quarter(Step::C, 4),
            quarter(Step::D, 4),
            quarter(Step::D, 4),
            quarter(Step::D, 4),
            quarter(Step::D, 4),
        ];
        let options = Options {
            compress_repeats: true,
            ..Options::default()
        };
        let text = Transcriber::new(options)
            .transcribe(&score(vec![one_measure("P", body)]))
            .unwrap();
        let expected = format!("P\n  {} ", braille(&[5, 1456, 3456, 145, 156]));
        assert_eq!(text, expected);
    }

    #[test]
    fn test_occurrences_reset_between_runs() {
        let part = one_measure("P", vec![quarter(Step::C, 4), quarter(Step::D, 4)]);
        let scores = score(vec![part]);
        let mut transcriber = Transcriber::new(Options::default());

        transcriber.transcribe(&scores).unwrap();
        assert_eq!(transcriber.occurrences().total(), 2);
        let first = transcriber.text().to_string();

        transcriber.transcribe(&scores).unwrap();
        assert_eq!(transcriber.occurrences().total(), 2);
        assert_eq!(transcriber.text(), first);
    }

    #[test]
    fn test_failed_run_leaves_nothing_behind() {
        let fine = one_measure("Ok", vec![Event::Rest(Rest::new(Value::new(BaseValue::Quarter)))]);
        let broken = one_measure("Bad", vec![quarter(Step::C, 9)]);
        let mut transcriber = Transcriber::new(Options::default());

        let err = transcriber
            .transcribe(&score(vec![fine, broken]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedNotation);
        assert_eq!(transcriber.text(), "", "no partial output after an error");
        assert_eq!(transcriber.occurrences().total(), 0);
    }

    #[test]
    fn test_omit_policy_drops_only_bad_fingering() {
        let options = Options {
            show_fingering: true,
            unsupported: UnsupportedPolicy::Omit,
            ..Options::default()
        };

        let mut note = Note::pitched(Pitch::natural(Step::C, 4), Value::new(BaseValue::Quarter));
        note.fingering = vec![7];
        let part = one_measure("P", vec![Event::Note(note)]);
        let text = Transcriber::new(options.clone())
            .transcribe(&score(vec![part]))
            .unwrap();
        assert_eq!(text, format!("P\n  {} ", braille(&[5, 1456])));

        // an octave without a sign still fails, valid fingering or not
        let mut high = Note::pitched(Pitch::natural(Step::C, 9), Value::new(BaseValue::Quarter));
        high.fingering = vec![1];
        let part = one_measure("P", vec![Event::Note(high)]);
        let err = Transcriber::new(options)
            .transcribe(&score(vec![part]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedNotation);
        assert!(err.to_string().contains("octave 9"), "{}", err);
    }
}
