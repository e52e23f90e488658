//! # Repeat Compression
//!
//! Braille music abbreviates runs of identical signs: up to three copies are
//! written out, four or more are written as the number sign, the count in
//! upper digits and a single copy of the sign.
//!
//! [`OccurrenceCounter`] records how often each value was produced during a
//! transcription run, so a caller can see the repeat counts of the whole
//! output before it settles on compressed or literal rendering. It belongs to
//! the run that owns it and is cleared when a new run starts.

use std::collections::HashMap;
use std::hash::Hash;

use super::glyph::{upper_number, Braille};
use super::sign::Sign;

/// `amount` copies of `atom`, abbreviated from four copies upwards.
pub fn repeat(atom: &str, amount: usize) -> String {
    match amount {
        0 => String::new(),
        1..=3 => atom.repeat(amount),
        _ => format!("{}{}{}", Braille::NumberSign, upper_number(amount), atom),
    }
}

/// Anything that renders to a braille atom that can be repeated.
pub trait Repeatable {
    fn atom(&self) -> String;

    fn repeated(&self, amount: usize) -> String {
        repeat(&self.atom(), amount)
    }
}

impl Repeatable for Braille {
    fn atom(&self) -> String {
        self.to_string()
    }
}

impl Repeatable for Sign {
    fn atom(&self) -> String {
        self.text().to_string()
    }
}

/// Group consecutive equal items into (item, run length) pairs.
pub fn runs<T: PartialEq>(items: &[T]) -> Vec<(&T, usize)> {
    let mut runs: Vec<(&T, usize)> = Vec::new();
    for item in items {
        if let Some((last, count)) = runs.last_mut() {
            if *last == item {
                *count += 1;
                continue;
            }
        }
        runs.push((item, 1));
    }
    runs
}

/// Render a sequence with every run of equal items compressed.
pub fn compress<T: Repeatable + PartialEq>(items: &[T]) -> String {
    runs(items)
        .into_iter()
        .map(|(item, count)| item.repeated(count))
        .collect()
}

/// Counts occurrences of values by equality.
#[derive(Debug, Clone)]
pub struct OccurrenceCounter<T: Eq + Hash> {
    counts: HashMap<T, usize>,
    total: usize,
}

impl<T: Eq + Hash> Default for OccurrenceCounter<T> {
    fn default() -> Self {
        Self {
            counts: HashMap::new(),
            total: 0,
        }
    }
}

impl<T: Eq + Hash + Clone> OccurrenceCounter<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one occurrence and return the new count for that value.
    pub fn add(&mut self, item: &T) -> usize {
        self.total += 1;
        let count = self.counts.entry(item.clone()).or_insert(0);
        *count += 1;
        *count
    }

    pub fn count(&self, item: &T) -> usize {
        self.counts.get(item).copied().unwrap_or(0)
    }

    /// Number of distinct values seen
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Number of occurrences recorded since the last clear
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn clear(&mut self) {
        self.counts.clear();
        self.total = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::braille::glyph::braille;

    #[test]
    fn test_repeat_literal_up_to_three() {
        let atom = Braille::Staccato.to_string();
        assert_eq!(repeat(&atom, 0), "");
        assert_eq!(repeat(&atom, 1), atom);
        assert_eq!(repeat(&atom, 2).chars().count(), 2);
        assert_eq!(repeat(&atom, 3), atom.repeat(3));
    }

    #[test]
    fn test_repeat_four_uses_number_sign() {
        let atom = braille(&[1456]);
        let expected = format!("{}{}{}", braille(&[3456]), braille(&[145]), atom);
        assert_eq!(repeat(&atom, 4), expected);
        assert_eq!(Braille::Trill.repeated(4).matches(&Braille::Trill.to_string()).count(), 1);
    }

    #[test]
    fn test_repeat_multi_digit_count() {
        let atom = braille(&[15]);
        let expected = format!("{}{}{}{}", braille(&[3456]), braille(&[1]), braille(&[124]), atom);
        assert_eq!(repeat(&atom, 16), expected);
    }

    #[test]
    fn test_runs_and_compress() {
        let items = [Braille::Dot, Braille::Dot, Braille::Tie, Braille::Dot];
        let grouped = runs(&items);
        assert_eq!(grouped.len(), 3);
        assert_eq!(grouped[0], (&Braille::Dot, 2));

        let many = [Braille::Slur; 5];
        assert_eq!(compress(&many), Braille::Slur.repeated(5));
    }

    #[test]
    fn test_occurrence_counter() {
        let mut counter = OccurrenceCounter::new();
        assert_eq!(counter.add(&Braille::Dot), 1);
        assert_eq!(counter.add(&Braille::Dot), 2);
        counter.add(&Braille::Tie);
        assert_eq!(counter.count(&Braille::Dot), 2);
        assert_eq!(counter.distinct(), 2);
        assert_eq!(counter.total(), 3);

        counter.clear();
        assert!(counter.is_empty());
        assert_eq!(counter.count(&Braille::Dot), 0);
    }
}
