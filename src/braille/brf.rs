//! Braille ASCII (BRF), the 64-character encoding used by embossers.
//!
//! Each braille cell maps to one printable ASCII character. Line breaks are
//! kept as they are, so a transcribed page converts line by line.

use crate::error::{BrailleError, Result};

use super::glyph::{cell_bits, dots_to_bits, unicode_braille};

/// (dot pattern, BRF character) for all 64 cells
const BRF_TABLE: [(u32, char); 64] = [
    (0, ' '),
    (1, 'A'),
    (2, '1'),
    (3, '\''),
    (4, '@'),
    (5, '"'),
    (6, ','),
    (12, 'B'),
    (13, 'K'),
    (14, 'C'),
    (15, 'E'),
    (16, '*'),
    (23, '2'),
    (24, 'I'),
    (25, '3'),
    (26, '5'),
    (34, '/'),
    (35, '9'),
    (36, '-'),
    (45, '^'),
    (46, '.'),
    (56, ';'),
    (123, 'L'),
    (124, 'F'),
    (125, 'H'),
    (126, '<'),
    (134, 'M'),
    (135, 'O'),
    (136, 'U'),
    (145, 'D'),
    (146, '%'),
    (156, ':'),
    (234, 'S'),
    (235, '6'),
    (236, '8'),
    (245, 'J'),
    (246, '['),
    (256, '4'),
    (345, '>'),
    (346, '+'),
    (356, '0'),
    (456, '_'),
    (1234, 'P'),
    (1235, 'R'),
    (1236, 'V'),
    (1245, 'G'),
    (1246, '$'),
    (1256, '\\'),
    (1345, 'N'),
    (1346, 'X'),
    (1356, 'Z'),
    (1456, '?'),
    (2345, 'T'),
    (2346, '!'),
    (2356, '7'),
    (2456, 'W'),
    (3456, '#'),
    (12345, 'Q'),
    (12346, '&'),
    (12356, '('),
    (12456, ']'),
    (13456, 'Y'),
    (23456, ')'),
    (123456, '='),
];

fn brf_char(cell: char) -> Option<char> {
    BRF_TABLE
        .iter()
        .find(|(dots, _)| unicode_braille(dots_to_bits(*dots)) == cell)
        .map(|&(_, ascii)| ascii)
}

fn braille_cell(ascii: char) -> Option<char> {
    let ascii = ascii.to_ascii_uppercase();
    BRF_TABLE
        .iter()
        .find(|&&(_, c)| c == ascii)
        .map(|&(dots, _)| unicode_braille(dots_to_bits(dots)))
}

/// Convert transcribed text to BRF.
///
/// Six-dot cells are translated; ASCII characters such as page numbers and
/// line breaks pass through. An eight-dot cell is `UnsupportedNotation`; any
/// other character (an accented part name, say) is an `ExportError` naming
/// its line and column.
pub fn to_brf(text: &str) -> Result<String> {
    let mut brf = String::with_capacity(text.len());
    for (line_index, line) in text.split('\n').enumerate() {
        if line_index > 0 {
            brf.push('\n');
        }
        for (column, c) in line.chars().enumerate() {
            if c.is_ascii() {
                brf.push(c);
                continue;
            }
            if let Some(ascii) = brf_char(c) {
                brf.push(ascii);
                continue;
            }
            if cell_bits(c).is_some() {
                return Err(BrailleError::unsupported(format!(
                    "no BRF equivalent for the eight-dot cell '{}'",
                    c
                )));
            }
            return Err(BrailleError::ExportError(format!(
                "line {}, column {}: '{}' has no BRF form",
                line_index + 1,
                column + 1,
                c
            )));
        }
    }
    Ok(brf)
}

/// Convert BRF back to Unicode braille. Lower-case letters read as their
/// upper-case cells; line breaks are kept.
pub fn from_brf(text: &str) -> Result<String> {
    text.chars()
        .map(|c| match c {
            '\n' | '\r' => Ok(c),
            _ => braille_cell(c).ok_or_else(|| {
                BrailleError::ExportError(format!("'{}' is not a BRF character", c))
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::braille::glyph::braille;

    #[test]
    fn test_table_covers_every_cell_once() {
        let mut masks: Vec<u8> = BRF_TABLE.iter().map(|(d, _)| dots_to_bits(*d)).collect();
        masks.sort_unstable();
        masks.dedup();
        assert_eq!(masks.len(), 64);

        let mut chars: Vec<char> = BRF_TABLE.iter().map(|(_, c)| *c).collect();
        chars.sort_unstable();
        chars.dedup();
        assert_eq!(chars.len(), 64);
    }

    #[test]
    fn test_to_brf() {
        // quarter C, octave 5 sign, number sign
        let text = braille(&[1456, 5, 3456]);
        assert_eq!(to_brf(&text).unwrap(), "?\"#");
        assert_eq!(to_brf("\u{2800}\n").unwrap(), " \n");
    }

    #[test]
    fn test_from_brf_accepts_lower_case() {
        assert_eq!(from_brf("d").unwrap(), braille(&[145]));
        assert_eq!(from_brf("?\"").unwrap(), braille(&[1456, 5]));
        assert!(from_brf("~").is_err());
    }

    #[test]
    fn test_eight_dot_cells_are_rejected() {
        let err = to_brf("\u{28C0}").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::UnsupportedNotation);
    }

    #[test]
    fn test_accented_text_is_an_export_error() {
        let text = format!("Flute\nFl\u{fb}te\n  {}", braille(&[1456]));
        let err = to_brf(&text).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Export);
        assert_eq!(err.position(), None);
        assert!(err.to_string().contains("line 2, column 3"), "{}", err);
        assert_eq!(from_brf("~").unwrap_err().kind(), crate::ErrorKind::Export);
    }
}
