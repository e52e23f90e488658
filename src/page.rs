//! # Page Layout
//!
//! Accumulates braille text into lines of a fixed width and pages of a
//! fixed height. When a page fills up, its number is written right-justified
//! on the last line and counting starts over on the next page.
//!
//! Widths are counted in characters (braille cells), not bytes.

/// Paginated text accumulator for one transcription run
#[derive(Debug, Clone)]
pub struct PageWriter {
    text: String,
    page_width: usize,
    page_height: usize,
    character_count: usize,
    line_count: usize,
    page_number: usize,
}

impl PageWriter {
    pub fn new(page_width: usize, page_height: usize) -> Self {
        Self {
            text: String::new(),
            page_width,
            page_height,
            character_count: 0,
            line_count: 0,
            page_number: 1,
        }
    }

    /// Start over with an empty first page.
    pub fn reset(&mut self) {
        self.text.clear();
        self.character_count = 0;
        self.line_count = 0;
        self.page_number = 1;
    }

    pub fn print_string(&mut self, text: &str) {
        self.text.push_str(text);
        self.character_count += text.chars().count();
    }

    /// Print `text` followed by a line break
    pub fn print_line(&mut self, text: &str) {
        self.print_string(text);
        self.new_line();
    }

    pub fn new_line(&mut self) {
        self.text.push('\n');
        self.character_count = 0;
        self.line_count += 1;
        if self.line_count == self.page_height {
            let number = self.page_number.to_string();
            let column = self.page_width.saturating_sub(number.chars().count());
            self.indent_to(column);
            self.text.push_str(&number);
            self.text.push('\n');
            log::trace!("finished page {}", self.page_number);
            self.page_number += 1;
            self.character_count = 0;
            self.line_count = 0;
        }
    }

    /// Pad the current line with spaces up to `column`.
    pub fn indent_to(&mut self, column: usize) {
        if column > self.character_count {
            let padding = column - self.character_count;
            self.text.push_str(&" ".repeat(padding));
            self.character_count = column;
        }
    }

    /// True when `text` still fits on the current line
    pub fn fits(&self, text: &str) -> bool {
        self.character_count + text.chars().count() <= self.page_width
    }

    pub fn character_count(&self) -> usize {
        self.character_count
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Number of the page currently being written
    pub fn page_number(&self) -> usize {
        self.page_number
    }

    pub fn page_width(&self) -> usize {
        self.page_width
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_number_after_last_line() {
        let mut writer = PageWriter::new(10, 3);
        writer.print_line("a");
        writer.print_line("b");
        assert_eq!(writer.page_number(), 1);
        writer.print_line("c");
        assert_eq!(writer.as_str(), "a\nb\nc\n         1\n");
        assert_eq!(writer.page_number(), 2);
        assert_eq!(writer.line_count(), 0);
        assert_eq!(writer.character_count(), 0);

        writer.print_line("d");
        writer.print_line("e");
        writer.print_line("f");
        assert!(writer.as_str().ends_with("f\n         2\n"));
        assert_eq!(writer.page_number(), 3);
    }

    #[test]
    fn test_multi_digit_page_number_is_right_justified() {
        let mut writer = PageWriter::new(8, 1);
        for _ in 0..10 {
            writer.new_line();
        }
        let last = writer.as_str().lines().last().unwrap();
        assert_eq!(last, "      10");
        assert_eq!(last.chars().count(), 8);
    }

    #[test]
    fn test_widths_count_cells() {
        let mut writer = PageWriter::new(4, 25);
        writer.indent_to(2);
        writer.print_string("⠐⠹");
        assert_eq!(writer.character_count(), 4);
        assert!(!writer.fits("⠹"));
        assert!(writer.fits(""));
    }

    #[test]
    fn test_indent_never_moves_backwards() {
        let mut writer = PageWriter::new(40, 25);
        writer.print_string("abc");
        writer.indent_to(2);
        assert_eq!(writer.as_str(), "abc");
    }

    #[test]
    fn test_reset() {
        let mut writer = PageWriter::new(10, 1);
        writer.print_line("x");
        writer.reset();
        assert_eq!(writer.as_str(), "");
        assert_eq!(writer.page_number(), 1);
    }
}
