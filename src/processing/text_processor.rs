//! Text normalization for extracted CV text

use regex::Regex;

pub struct TextProcessor {
    horizontal_whitespace: Regex,
    excess_newlines: Regex,
}

impl Default for TextProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextProcessor {
    pub fn new() -> Self {
        let horizontal_whitespace = Regex::new(r"[ \t]+").expect("Invalid whitespace regex");
        let excess_newlines = Regex::new(r"\n{3,}").expect("Invalid newline regex");

        Self {
            horizontal_whitespace,
            excess_newlines,
        }
    }

    /// Clean raw extracted text. Idempotent.
    ///
    /// Non-breaking spaces become spaces, runs of spaces/tabs collapse to one
    /// space, every carriage return becomes a newline, three or
    /// more newlines collapse to a blank line, and the result is trimmed.
    pub fn clean_text(&self, text: &str) -> String {
        let text = text.replace('\u{00A0}', " ");
        let text = self.horizontal_whitespace.replace_all(&text, " ");
        let text = text.replace('\r', "\n");
        let text = self.excess_newlines.replace_all(&text, "\n\n");
        text.trim().to_string()
    }
}
