//! Scanner - a forward-only code point stream with putback
//!
//! The scanner never backtracks over consumed input. Speculative reads made
//! while testing a delimiter match are held in a putback buffer and replayed
//! in order when the match fails.

use std::collections::VecDeque;
use std::str::Chars;

/// Forward-only code point reader over a template source
pub struct Scanner<'s> {
    source: &'s str,
    chars: Chars<'s>,
    putback: VecDeque<char>,
    offset: usize,
    byte_offset: usize,
}

impl<'s> Scanner<'s> {
    pub fn new(source: &'s str) -> Self {
        Self {
            source,
            chars: source.chars(),
            putback: VecDeque::new(),
            offset: 0,
            byte_offset: 0,
        }
    }

    /// Number of code points consumed so far
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Byte position of the next code point in the source
    pub fn byte_offset(&self) -> usize {
        self.byte_offset
    }

    /// Source text between two byte positions
    pub fn slice(&self, from: usize, to: usize) -> &'s str {
        self.source.get(from..to).unwrap_or_default()
    }

    /// Read the next code point, or `None` at end of input
    pub fn next_char(&mut self) -> Option<char> {
        let c = self.putback.pop_front().or_else(|| self.chars.next())?;
        self.offset += 1;
        self.byte_offset += c.len_utf8();
        Some(c)
    }

    /// Look at the next code point without consuming it
    pub fn peek(&mut self) -> Option<char> {
        if let Some(c) = self.putback.front() {
            return Some(*c);
        }
        let c = self.chars.next()?;
        self.putback.push_back(c);
        Some(c)
    }

    pub fn is_at_end(&mut self) -> bool {
        self.peek().is_none()
    }

    /// Return code points to the front of the stream, preserving their order
    pub fn put_back(&mut self, read: &[char]) {
        for c in read.iter().rev() {
            self.putback.push_front(*c);
        }
        self.offset -= read.len();
        self.byte_offset -= read.iter().map(|c| c.len_utf8()).sum::<usize>();
    }

    /// Consume `seq` if the stream continues with it.
    ///
    /// On a partial match every speculatively read code point is put back, so
    /// the caller sees the stream exactly as before.
    pub fn try_consume(&mut self, seq: &[char]) -> bool {
        let mut read = Vec::with_capacity(seq.len());
        for expected in seq {
            match self.next_char() {
                Some(c) => {
                    read.push(c);
                    if c != *expected {
                        self.put_back(&read);
                        return false;
                    }
                }
                None => {
                    self.put_back(&read);
                    return false;
                }
            }
        }
        true
    }

    /// Skip whitespace, returning how many code points were skipped
    pub fn skip_whitespace(&mut self) -> usize {
        let mut skipped = 0;
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.next_char();
            skipped += 1;
        }
        skipped
    }

    /// Read code points until `terminator` matches, consuming it.
    ///
    /// Returns `None` if the input ends first.
    pub fn read_until(&mut self, terminator: &[char]) -> Option<String> {
        let mut text = String::new();
        loop {
            if self.try_consume(terminator) {
                return Some(text);
            }
            text.push(self.next_char()?);
        }
    }

    /// 1-based (line, column) of a code point offset
    pub fn position(&self, offset: usize) -> (usize, usize) {
        let mut line = 1;
        let mut column = 1;
        for c in self.source.chars().take(offset) {
            if c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        (line, column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_next_char_tracks_offset() {
        let mut scanner = Scanner::new("añb");
        assert_eq!(scanner.next_char(), Some('a'));
        assert_eq!(scanner.next_char(), Some('ñ'));
        assert_eq!(scanner.offset(), 2);
        assert_eq!(scanner.next_char(), Some('b'));
        assert_eq!(scanner.next_char(), None);
        assert_eq!(scanner.offset(), 3);
    }

    #[test]
    fn test_try_consume_match() {
        let mut scanner = Scanner::new("{{name");
        assert!(scanner.try_consume(&chars("{{")));
        assert_eq!(scanner.offset(), 2);
        assert_eq!(scanner.next_char(), Some('n'));
    }

    #[test]
    fn test_try_consume_mismatch_puts_back() {
        let mut scanner = Scanner::new("{x}");
        assert!(!scanner.try_consume(&chars("{{")));
        assert_eq!(scanner.offset(), 0);
        assert_eq!(scanner.next_char(), Some('{'));
        assert_eq!(scanner.next_char(), Some('x'));
    }

    #[test]
    fn test_try_consume_at_end() {
        let mut scanner = Scanner::new("{");
        assert!(!scanner.try_consume(&chars("{{")));
        assert_eq!(scanner.next_char(), Some('{'));
        assert!(scanner.is_at_end());
    }

    #[test]
    fn test_read_until() {
        let mut scanner = Scanner::new(" name }}rest");
        assert_eq!(scanner.read_until(&chars("}}")).as_deref(), Some(" name "));
        assert_eq!(scanner.next_char(), Some('r'));

        let mut scanner = Scanner::new("name }");
        assert_eq!(scanner.read_until(&chars("}}")), None);
    }

    #[test]
    fn test_byte_offset_and_slice() {
        let mut scanner = Scanner::new("ñ{é}x");
        scanner.next_char();
        let from = scanner.byte_offset();
        assert_eq!(from, 2);
        assert!(!scanner.try_consume(&chars("{ë")));
        assert_eq!(scanner.byte_offset(), from);
        assert_eq!(scanner.read_until(&chars("}")).as_deref(), Some("{é"));
        assert_eq!(scanner.slice(from, scanner.byte_offset()), "{é}");
    }

    #[test]
    fn test_position() {
        let scanner = Scanner::new("ab\ncd\ne");
        assert_eq!(scanner.position(0), (1, 1));
        assert_eq!(scanner.position(4), (2, 2));
        assert_eq!(scanner.position(6), (3, 1));
    }
}
