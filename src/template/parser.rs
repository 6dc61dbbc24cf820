//! Parser - template source to tag tree
//!
//! A single pass over the scanner alternates between plain text and tag
//! bodies. Open sections are tracked on an explicit stack of arena indices;
//! new tags are attached to whatever group is on top of it.

use super::delimiters::Delimiters;
use super::pragma::Pragma;
use super::scanner::Scanner;
use super::tag::{Tag, TagId, TagKind, Template};
use crate::error::{MustacheError, Result};

/// Parse an anonymous template
pub fn parse(source: &str) -> Result<Template> {
    parse_named("<string>", source)
}

/// Parse a template, using `name` in error messages
pub fn parse_named(name: &str, source: &str) -> Result<Template> {
    Parser::new(name, source).parse()
}

/// Parser state for one template
struct Parser<'s> {
    name: &'s str,
    scanner: Scanner<'s>,
    delimiters: Delimiters,
    tags: Vec<Tag>,
    root: Vec<TagId>,
    /// Open groups with the offset of their opening tag
    open_groups: Vec<(TagId, usize)>,
    pragmas: Vec<Pragma>,
}

impl<'s> Parser<'s> {
    fn new(name: &'s str, source: &'s str) -> Self {
        Self {
            name,
            scanner: Scanner::new(source),
            delimiters: Delimiters::default(),
            tags: Vec::new(),
            root: Vec::new(),
            open_groups: Vec::new(),
            pragmas: Vec::new(),
        }
    }

    fn parse(mut self) -> Result<Template> {
        loop {
            let (text, in_tag) = self.scan_plain_text();
            if !text.is_empty() {
                self.push(TagKind::Plain, text);
            }
            if !in_tag {
                break;
            }
            let start = self.scanner.offset() - self.delimiters.open().len();
            self.scan_tag(start)?;
        }

        if let Some((id, start)) = self.open_groups.last() {
            let name = self.tags[id.0].text().to_string();
            return Err(self.error(*start, format!("unterminated section `{}`", name)));
        }

        tracing::debug!("Parsed template {} ({} tags)", self.name, self.tags.len());
        Ok(Template::new(
            self.name.to_string(),
            self.tags,
            self.root,
            self.pragmas,
        ))
    }

    /// Accumulate text up to the next open delimiter.
    ///
    /// Returns the text and whether an open delimiter was consumed.
    fn scan_plain_text(&mut self) -> (String, bool) {
        let mut text = String::new();
        loop {
            if self.scanner.try_consume(self.delimiters.open()) {
                return (text, true);
            }
            match self.scanner.next_char() {
                Some(c) => text.push(c),
                None => return (text, false),
            }
        }
    }

    /// Classify and parse one tag body; the open delimiter is already consumed
    fn scan_tag(&mut self, start: usize) -> Result<()> {
        let body_start = self.scanner.byte_offset();
        let close_len: usize = self.delimiters.close().iter().map(|c| c.len_utf8()).sum();

        self.scanner.skip_whitespace();
        let sigil = match self.scanner.next_char() {
            Some(c) => c,
            None => return Err(self.error(start, "unclosed tag")),
        };

        let (id, closing) = match sigil {
            '%' => {
                let body = self.read_body(start)?;
                self.pragmas.push(Pragma::parse(&body));
                (self.push(TagKind::Pragma, body), false)
            }
            '#' => {
                let name = self.read_name(start)?;
                let id = self.push(TagKind::Section, name);
                self.open_groups.push((id, start));
                (id, false)
            }
            '^' => {
                let name = self.read_name(start)?;
                let id = self.push(TagKind::InvertedSection, name);
                self.open_groups.push((id, start));
                (id, false)
            }
            '!' => {
                let body = self.read_body(start)?;
                (self.push(TagKind::Comment, body), false)
            }
            '&' => {
                let name = self.read_name(start)?;
                (self.push(TagKind::Unescaped, name), false)
            }
            '>' => {
                let name = self.read_name(start)?;
                (self.push(TagKind::Partial, name), false)
            }
            '/' => (self.close_group(start)?, true),
            '=' => (self.set_delimiters(start)?, false),
            '{' => {
                let name = self.read_triple_name(start)?;
                (self.push(TagKind::Triple, name), false)
            }
            other => {
                self.scanner.put_back(&[other]);
                let name = self.read_name(start)?;
                (self.push(TagKind::Name, name), false)
            }
        };

        // Everything between the delimiters, as written
        let body_end = self.scanner.byte_offset().saturating_sub(close_len);
        let source = self.scanner.slice(body_start, body_end).to_string();
        if closing {
            self.tags[id.0].set_close_source(source);
        } else {
            self.tags[id.0].set_source(source);
        }
        Ok(())
    }

    /// Read verbatim up to and including the close delimiter
    fn read_body(&mut self, start: usize) -> Result<String> {
        match self.scanner.read_until(self.delimiters.close()) {
            Some(body) => Ok(body),
            None => Err(self.error(start, "unclosed tag")),
        }
    }

    fn read_name(&mut self, start: usize) -> Result<String> {
        let body = self.read_body(start)?;
        self.check_name(start, body)
    }

    /// A triple-stache name must be followed by exactly one `}` and then the
    /// close delimiter. The first close delimiter ends the tag either way.
    fn read_triple_name(&mut self, start: usize) -> Result<String> {
        let mut terminator = vec!['}'];
        terminator.extend_from_slice(self.delimiters.close());
        let mut body = String::new();
        loop {
            if self.scanner.try_consume(&terminator) {
                return self.check_name(start, body);
            }
            if self.scanner.try_consume(self.delimiters.close()) {
                return Err(self.error(
                    start,
                    format!(
                        "unescaped tag must end with `}}{}`",
                        self.delimiters.close_str()
                    ),
                ));
            }
            match self.scanner.next_char() {
                Some(c) => body.push(c),
                None => return Err(self.error(start, "unclosed tag")),
            }
        }
    }

    fn check_name(&self, start: usize, body: String) -> Result<String> {
        let name = body.trim();
        if name.is_empty() {
            return Err(self.error(start, "missing tag name"));
        }
        Ok(name.to_string())
    }

    fn close_group(&mut self, start: usize) -> Result<TagId> {
        let name = self.read_name(start)?;
        let Some((open, _)) = self.open_groups.pop() else {
            return Err(self.error(start, format!("unexpected closing tag `{}`", name)));
        };
        let expected = self.tags[open.0].text();
        if expected != name {
            return Err(self.error(
                start,
                format!(
                    "closing tag name mismatch: expected `{}`, found `{}`",
                    expected, name
                ),
            ));
        }
        let delimiters = self.delimiters.clone();
        self.tags[open.0].close(delimiters);
        Ok(open)
    }

    /// `=NEW_OPEN NEW_CLOSE=` followed by the current close delimiter
    fn set_delimiters(&mut self, start: usize) -> Result<TagId> {
        self.scanner.skip_whitespace();

        let mut open = String::new();
        loop {
            match self.scanner.next_char() {
                Some(c) if c.is_whitespace() => break,
                Some(c) => open.push(c),
                None => return Err(self.error(start, "unclosed set-delimiters tag")),
            }
        }

        self.scanner.skip_whitespace();
        let mut close = String::new();
        loop {
            match self.scanner.peek() {
                Some(c) if c.is_whitespace() || c == '=' => break,
                Some(c) => {
                    self.scanner.next_char();
                    close.push(c);
                }
                None => return Err(self.error(start, "unclosed set-delimiters tag")),
            }
        }

        self.scanner.skip_whitespace();
        if self.scanner.peek() == Some('=') {
            self.scanner.next_char();
        }
        self.scanner.skip_whitespace();
        if !self.scanner.try_consume(self.delimiters.close()) {
            return Err(self.error(
                start,
                format!(
                    "malformed set-delimiters tag, expected `{}`",
                    self.delimiters.close_str()
                ),
            ));
        }

        let Some(delimiters) = Delimiters::new(&open, &close) else {
            return Err(self.error(start, "set-delimiters tag needs an open and a close marker"));
        };
        let id = self.push(TagKind::SetDelimiters, format!("{} {}", open, close));
        tracing::trace!("Delimiters changed to {}", delimiters);
        self.delimiters = delimiters;
        Ok(id)
    }

    /// Append a tag to the innermost open group, or to the root
    fn push(&mut self, kind: TagKind, text: String) -> TagId {
        let id = TagId(self.tags.len());
        let parent = self.open_groups.last().map(|(group, _)| *group);
        self.tags
            .push(Tag::new(kind, text, self.delimiters.clone(), parent));
        match parent {
            Some(group) => self.tags[group.0].push_child(id),
            None => self.root.push(id),
        }
        id
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> MustacheError {
        let (line, column) = self.scanner.position(offset);
        MustacheError::Syntax {
            template: self.name.to_string(),
            line,
            column,
            message: message.into(),
        }
    }
}
