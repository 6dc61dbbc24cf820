//! Output collector and encoders

use std::borrow::Cow;
use std::sync::Arc;

/// Escapes text written through name tags
pub trait Encoder: Send + Sync {
    fn encode<'t>(&self, text: &'t str) -> Cow<'t, str>;
}

/// HTML escaping, the default
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlEncoder;

impl Encoder for HtmlEncoder {
    fn encode<'t>(&self, text: &'t str) -> Cow<'t, str> {
        if !text.contains(|c: char| matches!(c, '&' | '<' | '>' | '"' | '\'')) {
            return Cow::Borrowed(text);
        }
        Cow::Owned(html_escape(text))
    }
}

/// Passes text through unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct RawEncoder;

impl Encoder for RawEncoder {
    fn encode<'t>(&self, text: &'t str) -> Cow<'t, str> {
        Cow::Borrowed(text)
    }
}

/// HTML escape a string
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + s.len() / 8);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Ordered output fragments for one render
pub struct OutputCollector {
    fragments: Vec<String>,
    encoder: Arc<dyn Encoder>,
}

impl OutputCollector {
    /// Collector escaping with [`HtmlEncoder`]
    pub fn new() -> Self {
        Self::with_encoder(Arc::new(HtmlEncoder))
    }

    pub fn with_encoder(encoder: Arc<dyn Encoder>) -> Self {
        Self {
            fragments: Vec::new(),
            encoder,
        }
    }

    /// Append text through the encoder
    pub fn append(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let encoded = self.encoder.encode(text).into_owned();
        self.fragments.push(encoded);
    }

    /// Append text as-is
    pub fn append_raw(&mut self, text: &str) {
        if !text.is_empty() {
            self.fragments.push(text.to_string());
        }
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Length in bytes of everything collected so far
    pub fn len(&self) -> usize {
        self.fragments.iter().map(String::len).sum()
    }

    /// A collector sharing this one's encoder but no output
    pub fn fork(&self) -> Self {
        Self::with_encoder(Arc::clone(&self.encoder))
    }

    /// Move another collector's fragments onto the end of this one
    pub fn splice(&mut self, other: OutputCollector) {
        self.fragments.extend(other.fragments);
    }

    pub fn into_string(self) -> String {
        self.fragments.concat()
    }
}

impl Default for OutputCollector {
    fn default() -> Self {
        Self::new()
    }
}
