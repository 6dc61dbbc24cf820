//! Delimiter pair used to recognise tags

use std::fmt;

/// Current open/close tag markers. Both are non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiters {
    open: Vec<char>,
    close: Vec<char>,
}

impl Delimiters {
    /// Build a delimiter pair, or `None` if either side is empty
    pub fn new(open: &str, close: &str) -> Option<Self> {
        if open.is_empty() || close.is_empty() {
            return None;
        }
        Some(Self {
            open: open.chars().collect(),
            close: close.chars().collect(),
        })
    }

    pub fn open(&self) -> &[char] {
        &self.open
    }

    pub fn close(&self) -> &[char] {
        &self.close
    }

    pub fn open_str(&self) -> String {
        self.open.iter().collect()
    }

    pub fn close_str(&self) -> String {
        self.close.iter().collect()
    }
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            open: vec!['{', '{'],
            close: vec!['}', '}'],
        }
    }
}

impl fmt::Display for Delimiters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.open_str(), self.close_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let delims = Delimiters::default();
        assert_eq!(delims.open_str(), "{{");
        assert_eq!(delims.close_str(), "}}");
    }

    #[test]
    fn test_custom() {
        let delims = Delimiters::new("<%", "%>").unwrap();
        assert_eq!(delims.open(), &['<', '%']);
        assert_eq!(delims.to_string(), "<% %>");

        let single = Delimiters::new("|", "|").unwrap();
        assert_eq!(single.close().len(), 1);
    }

    #[test]
    fn test_empty_rejected() {
        assert!(Delimiters::new("", "}}").is_none());
        assert!(Delimiters::new("{{", "").is_none());
    }
}
