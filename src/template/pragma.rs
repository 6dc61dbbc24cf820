//! Pragma tag payloads: `{{%key:value,flag}}`

use indexmap::IndexMap;

/// Parsed key/value pairs of one pragma tag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pragma {
    entries: IndexMap<String, String>,
}

impl Pragma {
    /// Parse `key[:value]` pieces separated by commas.
    ///
    /// The value runs from just after the first colon to the end of the piece,
    /// whitespace included. A piece without a colon maps to the empty string.
    /// Empty pieces are skipped and later keys overwrite earlier ones.
    pub fn parse(text: &str) -> Self {
        let mut entries = IndexMap::new();
        for piece in text.split(',').filter(|p| !p.is_empty()) {
            let (key, value) = piece.split_once(':').unwrap_or((piece, ""));
            entries.insert(key.to_string(), value.to_string());
        }
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn entries(&self) -> &IndexMap<String, String> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_value_pairs() {
        let pragma = Pragma::parse("content-type:text/plain,cache:60");
        assert_eq!(pragma.len(), 2);
        assert_eq!(pragma.get("content-type"), Some("text/plain"));
        assert_eq!(pragma.get("cache"), Some("60"));
    }

    #[test]
    fn test_missing_value_is_empty() {
        let pragma = Pragma::parse("strict");
        assert!(pragma.contains("strict"));
        assert_eq!(pragma.get("strict"), Some(""));
    }

    #[test]
    fn test_value_keeps_later_colons() {
        let pragma = Pragma::parse("url:http://example.com:8080/x");
        assert_eq!(pragma.get("url"), Some("http://example.com:8080/x"));
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let pragma = Pragma::parse("mode:a,other,mode:b");
        assert_eq!(pragma.get("mode"), Some("b"));
        assert_eq!(pragma.len(), 2);
    }

    #[test]
    fn test_whitespace_is_kept() {
        let pragma = Pragma::parse("a: b, c");
        assert_eq!(pragma.get("a"), Some(" b"));
        assert!(pragma.contains(" c"));
        assert!(!pragma.contains("c"));
    }

    #[test]
    fn test_empty_pieces_ignored() {
        let pragma = Pragma::parse(",,");
        assert!(pragma.is_empty());
    }
}
