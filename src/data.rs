//! Render data files (.json, .yaml, .toml)

use anyhow::{anyhow, bail, Context as _, Result};
use std::fs;
use std::path::Path;

use crate::render::{Mapping, Value};

/// Load a data file into root bindings.
///
/// The format is picked from the extension; the document root must be a map.
pub fn load_data<P: AsRef<Path>>(path: P) -> Result<Mapping> {
    let path = path.as_ref();
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read data file {:?}", path))?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    let json = parse_data(&content, &ext).with_context(|| format!("Invalid data in {:?}", path))?;
    into_mapping(&json)
}

/// Parse a data document in the named format
pub fn parse_data(content: &str, format: &str) -> Result<serde_json::Value> {
    let json: serde_json::Value = match format {
        "json" => serde_json::from_str(content)?,
        "yaml" | "yml" => serde_yaml::from_str(content)?,
        "toml" => toml::from_str(content)?,
        other => bail!("Unsupported data format: {:?}", other),
    };
    Ok(json)
}

/// Convert a JSON object into bindings
pub fn into_mapping(json: &serde_json::Value) -> Result<Mapping> {
    match Value::from_json(json) {
        Value::Map(map) => Ok(map),
        Value::Absent => Ok(Mapping::new()),
        other => Err(anyhow!("Data root must be a map, found {:?}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_formats() {
        let json = parse_data(r#"{"title": "x"}"#, "json").unwrap();
        assert_eq!(json["title"], "x");

        let yaml = parse_data("title: x\ntags:\n  - a\n", "yaml").unwrap();
        assert_eq!(yaml["tags"][0], "a");

        let toml = parse_data("title = \"x\"\n[author]\nname = \"Ann\"\n", "toml").unwrap();
        assert_eq!(toml["author"]["name"], "Ann");

        assert!(parse_data("", "ini").is_err());
    }

    #[test]
    fn test_load_data_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.yml");
        fs::write(&path, "name: World\ncount: 2\n").unwrap();

        let data = load_data(&path).unwrap();
        assert_eq!(data.get("name"), Some(&Value::from("World")));
        assert_eq!(data.get("count"), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_non_map_root_rejected() {
        let json = serde_json::json!([1, 2]);
        assert!(into_mapping(&json).is_err());
        assert!(into_mapping(&serde_json::Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_missing_file() {
        let err = load_data("/nonexistent/data.json").unwrap_err();
        assert!(err.to_string().contains("Failed to read data file"));
    }
}
