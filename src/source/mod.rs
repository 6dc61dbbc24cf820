//! Template sources - where root templates and partials are read from

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{MustacheError, Result};

/// Provides raw template bytes by logical path
pub trait TemplateSource: Send + Sync {
    fn load(&self, path: &Path) -> Result<Vec<u8>>;
}

/// Load a template and decode it as UTF-8
pub fn load_text(source: &dyn TemplateSource, path: &Path) -> Result<String> {
    let bytes = source.load(path)?;
    String::from_utf8(bytes).map_err(|_| MustacheError::InvalidEncoding(path.to_path_buf()))
}

/// Path of partial `name` next to the template at `current`.
///
/// Without a current file the partial is looked up at the source root.
pub fn resolve_partial(current: Option<&Path>, name: &str, extension: &str) -> PathBuf {
    let dir = current.and_then(Path::parent).unwrap_or(Path::new(""));
    if extension.is_empty() {
        dir.join(name)
    } else {
        dir.join(format!("{}.{}", name, extension))
    }
}

/// Reads templates from a directory on disk
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl TemplateSource for FsSource {
    fn load(&self, path: &Path) -> Result<Vec<u8>> {
        let full = self.root.join(path);
        match fs::read(&full) {
            Ok(bytes) => {
                tracing::debug!("Loaded template {:?}", full);
                Ok(bytes)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(MustacheError::TemplateNotFound(path.to_path_buf()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory templates keyed by path
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<PathBuf, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, text: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), text.into());
    }

    /// Builder form of [`MemorySource::insert`]
    pub fn with(mut self, path: impl Into<PathBuf>, text: impl Into<Vec<u8>>) -> Self {
        self.insert(path, text);
        self
    }
}

impl TemplateSource for MemorySource {
    fn load(&self, path: &Path) -> Result<Vec<u8>> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| MustacheError::TemplateNotFound(path.to_path_buf()))
    }
}

/// A source with no templates; every partial is unresolved
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSource;

impl TemplateSource for NoSource {
    fn load(&self, path: &Path) -> Result<Vec<u8>> {
        Err(MustacheError::TemplateNotFound(path.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_partial() {
        assert_eq!(
            resolve_partial(Some(Path::new("views/post/show.mustache")), "meta", "mustache"),
            PathBuf::from("views/post/meta.mustache")
        );
        assert_eq!(
            resolve_partial(Some(Path::new("index.mustache")), "header", "mustache"),
            PathBuf::from("header.mustache")
        );
        assert_eq!(
            resolve_partial(None, "footer", "html"),
            PathBuf::from("footer.html")
        );
        assert_eq!(resolve_partial(None, "raw", ""), PathBuf::from("raw"));
    }

    #[test]
    fn test_memory_source() {
        let source = MemorySource::new().with("a.mustache", "hello");
        assert_eq!(
            load_text(&source, Path::new("a.mustache")).unwrap(),
            "hello"
        );
        assert!(matches!(
            source.load(Path::new("b.mustache")),
            Err(MustacheError::TemplateNotFound(_))
        ));
    }

    #[test]
    fn test_invalid_utf8() {
        let source = MemorySource::new().with("bad.mustache", vec![0xff, 0xfe]);
        assert!(matches!(
            load_text(&source, Path::new("bad.mustache")),
            Err(MustacheError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn test_fs_source() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("partials")).unwrap();
        fs::write(dir.path().join("partials/nav.mustache"), "<nav/>").unwrap();

        let source = FsSource::new(dir.path());
        assert_eq!(
            load_text(&source, Path::new("partials/nav.mustache")).unwrap(),
            "<nav/>"
        );
        assert!(matches!(
            source.load(Path::new("missing.mustache")),
            Err(MustacheError::TemplateNotFound(_))
        ));
    }

    #[test]
    fn test_no_source() {
        assert!(NoSource.load(Path::new("x")).is_err());
    }
}
