//! Evaluation context - a chain of variable scopes
//!
//! Each scope holds its own bindings and borrows its parent, so a child
//! never outlives the scope it was created from. Bound scopes borrow the
//! mapping they expose instead of copying it.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use super::value::{Mapping, Value};

static ABSENT: Value = Value::Absent;

/// One scope of the lookup chain
#[derive(Debug, Clone)]
pub struct Context<'a> {
    locals: Cow<'a, Mapping>,
    parent: Option<&'a Context<'a>>,
    file: Option<PathBuf>,
}

impl Context<'static> {
    /// Create a root context owning its bindings
    pub fn new(locals: Mapping) -> Self {
        Self {
            locals: Cow::Owned(locals),
            parent: None,
            file: None,
        }
    }

    pub fn empty() -> Self {
        Self::new(Mapping::new())
    }
}

impl Default for Context<'static> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'a> Context<'a> {
    /// Mark the file this scope's template was loaded from
    pub fn at_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Empty scope over `self`; lookups fall through unchanged
    pub fn child(&self) -> Context<'_> {
        Context {
            locals: Cow::Owned(Mapping::new()),
            parent: Some(self),
            file: None,
        }
    }

    /// Scope exposing the keys of `map` ahead of `self`
    pub fn bind<'b>(&'b self, map: &'b Mapping) -> Context<'b> {
        Context {
            locals: Cow::Borrowed(map),
            parent: Some(self),
            file: None,
        }
    }

    /// Scope for one list element.
    ///
    /// A map element is bound as-is; any other element is reachable as `.`.
    pub fn bind_element<'b>(&'b self, element: &'b Value) -> Context<'b> {
        match element {
            Value::Map(map) => self.bind(map),
            other => {
                let mut locals = Mapping::new();
                locals.insert(".".to_string(), other.clone());
                Context {
                    locals: Cow::Owned(locals),
                    parent: Some(self),
                    file: None,
                }
            }
        }
    }

    /// Scope for a partial loaded from `file`
    pub fn for_partial(&self, file: PathBuf) -> Context<'_> {
        Context {
            locals: Cow::Owned(Mapping::new()),
            parent: Some(self),
            file: Some(file),
        }
    }

    pub fn locals(&self) -> &Mapping {
        &self.locals
    }

    /// Bind a name in this scope
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.locals.to_mut().insert(name.into(), value.into());
    }

    /// Add bindings for names this scope does not bind yet
    pub fn extend(&mut self, values: Mapping) {
        let locals = self.locals.to_mut();
        for (name, value) in values {
            locals.entry(name).or_insert(value);
        }
    }

    /// Resolve a name, local scope first, then each ancestor.
    ///
    /// `a.b.c` resolves `a` through the chain and the rest inside the maps it
    /// finds. Missing names resolve to [`Value::Absent`].
    pub fn lookup(&self, name: &str) -> &Value {
        if name == "." {
            return self.resolve(".");
        }
        let mut segments = name.split('.');
        let Some(first) = segments.next() else {
            return &ABSENT;
        };
        let mut value = self.resolve(first);
        for segment in segments {
            value = match value.get(segment) {
                Some(next) => next,
                None => return &ABSENT,
            };
        }
        tracing::trace!("Lookup {} -> {:?}", name, value);
        value
    }

    fn resolve(&self, key: &str) -> &Value {
        let mut scope = Some(self);
        while let Some(ctx) = scope {
            if let Some(value) = ctx.locals.get(key) {
                return value;
            }
            scope = ctx.parent;
        }
        &ABSENT
    }

    /// Path of the nearest template file up the chain
    pub fn current_file(&self) -> Option<&Path> {
        let mut scope = Some(self);
        while let Some(ctx) = scope {
            if let Some(file) = ctx.file.as_deref() {
                if !file.as_os_str().is_empty() {
                    return Some(file);
                }
            }
            scope = ctx.parent;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(pairs: &[(&str, Value)]) -> Mapping {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_lookup_local() {
        let ctx = Context::new(mapping(&[("x", Value::from(1))]));
        assert_eq!(ctx.lookup("x"), &Value::Integer(1));
        assert!(ctx.lookup("y").is_absent());
    }

    #[test]
    fn test_lookup_falls_back_to_parent() {
        let parent = Context::new(mapping(&[("x", Value::from(1))]));
        let empty = Mapping::new();
        let child = parent.bind(&empty);
        assert_eq!(child.lookup("x"), &Value::Integer(1));
    }

    #[test]
    fn test_local_shadows_parent() {
        let parent = Context::new(mapping(&[("x", Value::from(1))]));
        let inner = mapping(&[("x", Value::from("inner"))]);
        let child = parent.bind(&inner);
        assert_eq!(child.lookup("x"), &Value::from("inner"));
        assert_eq!(parent.lookup("x"), &Value::Integer(1));
    }

    #[test]
    fn test_pass_through_child() {
        let parent = Context::new(mapping(&[("x", Value::from(true))]));
        let child = parent.child();
        assert!(child.locals().is_empty());
        assert_eq!(child.lookup("x"), &Value::Bool(true));
    }

    #[test]
    fn test_dotted_lookup() {
        let author = mapping(&[("name", Value::from("Ann"))]);
        let post = mapping(&[("author", Value::Map(author))]);
        let ctx = Context::new(mapping(&[("post", Value::Map(post))]));
        assert_eq!(ctx.lookup("post.author.name"), &Value::from("Ann"));
        assert!(ctx.lookup("post.author.email").is_absent());
        assert!(ctx.lookup("post.title.x").is_absent());
    }

    #[test]
    fn test_bind_element() {
        let root = Context::empty();
        let scalar = Value::from("item");
        let ctx = root.bind_element(&scalar);
        assert_eq!(ctx.lookup("."), &Value::from("item"));

        let element = Value::Map(mapping(&[("n", Value::from(2))]));
        let ctx = root.bind_element(&element);
        assert_eq!(ctx.lookup("n"), &Value::Integer(2));
    }

    #[test]
    fn test_extend_never_overrides() {
        let mut ctx = Context::new(mapping(&[("a", Value::from(1))]));
        ctx.extend(mapping(&[("a", Value::from(2)), ("b", Value::from(3))]));
        assert_eq!(ctx.lookup("a"), &Value::Integer(1));
        assert_eq!(ctx.lookup("b"), &Value::Integer(3));
    }

    #[test]
    fn test_insert_on_borrowed_scope_copies() {
        let root = Context::empty();
        let shared = mapping(&[("a", Value::from(1))]);
        let mut ctx = root.bind(&shared);
        ctx.insert("b", 2);
        assert_eq!(ctx.lookup("b"), &Value::Integer(2));
        assert_eq!(shared.len(), 1);
    }

    #[test]
    fn test_current_file() {
        let root = Context::empty().at_file("views/index.mustache");
        let section = root.child();
        assert_eq!(
            section.current_file(),
            Some(Path::new("views/index.mustache"))
        );
        let partial = section.for_partial(PathBuf::from("views/header.mustache"));
        let inner = partial.child();
        assert_eq!(inner.current_file(), Some(Path::new("views/header.mustache")));

        let empty_marker = Context::empty().at_file("");
        assert_eq!(empty_marker.current_file(), None);
    }
}
