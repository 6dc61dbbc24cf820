//! Tag tree
//!
//! Tags live in an arena owned by the [`Template`] and refer to each other by
//! [`TagId`]. A parsed template is immutable and can be rendered from any
//! number of threads at once.

use super::delimiters::Delimiters;
use super::pragma::Pragma;

/// Index of a tag inside its template's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TagId(pub(crate) usize);

/// What a tag does, and how its payload is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// Literal text between tags
    Plain,
    /// `{{name}}`, output through the encoder
    Name,
    /// `{{&name}}`
    Unescaped,
    /// `{{{name}}}`
    Triple,
    /// `{{!text}}`
    Comment,
    /// `{{>name}}`
    Partial,
    /// `{{%key:value}}`
    Pragma,
    /// `{{=open close=}}`
    SetDelimiters,
    /// `{{#name}}...{{/name}}`
    Section,
    /// `{{^name}}...{{/name}}`
    InvertedSection,
}

impl TagKind {
    pub fn is_group(self) -> bool {
        matches!(self, TagKind::Section | TagKind::InvertedSection)
    }

    /// Sigil written after the open delimiter, if any
    fn sigil(self) -> &'static str {
        match self {
            TagKind::Plain | TagKind::Name => "",
            TagKind::Unescaped => "&",
            TagKind::Triple => "{",
            TagKind::Comment => "!",
            TagKind::Partial => ">",
            TagKind::Pragma => "%",
            TagKind::SetDelimiters => "=",
            TagKind::Section => "#",
            TagKind::InvertedSection => "^",
        }
    }
}

/// One node of the tag tree
#[derive(Debug, Clone)]
pub struct Tag {
    kind: TagKind,
    text: String,
    source: String,
    close_source: String,
    delimiters: Delimiters,
    parent: Option<TagId>,
    children: Vec<TagId>,
    close_delimiters: Option<Delimiters>,
}

impl Tag {
    pub(crate) fn new(
        kind: TagKind,
        text: String,
        delimiters: Delimiters,
        parent: Option<TagId>,
    ) -> Self {
        let source = match kind {
            TagKind::Plain => String::new(),
            TagKind::Triple => format!("{{{}}}", text),
            TagKind::SetDelimiters => format!("={}=", text),
            _ => format!("{}{}", kind.sigil(), text),
        };
        let close_source = if kind.is_group() {
            format!("/{}", text)
        } else {
            String::new()
        };
        Self {
            kind,
            text,
            source,
            close_source,
            delimiters,
            parent,
            children: Vec::new(),
            close_delimiters: None,
        }
    }

    pub fn kind(&self) -> TagKind {
        self.kind
    }

    /// Literal text for `Plain` and `Comment`, the name for everything else
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Tag body as written between the delimiters, sigil included
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Delimiters in effect when the tag was opened
    pub fn delimiters(&self) -> &Delimiters {
        &self.delimiters
    }

    pub fn parent(&self) -> Option<TagId> {
        self.parent
    }

    pub fn children(&self) -> &[TagId] {
        &self.children
    }

    /// Delimiters in effect at the closing tag of a group
    pub fn close_delimiters(&self) -> Option<&Delimiters> {
        self.close_delimiters.as_ref()
    }

    pub(crate) fn push_child(&mut self, child: TagId) {
        self.children.push(child);
    }

    pub(crate) fn set_source(&mut self, source: String) {
        self.source = source;
    }

    pub(crate) fn close(&mut self, delimiters: Delimiters) {
        self.close_delimiters = Some(delimiters);
    }

    pub(crate) fn set_close_source(&mut self, source: String) {
        self.close_source = source;
    }
}

/// A parsed template: the root of the tag tree
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    tags: Vec<Tag>,
    root: Vec<TagId>,
    pragmas: Vec<Pragma>,
}

impl Template {
    pub(crate) fn new(name: String, tags: Vec<Tag>, root: Vec<TagId>, pragmas: Vec<Pragma>) -> Self {
        Self {
            name,
            tags,
            root,
            pragmas,
        }
    }

    /// Diagnostic name, usually the path the template was loaded from
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag(&self, id: TagId) -> &Tag {
        &self.tags[id.0]
    }

    /// Top-level tags in document order
    pub fn root(&self) -> &[TagId] {
        &self.root
    }

    /// Number of tags in the tree
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Pragmas in document order, for the host to inspect
    pub fn collected_pragmas(&self) -> &[Pragma] {
        &self.pragmas
    }

    /// Rebuild template source text from the tree
    pub fn to_source(&self) -> String {
        let mut out = String::new();
        for id in &self.root {
            self.write_source(*id, &mut out);
        }
        out
    }

    /// Rebuild the source text of a single tag, including a group's body and
    /// closing tag
    pub fn tag_source(&self, id: TagId) -> String {
        let mut out = String::new();
        self.write_source(id, &mut out);
        out
    }

    fn write_source(&self, id: TagId, out: &mut String) {
        let tag = self.tag(id);
        if tag.kind == TagKind::Plain {
            out.push_str(&tag.text);
            return;
        }

        let delims = &tag.delimiters;
        out.extend(delims.open());
        out.push_str(&tag.source);
        out.extend(delims.close());

        if tag.kind.is_group() {
            for child in &tag.children {
                self.write_source(*child, out);
            }
            let close = tag.close_delimiters.as_ref().unwrap_or(delims);
            out.extend(close.open());
            out.push_str(&tag.close_source);
            out.extend(close.close());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> Template {
        let delims = Delimiters::default();
        let mut tags = vec![
            Tag::new(TagKind::Plain, "Hi ".to_string(), delims.clone(), None),
            Tag::new(TagKind::Section, "items".to_string(), delims.clone(), None),
            Tag::new(TagKind::Triple, "body".to_string(), delims.clone(), Some(TagId(1))),
        ];
        tags[1].push_child(TagId(2));
        tags[1].close(delims);
        Template::new("test".to_string(), tags, vec![TagId(0), TagId(1)], Vec::new())
    }

    #[test]
    fn test_tree_accessors() {
        let template = template();
        assert_eq!(template.len(), 3);
        assert_eq!(template.root().len(), 2);
        let section = template.tag(TagId(1));
        assert!(section.kind().is_group());
        assert_eq!(section.children(), &[TagId(2)]);
        assert_eq!(template.tag(TagId(2)).parent(), Some(TagId(1)));
    }

    #[test]
    fn test_to_source() {
        let template = template();
        assert_eq!(template.to_source(), "Hi {{#items}}{{{body}}}{{/items}}");
        assert_eq!(template.tag_source(TagId(2)), "{{{body}}}");
    }

    #[test]
    fn test_written_source_wins() {
        let mut template = template();
        template.tags[1].set_source("# items ".to_string());
        template.tags[1].set_close_source("/ items".to_string());
        template.tags[2].set_source("{ body }".to_string());
        assert_eq!(template.tag(TagId(1)).text(), "items");
        assert_eq!(template.tag(TagId(2)).source(), "{ body }");
        assert_eq!(template.to_source(), "Hi {{# items }}{{{ body }}}{{/ items}}");
    }
}
