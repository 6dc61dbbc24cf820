//! Renderer - walks a tag tree and writes output
//!
//! Partials are loaded and parsed each time they are referenced, relative
//! to the file of the template that includes them.

use std::path::Path;

use super::collector::OutputCollector;
use super::context::Context;
use super::host::{DefaultHost, RenderHost};
use super::value::Value;
use crate::error::{MustacheError, Result};
use crate::source::{self, NoSource, TemplateSource};
use crate::template::{parse_named, Tag, TagId, TagKind, Template};

/// Default file extension of partials
pub const DEFAULT_EXTENSION: &str = "mustache";

/// Default limit on nested partial inclusion
pub const DEFAULT_MAX_PARTIAL_DEPTH: usize = 32;

/// Renders templates against contexts
pub struct Renderer<'r> {
    source: &'r dyn TemplateSource,
    host: &'r dyn RenderHost,
    extension: &'r str,
    max_partial_depth: usize,
}

impl<'r> Renderer<'r> {
    pub fn new(source: &'r dyn TemplateSource, host: &'r dyn RenderHost) -> Self {
        Self {
            source,
            host,
            extension: DEFAULT_EXTENSION,
            max_partial_depth: DEFAULT_MAX_PARTIAL_DEPTH,
        }
    }

    /// Extension appended to partial names
    pub fn extension(mut self, extension: &'r str) -> Self {
        self.extension = extension;
        self
    }

    pub fn max_partial_depth(mut self, depth: usize) -> Self {
        self.max_partial_depth = depth;
        self
    }

    /// Render a root template into `out`
    pub fn render(&self, template: &Template, ctx: &Context<'_>, out: &mut OutputCollector) -> Result<()> {
        self.host.inspect_pragmas(template)?;
        self.render_template(template, ctx, out, 0)?;
        tracing::debug!("Rendered {} ({} bytes)", template.name(), out.len());
        Ok(())
    }

    fn render_template(
        &self,
        template: &Template,
        ctx: &Context<'_>,
        out: &mut OutputCollector,
        depth: usize,
    ) -> Result<()> {
        for id in template.root() {
            self.render_tag(template, *id, ctx, out, depth)?;
        }
        Ok(())
    }

    fn render_children(
        &self,
        template: &Template,
        tag: &Tag,
        ctx: &Context<'_>,
        out: &mut OutputCollector,
        depth: usize,
    ) -> Result<()> {
        for id in tag.children() {
            self.render_tag(template, *id, ctx, out, depth)?;
        }
        Ok(())
    }

    fn render_tag(
        &self,
        template: &Template,
        id: TagId,
        ctx: &Context<'_>,
        out: &mut OutputCollector,
        depth: usize,
    ) -> Result<()> {
        let tag = template.tag(id);
        match tag.kind() {
            TagKind::Plain => out.append_raw(tag.text()),
            TagKind::Name => {
                let text = stringify(ctx.lookup(tag.text()), ctx);
                out.append(&text);
            }
            TagKind::Unescaped | TagKind::Triple => {
                let text = stringify(ctx.lookup(tag.text()), ctx);
                out.append_raw(&text);
            }
            TagKind::Comment | TagKind::Pragma | TagKind::SetDelimiters => {}
            TagKind::Section => self.render_section(template, id, ctx, out, depth)?,
            TagKind::InvertedSection => {
                self.check_continue()?;
                if ctx.lookup(tag.text()).is_falsy_for_inverted() {
                    self.render_children(template, tag, ctx, out, depth)?;
                }
            }
            TagKind::Partial => self.render_partial(template, tag, ctx, out, depth)?,
        }
        Ok(())
    }

    fn render_section(
        &self,
        template: &Template,
        id: TagId,
        ctx: &Context<'_>,
        out: &mut OutputCollector,
        depth: usize,
    ) -> Result<()> {
        self.check_continue()?;
        let tag = template.tag(id);
        match ctx.lookup(tag.text()) {
            Value::Map(map) if !map.is_empty() => {
                let scope = ctx.bind(map);
                self.render_children(template, tag, &scope, out, depth)?;
            }
            Value::List(items) => {
                for item in items {
                    let scope = ctx.bind_element(item);
                    self.render_children(template, tag, &scope, out, depth)?;
                }
            }
            Value::Lambda(lambda) => {
                let text = template.tag_source(id);
                out.append_raw(&lambda.call(&text, ctx));
            }
            value if value.is_truthy() => {
                let scope = ctx.child();
                self.render_children(template, tag, &scope, out, depth)?;
            }
            _ => {}
        }
        Ok(())
    }

    fn render_partial(
        &self,
        template: &Template,
        tag: &Tag,
        ctx: &Context<'_>,
        out: &mut OutputCollector,
        depth: usize,
    ) -> Result<()> {
        self.check_continue()?;
        let path = source::resolve_partial(ctx.current_file(), tag.text(), self.extension);
        if depth >= self.max_partial_depth {
            return Err(MustacheError::RecursionLimit {
                limit: self.max_partial_depth,
                path,
            });
        }

        let text = match source::load_text(self.source, &path) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    "Failed to load partial {:?} included from {}: {}",
                    path,
                    template.name(),
                    e
                );
                return Ok(());
            }
        };
        let partial = parse_named(&path_name(&path), &text)?;
        self.host.inspect_pragmas(&partial)?;

        let scope = ctx.for_partial(path);
        let mut partial_out = out.fork();
        self.render_template(&partial, &scope, &mut partial_out, depth + 1)?;
        out.splice(partial_out);
        Ok(())
    }

    fn check_continue(&self) -> Result<()> {
        if self.host.should_continue() {
            Ok(())
        } else {
            Err(MustacheError::Interrupted)
        }
    }
}

/// Text for a name tag. A lambda is called with empty section text.
fn stringify(value: &Value, ctx: &Context<'_>) -> String {
    match value {
        Value::Lambda(lambda) => lambda.call("", ctx),
        other => other.to_output_string(),
    }
}

fn path_name(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

impl Template {
    /// Render without a template source; partials render as nothing
    pub fn render(&self, ctx: &Context<'_>, out: &mut OutputCollector) -> Result<()> {
        Renderer::new(&NoSource, &DefaultHost).render(self, ctx, out)
    }

    /// Render to a string with HTML escaping
    pub fn render_to_string(&self, ctx: &Context<'_>) -> Result<String> {
        let mut out = OutputCollector::new();
        self.render(ctx, &mut out)?;
        Ok(out.into_string())
    }
}
