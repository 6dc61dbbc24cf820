//! The Mustache engine: configuration, a template source and an encoder

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{EngineConfig, EscapeMode};
use crate::error::Result;
use crate::render::{
    Context, Encoder, HtmlEncoder, Mapping, OutputCollector, RawEncoder, RenderHost, Renderer,
};
use crate::source::{self, FsSource, TemplateSource};
use crate::template::{parse_named, Template};

/// Parses and renders templates from one source
#[derive(Clone)]
pub struct Engine {
    config: EngineConfig,
    source: Arc<dyn TemplateSource>,
    encoder: Arc<dyn Encoder>,
}

impl Engine {
    /// Engine reading templates from `config.template_dir` under `base_dir`
    pub fn new<P: AsRef<Path>>(config: EngineConfig, base_dir: P) -> Self {
        let root = config.template_root(base_dir.as_ref());
        Self::with_source(config, Arc::new(FsSource::new(root)))
    }

    pub fn with_source(config: EngineConfig, source: Arc<dyn TemplateSource>) -> Self {
        let encoder: Arc<dyn Encoder> = match config.escape {
            EscapeMode::Html => Arc::new(HtmlEncoder),
            EscapeMode::None => Arc::new(RawEncoder),
        };
        Self {
            config,
            source,
            encoder,
        }
    }

    /// Replace the encoder used for name tags
    pub fn with_encoder(mut self, encoder: Arc<dyn Encoder>) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Parse template text
    pub fn parse(&self, name: &str, text: &str) -> Result<Template> {
        parse_named(name, text)
    }

    /// Load and parse a template by name (`index` or `index.mustache`)
    pub fn load(&self, name: &str) -> Result<(PathBuf, Template)> {
        let path = self.config.template_file(name);
        let text = source::load_text(self.source.as_ref(), &path)?;
        let template = parse_named(&path.to_string_lossy(), &text)?;
        Ok((path, template))
    }

    /// Render a parsed template; partials resolve from the source root
    pub fn render(&self, template: &Template, data: Mapping, host: &dyn RenderHost) -> Result<String> {
        self.render_with(template, Context::new(data), host)
    }

    /// Load and render a template; partials resolve next to it
    pub fn render_path(&self, name: &str, data: Mapping, host: &dyn RenderHost) -> Result<String> {
        let (path, template) = self.load(name)?;
        self.render_with(&template, Context::new(data).at_file(path), host)
    }

    fn render_with(
        &self,
        template: &Template,
        mut ctx: Context<'static>,
        host: &dyn RenderHost,
    ) -> Result<String> {
        let mut out = OutputCollector::with_encoder(Arc::clone(&self.encoder));
        let extra = host.values_for_context(&ctx, &out)?;
        ctx.extend(extra);

        Renderer::new(self.source.as_ref(), host)
            .extension(&self.config.extension)
            .max_partial_depth(self.config.max_partial_depth)
            .render(template, &ctx, &mut out)?;
        Ok(out.into_string())
    }
}
