//! mustache-rs: a Mustache template engine
//!
//! Templates are parsed once into an immutable tag tree and rendered against
//! a chain of variable scopes. Partials are loaded through a
//! [`source::TemplateSource`] at render time, relative to the template that
//! includes them.
//!
//! ```
//! use mustache_rs::{parse, Context};
//!
//! let template = parse("Hello {{name}}!").unwrap();
//! let mut ctx = Context::empty();
//! ctx.insert("name", "<World>");
//! assert_eq!(template.render_to_string(&ctx).unwrap(), "Hello &lt;World&gt;!");
//! ```

pub mod commands;
pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod render;
pub mod server;
pub mod source;
pub mod template;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{MustacheError, Result};
pub use render::{Context, DefaultHost, Mapping, OutputCollector, RenderHost, Renderer, Value};
pub use template::{parse, parse_named, Pragma, Template};

use std::path::Path;

/// Working directory, configuration and engine for the CLI
#[derive(Clone)]
pub struct Workspace {
    /// Base directory
    pub base_dir: std::path::PathBuf,
    /// Engine configuration
    pub config: EngineConfig,
    /// Engine reading from the configured template directory
    pub engine: Engine,
}

impl Workspace {
    /// Open a workspace, reading `_mustache.yml` unless `config_path` is given
    pub fn new<P: AsRef<Path>>(base_dir: P, config_path: Option<&Path>) -> anyhow::Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config = match config_path {
            Some(path) => EngineConfig::load(path)?,
            None => EngineConfig::load_or_default(&base_dir)?,
        };
        let engine = Engine::new(config.clone(), &base_dir);

        Ok(Self {
            base_dir,
            config,
            engine,
        })
    }

    /// Template directory on disk
    pub fn template_dir(&self) -> std::path::PathBuf {
        self.config.template_root(&self.base_dir)
    }

    /// Load render data from `path`, or from the configured default data file
    pub fn load_data(&self, path: Option<&Path>) -> anyhow::Result<Mapping> {
        match path {
            Some(path) => data::load_data(self.base_dir.join(path)),
            None => match &self.config.data {
                Some(path) => data::load_data(self.base_dir.join(path)),
                None => Ok(Mapping::new()),
            },
        }
    }
}
