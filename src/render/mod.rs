//! Render module - values, scopes and the tree-walking renderer

mod collector;
mod context;
mod host;
mod renderer;
mod value;

pub use collector::{html_escape, Encoder, HtmlEncoder, OutputCollector, RawEncoder};
pub use context::Context;
pub use host::{Deadline, DefaultHost, RenderHost};
pub use renderer::{Renderer, DEFAULT_EXTENSION, DEFAULT_MAX_PARTIAL_DEPTH};
pub use value::{Lambda, LambdaFn, Mapping, Value};
