//! Host capabilities passed to each render call

use std::time::{Duration, Instant};

use super::collector::OutputCollector;
use super::context::Context;
use super::value::Mapping;
use crate::error::Result;
use crate::template::Template;

/// Whatever embeds the engine: supplies extra values, interprets pragmas
/// and decides whether rendering may go on.
pub trait RenderHost: Send + Sync {
    /// Extra root bindings, requested once before the main pass. They never
    /// replace names the caller already bound.
    fn values_for_context(&self, _context: &Context<'_>, _output: &OutputCollector) -> Result<Mapping> {
        Ok(Mapping::new())
    }

    /// Called for the root template and again for every partial before it
    /// renders. Returning an error aborts the render.
    fn inspect_pragmas(&self, _template: &Template) -> Result<()> {
        Ok(())
    }

    /// Checked before entering each section and partial
    fn should_continue(&self) -> bool {
        true
    }
}

/// Host with no extra values and no pragma handling
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHost;

impl RenderHost for DefaultHost {}

/// Host that stops rendering once a deadline has passed
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    until: Instant,
}

impl Deadline {
    pub fn after(timeout: Duration) -> Self {
        Self {
            until: Instant::now() + timeout,
        }
    }

    pub fn at(until: Instant) -> Self {
        Self { until }
    }
}

impl RenderHost for Deadline {
    fn should_continue(&self) -> bool {
        Instant::now() < self.until
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_host() {
        let ctx = Context::empty();
        let out = OutputCollector::new();
        assert!(DefaultHost.values_for_context(&ctx, &out).unwrap().is_empty());
        assert!(DefaultHost.should_continue());
    }

    #[test]
    fn test_deadline() {
        assert!(Deadline::after(Duration::from_secs(60)).should_continue());
        assert!(!Deadline::at(Instant::now() - Duration::from_millis(1)).should_continue());
    }
}
