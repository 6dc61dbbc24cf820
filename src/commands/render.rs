//! Render a template to stdout or a file

use anyhow::Result;
use notify::{RecursiveMode, Watcher};
use notify_debouncer_mini::new_debouncer;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::render::DefaultHost;
use crate::Workspace;

/// Options of one render run
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Template name, relative to the template directory
    pub template: String,
    /// Data file, relative to the base directory
    pub data: Option<PathBuf>,
    /// Output file; stdout when absent
    pub output: Option<PathBuf>,
}

/// Render once
pub fn run(ws: &Workspace, options: &RenderOptions) -> Result<()> {
    let start = Instant::now();

    let data = ws.load_data(options.data.as_deref())?;
    let text = ws
        .engine
        .render_path(&options.template, data, &DefaultHost)?;

    match &options.output {
        Some(path) => {
            let dest = ws.base_dir.join(path);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&dest, &text)?;
            tracing::info!("Wrote {:?}", dest);
        }
        None => print!("{}", text),
    }

    let duration = start.elapsed();
    tracing::info!(
        "Rendered {} in {:.2}ms",
        options.template,
        duration.as_secs_f64() * 1000.0
    );
    Ok(())
}

/// Re-render whenever templates or the data file change
pub fn watch(ws: &Workspace, options: &RenderOptions) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();
    let mut debouncer = new_debouncer(Duration::from_millis(300), tx)?;

    let template_dir = ws.template_dir();
    debouncer
        .watcher()
        .watch(&template_dir, RecursiveMode::Recursive)?;
    tracing::debug!("Watching: {:?}", template_dir);

    if let Some(data) = data_file(ws, options) {
        if data.exists() {
            debouncer
                .watcher()
                .watch(&data, RecursiveMode::NonRecursive)?;
            tracing::debug!("Watching: {:?}", data);
        }
    }

    let output = options.output.as_ref().map(|p| ws.base_dir.join(p));
    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let changed: Vec<_> = events
                    .iter()
                    .filter(|e| is_relevant(&e.path, output.as_deref()))
                    .collect();
                if changed.is_empty() {
                    continue;
                }
                for event in &changed {
                    tracing::info!("File changed: {}", event.path.display());
                }
                if let Err(e) = run(ws, options) {
                    tracing::error!("Render failed: {}", e);
                }
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Data file the render reads, if any
fn data_file(ws: &Workspace, options: &RenderOptions) -> Option<PathBuf> {
    options
        .data
        .clone()
        .or_else(|| ws.config.data.as_ref().map(PathBuf::from))
        .map(|p| ws.base_dir.join(p))
}

/// Skip editor droppings, VCS files and our own output
fn is_relevant(path: &Path, output: Option<&Path>) -> bool {
    let path_str = path.to_string_lossy();
    if path_str.contains(".git") || path_str.contains(".DS_Store") || path_str.ends_with('~') {
        return false;
    }
    match output {
        Some(output) => !path.ends_with(output) && path != output,
        None => true,
    }
}
