//! Parse every template under a directory and report problems

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::template::{parse_named, Pragma};
use crate::Workspace;

/// Outcome of checking one template
#[derive(Debug)]
pub struct CheckedTemplate {
    pub path: PathBuf,
    pub tags: usize,
    pub pragmas: Vec<Pragma>,
    pub error: Option<String>,
}

/// Check all templates with the configured extension under `dir`
pub fn check_dir(dir: &Path, extension: &str) -> Result<Vec<CheckedTemplate>> {
    let mut results = Vec::new();

    for entry in WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }

        let relative = path.strip_prefix(dir).unwrap_or(path).to_path_buf();
        let text = fs::read_to_string(path)?;
        let checked = match parse_named(&relative.to_string_lossy(), &text) {
            Ok(template) => CheckedTemplate {
                path: relative,
                tags: template.len(),
                pragmas: template.collected_pragmas().to_vec(),
                error: None,
            },
            Err(e) => CheckedTemplate {
                path: relative,
                tags: 0,
                pragmas: Vec::new(),
                error: Some(e.to_string()),
            },
        };
        tracing::debug!("Checked {:?}", checked.path);
        results.push(checked);
    }

    Ok(results)
}

/// Check templates and print a report; fails if any template is invalid
pub fn run(ws: &Workspace, path: Option<&Path>) -> Result<()> {
    let dir = match path {
        Some(path) => ws.base_dir.join(path),
        None => ws.template_dir(),
    };
    let results = check_dir(&dir, &ws.config.extension)?;

    let mut failed = 0;
    println!("Templates ({}):", results.len());
    for checked in &results {
        match &checked.error {
            Some(error) => {
                failed += 1;
                println!("  FAIL {}", error);
            }
            None => {
                println!("  ok   {} ({} tags)", checked.path.display(), checked.tags);
                for pragma in &checked.pragmas {
                    for (key, value) in pragma.entries() {
                        println!("         pragma {} = {:?}", key, value);
                    }
                }
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} templates failed to parse", failed, results.len());
    }
    Ok(())
}
