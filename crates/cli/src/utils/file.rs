use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;

fn is_stdin(path: Option<&Path>) -> bool {
    path.is_none_or(|p| p.as_os_str() == "-")
}

/// Human-readable name of where a block comes from
pub fn source_name(path: Option<&Path>) -> String {
    match path {
        Some(p) if !is_stdin(Some(p)) => p.display().to_string(),
        _ => "<stdin>".to_string(),
    }
}

/// Read a command block from a file, or from stdin for `None` / `-`.
pub fn read_block(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) if !is_stdin(Some(p)) => std::fs::read_to_string(p)
            .with_context(|| format!("Failed to read {}", p.display())),
        _ => {
            let mut block = String::new();
            std::io::stdin()
                .read_to_string(&mut block)
                .context("Failed to read command block from stdin")?;
            Ok(block)
        }
    }
}
