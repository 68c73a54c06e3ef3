use anyhow::{Context, Result};
use serde_json::json;
use std::path::Path;

use runs_core::{split_lines, tokenize};

use crate::utils::file::{read_block, source_name};

pub fn split_command(file: Option<&Path>, json: bool) -> Result<()> {
    let source = source_name(file);
    let block = read_block(file)?;
    let lines = split_lines(&block).with_context(|| format!("Failed to split {source}"))?;

    if json {
        let mut entries = Vec::with_capacity(lines.len());
        for line in &lines {
            entries.push(json!({ "line": line, "tokens": tokenize(line)? }));
        }
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for (index, line) in lines.iter().enumerate() {
        let tokens = tokenize(line)?;
        println!("{:>3}: {}", index + 1, line);
        if tokens.is_empty() {
            println!("     (comment only)");
        } else {
            println!("     {:?}", tokens);
        }
    }
    Ok(())
}
