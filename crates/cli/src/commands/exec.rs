use anyhow::{Context, Result};
use std::io::{self, Write};
use std::time::Duration;
use tracing::{debug, info};

use runs_core::{Completion, Encoding, Primitive, Runs, RunsConfig};

use crate::cli::ExecArgs;
use crate::display::formatter::{write_completion, write_plan};
use crate::utils::file::{read_block, source_name};

/// Flags only the `run` primitive accepts
#[derive(Debug, Clone, Copy, Default)]
pub struct RunFlags {
    pub capture_output: bool,
    pub check: bool,
}

pub fn exec_command(primitive: Primitive, args: &ExecArgs, flags: RunFlags) -> Result<i32> {
    let source = source_name(args.file.as_deref());
    let block = read_block(args.file.as_deref())?;
    debug!("Read {} bytes from {}", block.len(), source);

    let runs = build_runs(primitive, args, flags)?;
    debug!("Configured: {:?}", runs);

    let stdout = io::stdout();
    let stderr = io::stderr();

    if args.dry_run {
        let plan = runs
            .plan(&block)
            .with_context(|| format!("Failed to parse {source}"))?;
        let mut out = stdout.lock();
        for (line, invocation) in &plan {
            write_plan(&mut out, line, invocation)?;
        }
        return Ok(0);
    }

    info!("Running {} with {}", source, primitive);
    let mut status = 0;

    if args.iterate {
        for result in runs.iter(&block)? {
            let completion = result.with_context(|| format!("Failed to run {source}"))?;
            status = track_status(status, &completion);
            report(&completion, args.json, &mut stdout.lock(), &mut stderr.lock())?;
        }
    } else {
        let completions = runs
            .execute(&block)
            .with_context(|| format!("Failed to run {source}"))?;
        if args.json {
            let mut out = stdout.lock();
            serde_json::to_writer_pretty(&mut out, &completions)?;
            writeln!(out)?;
        }
        for completion in &completions {
            status = track_status(status, completion);
            if !args.json {
                write_completion(&mut stdout.lock(), &mut stderr.lock(), completion)?;
            }
        }
    }

    Ok(exit_status(status))
}

/// Layer config file settings, then command-line flags, onto a fresh runner.
pub fn build_runs(primitive: Primitive, args: &ExecArgs, flags: RunFlags) -> Result<Runs> {
    let mut runs = Runs::new(primitive);

    if !args.no_config {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;
        let config = RunsConfig::discover(&cwd)?;
        runs = config.apply(runs)?;
    }

    if let Some(prefix) = &args.echo {
        runs = runs.echo(prefix.as_str());
    }
    if args.keep_going {
        runs = runs.on_exception(true);
    } else if let Some(prefix) = &args.on_exception {
        runs = runs.on_exception(prefix.as_str());
    }
    if let Some(encoding) = &args.encoding {
        runs = runs.encoding(encoding.parse::<Encoding>()?);
    }

    let mut options = runs.process_options().clone();
    options.shell |= args.shell;
    if let Some(cwd) = &args.cwd {
        options.cwd = Some(cwd.clone());
    }
    options.env.extend(args.env.iter().cloned());
    if let Some(seconds) = args.timeout {
        let timeout = Duration::try_from_secs_f64(seconds)
            .with_context(|| format!("Invalid timeout: {seconds}"))?;
        options.timeout = Some(timeout);
    }
    options.capture_output |= flags.capture_output;
    options.check |= flags.check;

    Ok(runs.options(options))
}

fn report(
    completion: &Completion,
    json: bool,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<()> {
    if json {
        serde_json::to_writer(&mut *out, completion)?;
        writeln!(out)?;
    } else {
        write_completion(out, err, completion)?;
    }
    out.flush()?;
    Ok(())
}

/// Remember the most recent nonzero status
fn track_status(status: i32, completion: &Completion) -> i32 {
    match completion.code() {
        Some(code) if code != 0 => code,
        _ => status,
    }
}

/// Map a child status onto something `process::exit` reports faithfully
fn exit_status(code: i32) -> i32 {
    if code < 0 { 128 - code } else { code }
}
