use std::io::{self, Write};

use runs_core::{Captured, Completion, Invocation};

/// Print one completion: captured output to `out`, failures to `err`.
pub fn write_completion(
    out: &mut impl Write,
    err: &mut impl Write,
    completion: &Completion,
) -> io::Result<()> {
    match completion {
        Completion::Status(code) => write_status(err, *code),
        Completion::Output(output) => write_captured(out, output),
        Completion::Completed(process) => {
            if let Some(stdout) = &process.stdout {
                write_captured(out, stdout)?;
            }
            if let Some(stderr) = &process.stderr {
                write_captured(err, stderr)?;
            }
            write_status(err, process.returncode)
        }
    }
}

fn write_status(err: &mut impl Write, code: i32) -> io::Result<()> {
    if code != 0 {
        writeln!(err, "exit status {code}")?;
    }
    Ok(())
}

fn write_captured(out: &mut impl Write, captured: &Captured) -> io::Result<()> {
    out.write_all(captured.as_bytes())
}

/// One dry-run entry: the logical line and what it would launch
pub fn write_plan(out: &mut impl Write, line: &str, invocation: &Invocation) -> io::Result<()> {
    writeln!(out, "{line}")?;
    match invocation {
        Invocation::Argv(argv) => writeln!(out, "  argv: {argv:?}"),
        Invocation::Shell(script) => writeln!(out, "  shell: {script}"),
    }
}
