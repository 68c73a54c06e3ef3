use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use runs_core::Primitive;

use crate::commands::{exec_command, init_command, split_command, RunFlags};

#[derive(Parser, Debug)]
#[command(name = "runs")]
#[command(version, about = "Run a block of text as a sequence of subprocesses", long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug    Enable debug logging")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every executing subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct ExecArgs {
    /// File holding the command block (reads stdin when omitted or `-`)
    pub file: Option<PathBuf>,

    /// Echo each physical line before running it, with an optional prefix
    #[arg(
        long,
        value_name = "PREFIX",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "$"
    )]
    pub echo: Option<String>,

    /// Keep going after a failure, printing the failed line to stderr with a prefix
    #[arg(
        long,
        value_name = "PREFIX",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "!"
    )]
    pub on_exception: Option<String>,

    /// Keep going after a failure without reporting it
    #[arg(short = 'k', long, conflicts_with = "on_exception")]
    pub keep_going: bool,

    /// Run each line through the system shell
    #[arg(long)]
    pub shell: bool,

    /// Working directory for every command
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Extra environment variable for every command
    #[arg(short, long = "env", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub env: Vec<(String, String)>,

    /// Kill any command still running after this many seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<f64>,

    /// Decoding for captured output: utf8, utf8-lossy or bytes
    #[arg(long, value_name = "ENCODING")]
    pub encoding: Option<String>,

    /// Print each result as soon as its command finishes
    #[arg(short, long)]
    pub iterate: bool,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    /// Print what would be launched without running anything
    #[arg(short, long)]
    pub dry_run: bool,

    /// Ignore .runs.json files
    #[arg(long)]
    pub no_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run each line and report its exit status
    #[command(visible_alias = "c")]
    Call(ExecArgs),
    /// Run each line, stopping at the first nonzero exit
    CheckCall(ExecArgs),
    /// Run each line and print its captured standard output
    #[command(visible_alias = "o")]
    CheckOutput(ExecArgs),
    /// Run each line and report a completion record
    #[command(visible_alias = "r")]
    Run {
        #[command(flatten)]
        exec: ExecArgs,

        /// Capture stdout and stderr into the completion record
        #[arg(long)]
        capture_output: bool,

        /// Fail on nonzero exit status
        #[arg(long)]
        check: bool,
    },
    /// Print the logical lines of a block with their tokens
    Split {
        /// File holding the command block (reads stdin when omitted or `-`)
        file: Option<PathBuf>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write a default .runs.json
    Init {
        /// Directory to write the config into (defaults to current directory)
        #[arg(short, long)]
        cwd: Option<PathBuf>,

        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Commands {
    /// Execute the command and return the process exit status
    pub fn execute(self) -> Result<i32> {
        match self {
            Commands::Call(exec) => exec_command(Primitive::Call, &exec, RunFlags::default()),
            Commands::CheckCall(exec) => {
                exec_command(Primitive::CheckCall, &exec, RunFlags::default())
            }
            Commands::CheckOutput(exec) => {
                exec_command(Primitive::CheckOutput, &exec, RunFlags::default())
            }
            Commands::Run {
                exec,
                capture_output,
                check,
            } => exec_command(
                Primitive::Run,
                &exec,
                RunFlags {
                    capture_output,
                    check,
                },
            ),
            Commands::Split { file, json } => split_command(file.as_deref(), json).map(|_| 0),
            Commands::Init { cwd, force } => init_command(cwd.as_deref(), force).map(|_| 0),
        }
    }
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got `{s}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("A=b=c").unwrap(),
            ("A".to_string(), "b=c".to_string())
        );
        assert!(parse_key_value("=x").is_err());
        assert!(parse_key_value("novalue").is_err());
    }

    #[test]
    fn test_optional_prefix_flags() {
        let cli = Cli::try_parse_from(["runs", "call", "--echo", "block.txt"]).unwrap();
        match cli.command {
            Commands::Call(exec) => {
                assert_eq!(exec.echo.as_deref(), Some("$"));
                assert_eq!(exec.file, Some(PathBuf::from("block.txt")));
            }
            other => panic!("Expected Call, got {other:?}"),
        }

        let cli = Cli::try_parse_from(["runs", "check-call", "--on-exception=>>"]).unwrap();
        match cli.command {
            Commands::CheckCall(exec) => assert_eq!(exec.on_exception.as_deref(), Some(">>")),
            other => panic!("Expected CheckCall, got {other:?}"),
        }
    }

    #[test]
    fn test_run_flags() {
        let cli = Cli::try_parse_from([
            "runs",
            "run",
            "--capture-output",
            "--check",
            "-e",
            "A=1",
            "-",
        ])
        .unwrap();
        match cli.command {
            Commands::Run {
                exec,
                capture_output,
                check,
            } => {
                assert!(capture_output && check);
                assert_eq!(exec.env, vec![("A".to_string(), "1".to_string())]);
                assert_eq!(exec.file, Some(PathBuf::from("-")));
            }
            other => panic!("Expected Run, got {other:?}"),
        }
    }

    #[test]
    fn test_keep_going_conflicts_with_prefix() {
        assert!(Cli::try_parse_from(["runs", "call", "-k", "--on-exception"]).is_err());
    }
}
