use std::ffi::OsStr;
use std::io::{self, Read, Write};
use std::process::{Child, Command, ExitStatus, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::debug;

use super::{Capture, Invocation, ProcessOptions, RawOutput};

#[cfg(windows)]
const DEFAULT_SHELL: (&str, &str) = ("cmd", "/C");
#[cfg(not(windows))]
const DEFAULT_SHELL: (&str, &str) = ("/bin/sh", "-c");

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Starts one process and waits for it to exit
pub trait Launcher: Send + Sync {
    fn launch(
        &self,
        invocation: &Invocation,
        options: &ProcessOptions,
        capture: Capture,
    ) -> io::Result<RawOutput>;
}

/// Launcher backed by `std::process::Command`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLauncher;

impl SystemLauncher {
    fn build_command(invocation: &Invocation, options: &ProcessOptions) -> io::Result<Command> {
        let mut cmd = match invocation {
            Invocation::Argv(argv) => {
                let (first, rest) = argv.split_first().ok_or_else(|| {
                    io::Error::new(io::ErrorKind::InvalidInput, "No command specified")
                })?;
                let program = options
                    .executable
                    .as_deref()
                    .map(|p| p.as_os_str())
                    .unwrap_or_else(|| OsStr::new(first));
                let mut cmd = Command::new(program);
                #[cfg(unix)]
                {
                    use std::os::unix::process::CommandExt;
                    if options.executable.is_some() {
                        cmd.arg0(first);
                    }
                }
                cmd.args(rest);
                cmd
            }
            Invocation::Shell(script) => {
                let (shell, flag) = DEFAULT_SHELL;
                let program = options
                    .executable
                    .as_deref()
                    .map(|p| p.as_os_str())
                    .unwrap_or_else(|| OsStr::new(shell));
                let mut cmd = Command::new(program);
                cmd.arg(flag).arg(script);
                cmd
            }
        };

        // Set working directory if specified
        if let Some(ref dir) = options.cwd {
            cmd.current_dir(dir);
        }

        if options.env_clear {
            cmd.env_clear();
        }
        for (key, value) in &options.env {
            debug!("Setting env: {}={}", key, value);
            cmd.env(key, value);
        }

        Ok(cmd)
    }
}

impl Launcher for SystemLauncher {
    fn launch(
        &self,
        invocation: &Invocation,
        options: &ProcessOptions,
        capture: Capture,
    ) -> io::Result<RawOutput> {
        let mut cmd = Self::build_command(invocation, options)?;
        cmd.stdout(if capture.stdout { Stdio::piped() } else { Stdio::inherit() });
        cmd.stderr(if capture.stderr { Stdio::piped() } else { Stdio::inherit() });
        if options.stdin.is_some() {
            cmd.stdin(Stdio::piped());
        }

        debug!("Spawning: {}", invocation);
        let mut child = cmd.spawn()?;

        // Feed stdin from a separate thread so a chatty child cannot block on a full pipe
        let writer = match (child.stdin.take(), options.stdin.clone()) {
            (Some(mut pipe), Some(input)) => {
                Some(thread::spawn(move || pipe.write_all(input.as_bytes())))
            }
            _ => None,
        };

        let output = match options.timeout {
            Some(timeout) => wait_with_deadline(child, timeout)?,
            None => child.wait_with_output()?,
        };
        if let Some(writer) = writer {
            match writer.join() {
                Ok(Err(e)) if e.kind() != io::ErrorKind::BrokenPipe => return Err(e),
                _ => {}
            }
        }

        Ok(RawOutput {
            code: exit_code(output.status),
            stdout: capture.stdout.then_some(output.stdout),
            stderr: capture.stderr.then_some(output.stderr),
        })
    }
}

/// Like `wait_with_output`, but kills the child once `timeout` has passed.
///
/// Fails with `ErrorKind::TimedOut` when the child had to be killed.
fn wait_with_deadline(mut child: Child, timeout: Duration) -> io::Result<Output> {
    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);
    let deadline = Instant::now() + timeout;

    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if Instant::now() >= deadline {
            debug!("Killing child {} after {:?}", child.id(), timeout);
            child.kill()?;
            child.wait()?;
            // Readers are left detached; a grandchild may still hold the pipes
            return Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("timed out after {timeout:?}"),
            ));
        }
        thread::sleep(POLL_INTERVAL);
    };

    Ok(Output {
        status,
        stdout: collect(stdout)?,
        stderr: collect(stderr)?,
    })
}

fn drain(mut pipe: impl Read + Send + 'static) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

fn collect(reader: Option<JoinHandle<io::Result<Vec<u8>>>>) -> io::Result<Vec<u8>> {
    match reader {
        Some(handle) => handle
            .join()
            .unwrap_or_else(|_| Err(io::Error::other("output reader panicked"))),
        None => Ok(Vec::new()),
    }
}

/// Exit code, or the negated signal number for a process killed by a signal
#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .or_else(|| status.signal().map(|signal| -signal))
        .unwrap_or(-1)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn argv(words: &[&str]) -> Invocation {
        Invocation::Argv(words.iter().map(|w| w.to_string()).collect())
    }

    #[test]
    fn test_status_without_capture() {
        let out = SystemLauncher
            .launch(&argv(&["true"]), &ProcessOptions::new(), Capture::NONE)
            .unwrap();
        assert_eq!(out.code, 0);
        assert!(out.stdout.is_none());

        let out = SystemLauncher
            .launch(&argv(&["false"]), &ProcessOptions::new(), Capture::NONE)
            .unwrap();
        assert_eq!(out.code, 1);
    }

    #[test]
    fn test_capture_stdout() {
        let out = SystemLauncher
            .launch(&argv(&["echo", "a b"]), &ProcessOptions::new(), Capture::STDOUT)
            .unwrap();
        assert_eq!(out.stdout.as_deref(), Some(&b"a b\n"[..]));
        assert!(out.stderr.is_none());
    }

    #[test]
    fn test_shell_invocation() {
        let shell = Invocation::Shell("echo $((1 + 2))".to_string());
        let out = SystemLauncher
            .launch(&shell, &ProcessOptions::new(), Capture::ALL)
            .unwrap();
        assert_eq!(out.stdout.as_deref(), Some(&b"3\n"[..]));
    }

    #[test]
    fn test_env_cwd_and_stdin() {
        let dir = tempfile::tempdir().unwrap();
        let options = ProcessOptions::new()
            .with_cwd(dir.path())
            .with_env("RUNS_TEST_VALUE", "42")
            .with_stdin("from stdin");

        let out = SystemLauncher
            .launch(
                &Invocation::Shell("echo $RUNS_TEST_VALUE; pwd; cat".to_string()),
                &options,
                Capture::STDOUT,
            )
            .unwrap();
        let text = String::from_utf8(out.stdout.unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "42");
        assert_eq!(
            std::path::Path::new(lines[1]).canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );
        assert_eq!(lines[2], "from stdin");
    }

    #[test]
    fn test_missing_program_is_io_error() {
        let err = SystemLauncher
            .launch(
                &argv(&["definitely-not-a-real-program-runs"]),
                &ProcessOptions::new(),
                Capture::NONE,
            )
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_timeout_kills_child() {
        let options = ProcessOptions::new().with_timeout(Duration::from_millis(200));
        let started = Instant::now();
        let err = SystemLauncher
            .launch(&argv(&["sleep", "5"]), &options, Capture::ALL)
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_timeout_not_reached_keeps_output() {
        let options = ProcessOptions::new().with_timeout(Duration::from_secs(10));
        let out = SystemLauncher
            .launch(
                &Invocation::Shell("echo out; echo err >&2; exit 3".to_string()),
                &options,
                Capture::ALL,
            )
            .unwrap();
        assert_eq!(out.code, 3);
        assert_eq!(out.stdout.as_deref(), Some(&b"out\n"[..]));
        assert_eq!(out.stderr.as_deref(), Some(&b"err\n"[..]));
    }

    #[test]
    fn test_signal_is_negative_code() {
        let out = SystemLauncher
            .launch(
                &Invocation::Shell("kill -9 $$".to_string()),
                &ProcessOptions::new(),
                Capture::NONE,
            )
            .unwrap();
        assert_eq!(out.code, -9);
    }
}
