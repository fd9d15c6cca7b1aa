//! Child-process supervision.
//!
//! Two shapes of run:
//!
//! - [`ProcessRunner::run_to_completion`] waits for exit and hands back the
//!   whole of stdout and stderr.
//! - [`ProcessRunner::run_until_marker`] streams the combined output line by
//!   line, and once a marker has been seen *and* the settle window has
//!   passed, kills the child. Early output does not count until the process
//!   has been up for the whole window.
//!
//! Children are spawned with `kill_on_drop`, so an aborted pipeline never
//! leaves a node running in the background.

use std::collections::VecDeque;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::{MigrationError, MigrationResult};

/// Lines of output kept for error reports.
const TAIL_LINES: usize = 40;

/// How long to keep reading after the process has exited.
const DRAIN_TIMEOUT: Duration = Duration::from_millis(500);

/// Captured result of a process that ran to completion.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, `None` when killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// What to look for while a process boots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BootWatch {
    /// Substring that marks the process as ready.
    pub marker: String,
    /// Minimum run time before the marker is honored.
    pub settle: Duration,
    /// Give up after this long.
    pub timeout: Duration,
}

/// How a watched run ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BootOutcome {
    /// Marker seen, settle window passed, process killed by us.
    Ready { elapsed: Duration },
    /// The process exited on its own before becoming ready.
    Exited { code: Option<i32>, tail: String },
    /// Neither happened before the timeout; the process was killed.
    TimedOut { tail: String },
}

/// Runs one executable.
#[derive(Clone, Debug)]
pub struct ProcessRunner {
    program: PathBuf,
}

impl ProcessRunner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn spawn_error(&self, source: std::io::Error) -> MigrationError {
        MigrationError::Spawn {
            program: self.program.display().to_string(),
            source,
        }
    }

    fn command(&self, args: &[OsString]) -> Command {
        let mut command = Command::new(&self.program);
        command.args(args).stdin(Stdio::null()).kill_on_drop(true);
        command
    }

    /// Runs to exit, collecting all output.
    pub async fn run_to_completion(&self, args: &[OsString]) -> MigrationResult<ProcessOutput> {
        debug!(program = %self.program.display(), ?args, "spawning");
        let output = self
            .command(args)
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        Ok(ProcessOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    /// Runs until `watch.marker` shows up on stdout or stderr and the
    /// process has been alive for `watch.settle`, then kills it.
    pub async fn run_until_marker(
        &self,
        args: &[OsString],
        watch: &BootWatch,
    ) -> MigrationResult<BootOutcome> {
        debug!(program = %self.program.display(), ?args, "spawning watched");
        let mut child = self
            .command(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let stdout = child.stdout.take().ok_or_else(|| {
            self.spawn_error(std::io::Error::other("stdout was not captured"))
        })?;
        let stderr = child.stderr.take().ok_or_else(|| {
            self.spawn_error(std::io::Error::other("stderr was not captured"))
        })?;
        let mut out_lines = LossyLines::new(stdout);
        let mut err_lines = LossyLines::new(stderr);

        let started = Instant::now();
        let settle = tokio::time::sleep_until(started + watch.settle);
        let deadline = tokio::time::sleep_until(started + watch.timeout);
        tokio::pin!(settle, deadline);

        let mut tail: VecDeque<String> = VecDeque::with_capacity(TAIL_LINES);
        let mut seen = false;
        let mut settled = watch.settle.is_zero();

        loop {
            let line = tokio::select! {
                line = out_lines.next_line(), if out_lines.open => {
                    out_lines.settle(line, "stdout")
                }
                line = err_lines.next_line(), if err_lines.open => {
                    err_lines.settle(line, "stderr")
                }
                status = child.wait() => {
                    let status = status.map_err(|e| self.spawn_error(e))?;
                    // Whatever is still buffered usually says why.
                    drain(&mut out_lines, &mut tail).await;
                    drain(&mut err_lines, &mut tail).await;
                    info!(code = ?status.code(), "process exited before becoming ready");
                    return Ok(BootOutcome::Exited {
                        code: status.code(),
                        tail: join(&tail),
                    });
                }
                _ = &mut settle, if !settled => {
                    settled = true;
                    None
                }
                _ = &mut deadline => {
                    warn!(timeout = ?watch.timeout, seen, "boot timed out");
                    self.terminate(&mut child).await?;
                    return Ok(BootOutcome::TimedOut { tail: join(&tail) });
                }
            };

            if let Some(line) = line {
                if !seen && line.contains(&watch.marker) {
                    debug!(elapsed = ?started.elapsed(), "readiness marker seen");
                    seen = true;
                }
                push_line(&mut tail, line);
            }

            if seen && settled {
                let elapsed = started.elapsed();
                self.terminate(&mut child).await?;
                info!(?elapsed, "process ready, terminated");
                return Ok(BootOutcome::Ready { elapsed });
            }
        }
    }

    async fn terminate(&self, child: &mut Child) -> MigrationResult<()> {
        child.kill().await.map_err(|e| self.spawn_error(e))
    }
}

fn push_line(tail: &mut VecDeque<String>, line: String) {
    if tail.len() == TAIL_LINES {
        tail.pop_front();
    }
    tail.push_back(line);
}

/// Line reader over a child pipe that never gives up on bad bytes.
///
/// Node logs are not guaranteed UTF-8. Each line is decoded lossily, so a
/// stray byte costs one garbled line instead of the rest of the stream.
/// Only EOF or an I/O error closes it.
struct LossyLines<R> {
    reader: BufReader<R>,
    buf: Vec<u8>,
    open: bool,
}

impl<R: AsyncRead + Unpin> LossyLines<R> {
    fn new(inner: R) -> Self {
        Self {
            reader: BufReader::new(inner),
            buf: Vec::new(),
            open: true,
        }
    }

    /// Next line without its terminator, `None` at EOF.
    ///
    /// Cancel safe: bytes of an interrupted read stay in `buf` and the
    /// next call completes the line.
    async fn next_line(&mut self) -> std::io::Result<Option<String>> {
        let n = self.reader.read_until(b'\n', &mut self.buf).await?;
        if n == 0 && self.buf.is_empty() {
            return Ok(None);
        }
        let line = decode_line(&self.buf);
        self.buf.clear();
        Ok(Some(line))
    }

    /// Folds a read result into the stream state.
    fn settle(
        &mut self,
        read: std::io::Result<Option<String>>,
        stream: &str,
    ) -> Option<String> {
        match read {
            Ok(Some(line)) => Some(line),
            Ok(None) => {
                self.open = false;
                None
            }
            Err(e) => {
                warn!(error = %e, stream, "pipe unreadable");
                self.open = false;
                None
            }
        }
    }
}

fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

/// Reads what is left of a stream after exit. Bounded, because a
/// grandchild may still hold the pipe open.
async fn drain<R>(lines: &mut LossyLines<R>, tail: &mut VecDeque<String>)
where
    R: AsyncRead + Unpin,
{
    if !lines.open {
        return;
    }
    let _ = tokio::time::timeout(DRAIN_TIMEOUT, async {
        while let Ok(Some(line)) = lines.next_line().await {
            push_line(tail, line);
        }
    })
    .await;
}

fn join(tail: &VecDeque<String>) -> String {
    tail.iter().map(String::as_str).collect::<Vec<_>>().join("\n")
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> (ProcessRunner, Vec<OsString>) {
        (
            ProcessRunner::new("/bin/sh"),
            vec![OsString::from("-c"), OsString::from(script)],
        )
    }

    fn watch(settle_ms: u64, timeout_ms: u64) -> BootWatch {
        BootWatch {
            marker: "This node is a validator".to_string(),
            settle: Duration::from_millis(settle_ms),
            timeout: Duration::from_millis(timeout_ms),
        }
    }

    #[tokio::test]
    async fn collects_output_and_exit_code() {
        let (runner, args) = sh("echo out; echo err >&2; exit 3");
        let output = runner.run_to_completion(&args).await.unwrap();
        assert_eq!(output.code, Some(3));
        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr, "err\n");
        assert!(!output.success());
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let runner = ProcessRunner::new("/nonexistent/starnamed");
        let err = runner.run_to_completion(&[]).await.unwrap_err();
        assert!(matches!(err, MigrationError::Spawn { .. }));
    }

    #[tokio::test]
    async fn marker_is_honored_after_settle_window() {
        let (runner, args) = sh("echo 'I[...] This node is a validator' >&2; sleep 30");
        let outcome = runner.run_until_marker(&args, &watch(300, 10_000)).await.unwrap();
        match outcome {
            BootOutcome::Ready { elapsed } => {
                assert!(elapsed >= Duration::from_millis(300));
                assert!(elapsed < Duration::from_secs(10));
            }
            other => panic!("expected ready, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn early_exit_is_reported() {
        let (runner, args) = sh("echo starting; echo 'panic: bad genesis' >&2; exit 1");
        let outcome = runner.run_until_marker(&args, &watch(0, 10_000)).await.unwrap();
        match outcome {
            BootOutcome::Exited { code, tail } => {
                assert_eq!(code, Some(1));
                assert!(tail.contains("panic: bad genesis"));
            }
            other => panic!("expected exit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn marker_then_exit_within_settle_is_not_ready() {
        let (runner, args) = sh("echo 'This node is a validator'; exit 0");
        let outcome = runner.run_until_marker(&args, &watch(5_000, 10_000)).await.unwrap();
        assert!(matches!(outcome, BootOutcome::Exited { code: Some(0), .. }));
    }

    #[tokio::test]
    async fn invalid_utf8_does_not_hide_the_marker() {
        let (runner, args) =
            sh("printf 'I[..] \\377 weird byte\\n'; echo 'This node is a validator'; sleep 30");
        let outcome = runner.run_until_marker(&args, &watch(0, 5_000)).await.unwrap();
        assert!(matches!(outcome, BootOutcome::Ready { .. }), "{outcome:?}");
    }

    #[test]
    fn lines_decode_lossily() {
        assert_eq!(decode_line(b"plain\r\n"), "plain");
        assert_eq!(decode_line(b"bad \xff byte\n"), "bad \u{fffd} byte");
        assert_eq!(decode_line(b"no newline"), "no newline");
    }

    #[tokio::test]
    async fn silence_times_out() {
        let (runner, args) = sh("echo booting; sleep 30");
        let outcome = runner.run_until_marker(&args, &watch(0, 300)).await.unwrap();
        match outcome {
            BootOutcome::TimedOut { tail } => assert_eq!(tail, "booting"),
            other => panic!("expected timeout, got {other:?}"),
        }
    }
}
