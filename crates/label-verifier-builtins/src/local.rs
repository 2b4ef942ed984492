// crates/label-verifier-builtins/src/local.rs
// ============================================================================
// Module: Local Verification Channel
// Description: Channel that executes checks on the local machine.
// Purpose: Back CLI admissions and tests with a real process-level channel.
// Dependencies: label-verifier-core, std::process
// ============================================================================

//! ## Overview
//! [`LocalChannel`] runs scripts through the platform shell (`sh -c` or
//! `cmd /C`), streams their output to the attempt's diagnostic sink line by
//! line, and kills the script's whole process group when the attempt is
//! cancelled, without waiting for its output pipes to close. Path probes read
//! local filesystem metadata; env probes read the process environment or a
//! deterministic override map.
//! Invariants:
//! - Captured output is bounded by [`MAX_CAPTURED_OUTPUT_BYTES`] per stream
//!   and no single read buffers more than [`MAX_LINE_BYTES`].
//! - A cancelled check never reports an exit code.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;
use std::path::Path;
use std::process::Child;
use std::process::Command;
use std::process::ExitStatus;
use std::process::Stdio;
use std::sync::mpsc;
use std::sync::mpsc::Receiver;
use std::sync::mpsc::RecvTimeoutError;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use label_verifier_core::CancellationToken;
use label_verifier_core::ChannelError;
use label_verifier_core::CheckOutput;
use label_verifier_core::DiagnosticSink;
use label_verifier_core::PathProbe;
use label_verifier_core::ProcessOutput;
use label_verifier_core::RemoteCheck;
use label_verifier_core::RemotePath;
use label_verifier_core::VerificationChannel;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum bytes of script output kept per stream.
pub const MAX_CAPTURED_OUTPUT_BYTES: usize = 1024 * 1024;

/// Maximum bytes read as one line before it is split.
pub const MAX_LINE_BYTES: u64 = 64 * 1024;

/// Default interval between child status polls.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for [`LocalChannel`].
///
/// # Invariants
/// - `env_overrides`, when present, replace process environment reads for
///   env probes and are added to every script's environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalChannelConfig {
    /// Optional override map used for deterministic env lookups.
    pub env_overrides: Option<BTreeMap<String, String>>,
    /// Interval between child status polls.
    pub poll_interval: Duration,
}

impl Default for LocalChannelConfig {
    fn default() -> Self {
        Self {
            env_overrides: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

// ============================================================================
// SECTION: Output Capture
// ============================================================================

/// Pipe a script line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputStream {
    /// Standard output.
    Stdout,
    /// Standard error.
    Stderr,
}

/// One line read from a script pipe.
#[derive(Debug)]
struct OutputLine {
    /// Source pipe.
    stream: OutputStream,
    /// Line text without its terminator.
    text: String,
}

/// Bounded capture of one output stream.
///
/// # Invariants
/// - `text` never exceeds [`MAX_CAPTURED_OUTPUT_BYTES`].
/// - Once a line overflows the bound, later lines are dropped too, so the
///   capture is always a prefix of the stream.
#[derive(Debug, Default)]
struct CapturedOutput {
    /// Captured text, newline-terminated lines.
    text: String,
    /// Set after the first line that did not fit.
    truncated: bool,
}

impl CapturedOutput {
    /// Appends `line` unless the capture is full.
    fn push(&mut self, line: &str) {
        if self.truncated {
            return;
        }
        if self.text.len() + line.len() + 1 > MAX_CAPTURED_OUTPUT_BYTES {
            self.truncated = true;
            return;
        }
        self.text.push_str(line);
        self.text.push('\n');
    }
}

// ============================================================================
// SECTION: Channel
// ============================================================================

/// Channel that runs checks on this machine.
#[derive(Debug, Clone, Default)]
pub struct LocalChannel {
    /// Channel configuration.
    config: LocalChannelConfig,
}

impl LocalChannel {
    /// Creates a channel with the given configuration.
    #[must_use]
    pub const fn new(config: LocalChannelConfig) -> Self {
        Self {
            config,
        }
    }

    /// Runs `script` and collects its output.
    fn run_script(
        &self,
        script: &str,
        working_dir: Option<&RemotePath>,
        observer: &dyn DiagnosticSink,
        cancellation: &CancellationToken,
    ) -> Result<CheckOutput, ChannelError> {
        if cancellation.is_cancelled() {
            return Err(ChannelError::Cancelled);
        }
        let mut command = shell_command(script);
        if let Some(dir) = working_dir {
            command.current_dir(dir.as_str());
        }
        if let Some(overrides) = &self.config.env_overrides {
            command.envs(overrides);
        }
        command.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());
        let mut child = command
            .spawn()
            .map_err(|err| ChannelError::Io(format!("failed to start shell: {err}")))?;
        let receiver = match start_readers(&mut child) {
            Ok(receiver) => receiver,
            Err(err) => {
                terminate(&mut child)?;
                return Err(err);
            }
        };

        let mut stdout = CapturedOutput::default();
        let mut stderr = CapturedOutput::default();
        let mut status: Option<ExitStatus> = None;
        let mut streams_open = true;
        loop {
            if cancellation.is_cancelled() {
                terminate(&mut child)?;
                return Err(ChannelError::Cancelled);
            }
            if status.is_none() {
                status = child
                    .try_wait()
                    .map_err(|err| ChannelError::Io(format!("failed to wait for script: {err}")))?;
            }
            if !streams_open {
                if let Some(status) = status {
                    return Ok(CheckOutput::Process(ProcessOutput {
                        exit_code: status.code(),
                        stdout: stdout.text,
                        stderr: stderr.text,
                    }));
                }
                thread::sleep(self.config.poll_interval);
                continue;
            }
            match receiver.recv_timeout(self.config.poll_interval) {
                Ok(line) => {
                    observer.write_line(&line.text);
                    match line.stream {
                        OutputStream::Stdout => stdout.push(&line.text),
                        OutputStream::Stderr => stderr.push(&line.text),
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => streams_open = false,
            }
        }
    }

    /// Looks up an environment variable.
    fn lookup_env(&self, name: &str) -> Option<String> {
        match &self.config.env_overrides {
            Some(overrides) => overrides.get(name).cloned(),
            None => std::env::var(name).ok(),
        }
    }
}

impl VerificationChannel for LocalChannel {
    fn run_remote_check(
        &self,
        check: &RemoteCheck,
        observer: &dyn DiagnosticSink,
        cancellation: &CancellationToken,
    ) -> Result<CheckOutput, ChannelError> {
        match check {
            RemoteCheck::Script {
                script,
                working_dir,
            } => self.run_script(script, working_dir.as_ref(), observer, cancellation),
            RemoteCheck::PathExists {
                path,
            } => Ok(CheckOutput::Path {
                probe: probe_path(Path::new(path.as_str()))?,
            }),
            RemoteCheck::EnvVar {
                name,
            } => Ok(CheckOutput::Env {
                value: self.lookup_env(name),
            }),
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds the platform shell invocation for `script`.
#[cfg(windows)]
fn shell_command(script: &str) -> Command {
    let mut command = Command::new("cmd");
    command.arg("/C").arg(script);
    command
}

/// Builds the platform shell invocation for `script`.
///
/// On Unix the shell leads a new process group so cancellation can reach
/// every process the script starts.
#[cfg(not(windows))]
fn shell_command(script: &str) -> Command {
    let mut command = Command::new("sh");
    command.arg("-c").arg(script);
    #[cfg(unix)]
    std::os::unix::process::CommandExt::process_group(&mut command, 0);
    command
}

/// Kills the script and everything it started, then reaps the script.
fn terminate(child: &mut Child) -> Result<(), ChannelError> {
    kill_process_group(child.id());
    if let Err(err) = child.kill()
        && err.kind() != io::ErrorKind::InvalidInput
    {
        return Err(ChannelError::Io(format!("failed to kill script: {err}")));
    }
    child.wait().map_err(|err| ChannelError::Io(format!("failed to reap script: {err}")))?;
    Ok(())
}

/// Sends `SIGKILL` to the process group led by `pid`.
#[cfg(unix)]
fn kill_process_group(pid: u32) {
    let _ = Command::new("kill")
        .arg("-KILL")
        .arg("--")
        .arg(format!("-{pid}"))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
}

/// Process groups are not used on this platform; the shell alone is killed.
#[cfg(not(unix))]
const fn kill_process_group(_pid: u32) {}

/// Starts one reader thread per output pipe and returns the line receiver.
///
/// The receiver disconnects once both pipes reach end of file.
fn start_readers(child: &mut Child) -> Result<Receiver<OutputLine>, ChannelError> {
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| ChannelError::Io("script stdout unavailable".to_string()))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| ChannelError::Io("script stderr unavailable".to_string()))?;
    let (sender, receiver) = mpsc::channel();
    spawn_reader("script-stdout", stdout, OutputStream::Stdout, sender.clone())?;
    spawn_reader("script-stderr", stderr, OutputStream::Stderr, sender)?;
    Ok(receiver)
}

/// Spawns a detached thread forwarding the lines of `reader` to `sender`.
fn spawn_reader(
    name: &str,
    reader: impl Read + Send + 'static,
    stream: OutputStream,
    sender: Sender<OutputLine>,
) -> Result<(), ChannelError> {
    thread::Builder::new()
        .name(name.to_string())
        .spawn(move || read_lines(reader, stream, &sender))
        .map(|_| ())
        .map_err(|err| ChannelError::Io(format!("failed to start output reader: {err}")))
}

/// Reads `reader` line by line until end of file or until the receiver is
/// gone. Lines longer than [`MAX_LINE_BYTES`] are split.
fn read_lines(reader: impl Read, stream: OutputStream, sender: &Sender<OutputLine>) {
    let mut reader = BufReader::new(reader);
    let mut buffer = Vec::new();
    loop {
        buffer.clear();
        match reader.by_ref().take(MAX_LINE_BYTES).read_until(b'\n', &mut buffer) {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                let text = String::from_utf8_lossy(&buffer);
                let line = OutputLine {
                    stream,
                    text: text.trim_end_matches(['\n', '\r']).to_string(),
                };
                if sender.send(line).is_err() {
                    break;
                }
            }
        }
    }
}

/// Classifies the filesystem entry at `path`.
fn probe_path(path: &Path) -> Result<PathProbe, ChannelError> {
    match fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => Ok(PathProbe::File),
        Ok(metadata) if metadata.is_dir() => Ok(PathProbe::Directory),
        Ok(_) => Ok(PathProbe::Other),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(PathProbe::Missing),
        Err(err) => Err(ChannelError::Io(format!("failed to inspect {}: {err}", path.display()))),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
