use std::ffi::OsString;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;

use crate::application::ports::TranscriptionError;

/// Wall-clock ceiling for a single engine invocation.
pub const ENGINE_TIMEOUT: Duration = Duration::from_secs(3600);

/// Program plus any arguments that precede the engine's own arguments,
/// e.g. `python -m whisperx`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub leading_args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    pub fn with_leading_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.leading_args = args.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Spawns `command` with `args`, captures both output streams and waits at
/// most `limit` for the process to exit and both streams to close. On
/// timeout the whole process group is killed and the child reaped before
/// `TranscriptionError::Timeout` is returned, so wrappers that leave helpers
/// behind holding the pipes cannot outlive the ceiling. A non-zero exit
/// becomes `TranscriptionError::Execution` carrying stderr (stdout when
/// stderr is empty).
pub async fn run_with_timeout(
    command: &CommandSpec,
    args: &[OsString],
    limit: Duration,
) -> Result<ProcessOutput, TranscriptionError> {
    let program = command.program.clone();

    let mut cmd = Command::new(&command.program);
    cmd.args(&command.leading_args)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    // Own group, so a timeout can take down everything the engine started.
    #[cfg(unix)]
    cmd.process_group(0);

    let mut child = cmd.spawn().map_err(|source| TranscriptionError::Spawn {
        program: program.clone(),
        source,
    })?;
    let pid = child.id();

    let mut stdout = child.stdout.take().map(drain);
    let mut stderr = child.stderr.take().map(drain);

    let finished = tokio::time::timeout(limit, async {
        let status = child.wait().await;
        let stdout = collect(stdout.as_mut()).await;
        let stderr = collect(stderr.as_mut()).await;
        (status, stdout, stderr)
    })
    .await;

    let (status, stdout_text, stderr_text) = match finished {
        Ok(parts) => parts,
        Err(_) => {
            kill_process_group(pid, &program);
            if let Err(e) = child.start_kill() {
                tracing::debug!(error = %e, program = %program, "Timed out process already exited");
            }
            if let Err(e) = child.wait().await {
                tracing::warn!(error = %e, program = %program, "Failed to reap timed out process");
            }
            for handle in [stdout, stderr].into_iter().flatten() {
                handle.abort();
            }
            tracing::warn!(
                program = %program,
                limit_ms = limit.as_millis() as u64,
                "Engine process killed after timeout"
            );
            return Err(TranscriptionError::Timeout { program, limit });
        }
    };

    let output = ProcessOutput {
        status: status.map_err(|source| TranscriptionError::Spawn {
            program: program.clone(),
            source,
        })?,
        stdout: stdout_text,
        stderr: stderr_text,
    };

    if !output.status.success() {
        return Err(TranscriptionError::Execution {
            program,
            status: describe_status(&output.status),
            diagnostics: output.diagnostics(),
        });
    }

    tracing::debug!(
        program = %program,
        stdout_bytes = output.stdout.len(),
        stderr_bytes = output.stderr.len(),
        "Engine process exited"
    );

    Ok(output)
}

#[cfg(unix)]
fn kill_process_group(pid: Option<u32>, program: &str) {
    let Some(pgid) = pid.and_then(|pid| libc::pid_t::try_from(pid).ok()) else {
        return;
    };
    // SAFETY: killpg only delivers a signal; the group was created by our spawn.
    let rc = unsafe { libc::killpg(pgid, libc::SIGKILL) };
    if rc != 0 {
        tracing::debug!(
            error = %std::io::Error::last_os_error(),
            program = %program,
            "Process group already gone"
        );
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>, _program: &str) {}

impl ProcessOutput {
    pub fn diagnostics(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim().to_string()
        } else {
            stderr.to_string()
        }
    }
}

fn describe_status(status: &ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

fn drain<R>(mut reader: R) -> JoinHandle<Vec<u8>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Err(e) = reader.read_to_end(&mut buf).await {
            tracing::debug!(error = %e, "Stopped reading engine output");
        }
        buf
    })
}

async fn collect(handle: Option<&mut JoinHandle<Vec<u8>>>) -> String {
    match handle {
        Some(h) => h
            .await
            .map(|buf| String::from_utf8_lossy(&buf).into_owned())
            .unwrap_or_default(),
        None => String::new(),
    }
}
