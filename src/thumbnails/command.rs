use super::error::{ThumbnailError, ThumbnailResult};
use std::io::Read;
use std::process::{Command, Stdio};
use std::time::Duration;
use tracing::warn;
use wait_timeout::ChildExt;

const STDERR_EXCERPT_BYTES: usize = 2048;

/// Runs an external thumbnail tool to completion, killing it after `timeout`.
///
/// A non-zero exit status is an error carrying the tail of the tool's stderr.
pub(super) fn run_tool(mut cmd: Command, timeout: Option<Duration>) -> ThumbnailResult<()> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());

    let mut child = cmd
        .spawn()
        .map_err(|e| ThumbnailError::external_tool(format!("Failed to spawn {program}: {e}")))?;

    // Drain stderr on its own thread so a chatty tool cannot block on a full pipe.
    let stderr_reader = child.stderr.take().map(|mut stderr| {
        std::thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf);
            buf
        })
    });

    let status = match timeout {
        Some(limit) => match child.wait_timeout(limit) {
            Ok(Some(status)) => status,
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                // Not joined: a grandchild may still hold the pipe open.
                drop(stderr_reader);
                return Err(ThumbnailError::external_tool(format!(
                    "{program} timed out after {limit:?}"
                )));
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                drop(stderr_reader);
                return Err(ThumbnailError::external_tool(format!(
                    "Failed to wait for {program}: {e}"
                )));
            }
        },
        None => child.wait().map_err(|e| {
            ThumbnailError::external_tool(format!("Failed to wait for {program}: {e}"))
        })?,
    };

    let stderr = join_stderr(stderr_reader);
    if status.success() {
        return Ok(());
    }
    warn!(program = %program, %status, stderr = %stderr, "thumbnail tool failed");
    Err(ThumbnailError::external_tool(if stderr.is_empty() {
        format!("{program} failed with {status}")
    } else {
        format!("{program} failed with {status}: {stderr}")
    }))
}

fn join_stderr(reader: Option<std::thread::JoinHandle<Vec<u8>>>) -> String {
    let bytes = reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default();
    let text = String::from_utf8_lossy(&bytes);
    let trimmed = text.trim();
    if trimmed.len() <= STDERR_EXCERPT_BYTES {
        return trimmed.to_string();
    }
    let mut start = trimmed.len() - STDERR_EXCERPT_BYTES;
    while !trimmed.is_char_boundary(start) {
        start += 1;
    }
    trimmed[start..].to_string()
}

#[cfg(all(test, unix))]
mod tests {
    use super::super::error::ThumbnailErrorCode;
    use super::*;

    fn sh(script: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(script);
        cmd
    }

    #[test]
    fn successful_tool_is_ok() {
        run_tool(sh("exit 0"), Some(Duration::from_secs(5))).expect("tool succeeds");
    }

    #[test]
    fn failing_tool_reports_stderr() {
        let err = run_tool(sh("echo 'bad frame' >&2; exit 3"), None).expect_err("tool fails");
        assert_eq!(err.code(), ThumbnailErrorCode::ExternalTool);
        assert!(err.to_string().contains("bad frame"), "unexpected: {err}");
    }

    #[test]
    fn hung_tool_is_killed() {
        let err = run_tool(sh("exec sleep 30"), Some(Duration::from_millis(200)))
            .expect_err("tool times out");
        assert_eq!(err.code(), ThumbnailErrorCode::ExternalTool);
        assert!(err.to_string().contains("timed out after 200ms"), "unexpected: {err}");
    }

    #[test]
    fn missing_program_is_external_tool_error() {
        let err = run_tool(Command::new("/nonexistent/lk-tool"), None).expect_err("spawn fails");
        assert_eq!(err.code(), ThumbnailErrorCode::ExternalTool);
    }
}
