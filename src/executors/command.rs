use crate::core::errors::{ExecError, GrinderError};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::time::timeout;

const STDERR_TAIL_LINES: usize = 10;

#[derive(Debug)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub duration: Duration,
}

/// Spawns `tool` and waits for it. With a deadline the child is killed once
/// it expires and `GrinderError::Timeout` is returned. A non-zero exit status
/// is reported as `GrinderError::Exec`.
pub async fn execute(
    tool: &str,
    args: &[String],
    deadline: Option<Duration>,
) -> Result<CommandResult, GrinderError> {
    let start = Instant::now();

    tracing::debug!("Executing: {} {:?}", tool, args);

    let mut child = Command::new(tool)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| GrinderError::Spawn {
            tool: tool.to_string(),
            source,
        })?;

    let stdout_handle = child.stdout.take();
    let stderr_handle = child.stderr.take();

    // Drain both pipes while waiting so a chatty child cannot stall on a full buffer.
    let run = async {
        tokio::join!(
            read_all(stdout_handle),
            read_all(stderr_handle),
            child.wait()
        )
    };

    let (stdout, stderr, status) = match deadline {
        Some(limit) => {
            let outcome = timeout(limit, run).await;
            match outcome {
                Ok(finished) => finished,
                Err(_) => {
                    let _ = child.kill().await;
                    return Err(GrinderError::Timeout {
                        tool: tool.to_string(),
                        timeout_ms: limit.as_millis() as u64,
                    });
                }
            }
        }
        None => run.await,
    };

    let duration = start.elapsed();
    let status = status?;
    let stdout = stdout?;
    let stderr = stderr?;
    let exit_code = status.code().unwrap_or(-1);

    if !status.success() {
        return Err(GrinderError::Exec(ExecError {
            tool: tool.to_string(),
            args: args.to_vec(),
            exit_code: status.code(),
            stderr_tail: tail(&stderr, STDERR_TAIL_LINES),
            duration_ms: duration.as_millis(),
        }));
    }

    Ok(CommandResult {
        stdout,
        stderr,
        exit_code,
        duration,
    })
}

async fn read_all<R>(handle: Option<R>) -> std::io::Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    if let Some(mut reader) = handle {
        reader.read_to_end(&mut buf).await?;
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.lines().collect();
    let start = all.len().saturating_sub(lines);
    all[start..].join("\n")
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn captures_stdout() {
        let result = execute("sh", &args(&["-c", "printf 'hello'"]), None)
            .await
            .unwrap();
        assert_eq!(result.stdout, "hello");
        assert_eq!(result.exit_code, 0);
    }

    #[tokio::test]
    async fn kills_child_after_deadline() {
        let started = Instant::now();
        let err = execute(
            "sh",
            &args(&["-c", "sleep 5"]),
            Some(Duration::from_millis(200)),
        )
        .await
        .unwrap_err();

        assert!(err.is_timeout());
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn non_zero_exit_is_an_exec_error() {
        let err = execute("sh", &args(&["-c", "echo broken >&2; exit 3"]), None)
            .await
            .unwrap_err();

        match err {
            GrinderError::Exec(exec) => {
                assert_eq!(exec.exit_code, Some(3));
                assert_eq!(exec.stderr_tail, "broken");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_binary_is_a_spawn_error() {
        let err = execute("definitely-not-a-real-binary-xyz", &[], None)
            .await
            .unwrap_err();
        assert!(matches!(err, GrinderError::Spawn { .. }));
    }

    #[test]
    fn tail_keeps_last_lines() {
        assert_eq!(tail("a\nb\nc", 2), "b\nc");
        assert_eq!(tail("a", 5), "a");
    }
}
