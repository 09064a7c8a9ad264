use crate::error::Unavailable;
use anyhow::{anyhow, Context, Result};
use std::io::Read;
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(2);

pub fn check_samtools(samtools: &str) -> Result<()> {
    let output = Command::new(samtools)
        .arg("--version")
        .output()
        .with_context(|| format!("{} not found. Please install samtools (http://www.htslib.org/) and ensure it's in your PATH", samtools))?;
    if !output.status.success() {
        anyhow::bail!(
            "{} --version failed: {}",
            samtools,
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(())
}

/// Run a command to completion and fail with a readable message when it
/// exits non-zero. Used for setup steps, not per-record queries.
pub fn run_checked(cmd: &mut Command, what: &str) -> Result<Output> {
    let output = cmd
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("Failed to run {}", what))?;
    if !output.status.success() {
        return Err(anyhow!(
            "{} failed: {}",
            what,
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }
    Ok(output)
}

/// Run a lookup command, killing it once `timeout` has elapsed.
pub fn run_with_timeout(cmd: &mut Command, timeout: Duration) -> Result<Output, Unavailable> {
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| Unavailable::SpawnFailed(e.to_string()))?;

    // Drain both pipes so a chatty child can never block on a full buffer.
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let stdout_handle = thread::spawn(move || drain(stdout));
    let stderr_handle = thread::spawn(move || drain(stderr));

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(Unavailable::TimedOut(timeout.as_secs()));
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => return Err(Unavailable::Backend(e.to_string())),
        }
    };

    Ok(Output {
        status,
        stdout: stdout_handle.join().unwrap_or_default(),
        stderr: stderr_handle.join().unwrap_or_default(),
    })
}

fn drain<R: Read>(pipe: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buf);
    }
    buf
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn captures_stdout_of_fast_commands() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "printf '>chr1:1-1\\nA\\n'"]);
        let output = run_with_timeout(&mut cmd, Duration::from_secs(5)).unwrap();
        assert!(output.status.success());
        assert_eq!(output.stdout, b">chr1:1-1\nA\n");
    }

    #[test]
    fn slow_commands_time_out() {
        let mut cmd = Command::new("sleep");
        cmd.arg("5");
        let err = run_with_timeout(&mut cmd, Duration::from_millis(100)).unwrap_err();
        assert!(matches!(err, Unavailable::TimedOut(_)));
    }

    #[test]
    fn missing_binaries_fail_to_spawn() {
        let mut cmd = Command::new("/nonexistent/samtools-binary");
        let err = run_with_timeout(&mut cmd, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, Unavailable::SpawnFailed(_)));
    }

    #[test]
    fn check_samtools_reports_missing_binary() {
        let err = check_samtools("/nonexistent/samtools-binary").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
