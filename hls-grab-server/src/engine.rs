//! Engine execution
//!
//! Runs the remux plan as a child process. The child is killed when the
//! future driving it is dropped, so a client that disconnects does not leave
//! an orphaned engine behind.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use hls_grab_lib::engine::parse_version_line;
use hls_grab_lib::{GrabError, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

/// Time allowed for `-version`
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct EngineRunner {
    binary: PathBuf,
    tail_lines: usize,
}

impl EngineRunner {
    pub fn new(binary: PathBuf, tail_lines: usize) -> Self {
        Self { binary, tail_lines }
    }

    /// Run the engine and check that it produced `output`.
    pub async fn run(&self, args: &[String], output: &Path) -> Result<()> {
        let mut child = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| GrabError::EngineExecution {
                status: format!("failed to start {}", self.binary.display()),
                tail: e.to_string(),
            })?;

        let mut tail: VecDeque<String> = VecDeque::with_capacity(self.tail_lines);
        if let Some(stderr) = child.stderr.take() {
            let mut reader = BufReader::new(stderr);
            let mut buf = Vec::new();
            loop {
                buf.clear();
                if reader.read_until(b'\n', &mut buf).await? == 0 {
                    break;
                }
                // -stats redraws its progress line with '\r'
                let text = String::from_utf8_lossy(&buf);
                let Some(line) = text.split(['\r', '\n']).rev().find(|l| !l.trim().is_empty())
                else {
                    continue;
                };
                tracing::debug!("engine: {}", line);
                if tail.len() == self.tail_lines {
                    tail.pop_front();
                }
                if self.tail_lines > 0 {
                    tail.push_back(line.to_string());
                }
            }
        }

        let status = child.wait().await?;
        let tail = Vec::from(tail).join("\n");
        tracing::debug!("engine exited with {}", status);

        if !status.success() {
            return Err(GrabError::EngineExecution {
                status: status.to_string(),
                tail,
            });
        }

        let written = tokio::fs::metadata(output)
            .await
            .map(|m| m.len())
            .unwrap_or(0);
        if written == 0 {
            return Err(GrabError::EngineExecution {
                status: "no output file".to_string(),
                tail,
            });
        }
        Ok(())
    }
}

/// First line of `<binary> -version`.
pub async fn probe_version(binary: &Path) -> Result<String> {
    let output = Command::new(binary)
        .arg("-version")
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output();
    let output = tokio::time::timeout(PROBE_TIMEOUT, output)
        .await
        .map_err(|_| GrabError::Config(format!("{} -version timed out", binary.display())))??;
    Ok(parse_version_line(&String::from_utf8_lossy(&output.stdout)).unwrap_or_default())
}
