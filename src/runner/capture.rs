//! Child process output capture
//!
//! Runs the test command with stdin closed, interleaves stdout and stderr
//! into one transcript in arrival order, and echoes every chunk live.

use std::path::Path;
use std::process::Stdio;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tokio::sync::mpsc;

use crate::common::{Error, Result};

/// Size of a single read from a child pipe
const CHUNK_SIZE: usize = 8 * 1024;

/// Transcript and exit code of one finished process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captured {
    /// Combined stdout and stderr, in arrival order
    pub transcript: String,
    /// Exit code; a process killed by a signal reports 0
    pub exit_code: i32,
}

impl Captured {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Which pipe a chunk came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Stdout,
    Stderr,
}

/// Runs one process at a time and captures its output
#[derive(Debug, Clone)]
pub struct TranscriptCapturer {
    /// Forward chunks to our own stdout/stderr while capturing
    echo: bool,
}

impl Default for TranscriptCapturer {
    fn default() -> Self {
        Self { echo: true }
    }
}

impl TranscriptCapturer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture without echoing to the terminal
    pub fn silent() -> Self {
        Self { echo: false }
    }

    /// Run `command` in `working_dir` and wait for it to exit
    ///
    /// Only a failure to start the process is an error. A non-zero exit is a
    /// normal result.
    pub async fn execute(
        &self,
        command: &str,
        args: &[String],
        working_dir: &Path,
    ) -> Result<Captured> {
        tracing::debug!(command, ?args, dir = %working_dir.display(), "Spawning test process");

        let mut child = Command::new(command)
            .args(args)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::launch_failed(command, e))?;

        let stdout = child.stdout.take().ok_or_else(|| Error::CommandLaunch {
            command: command.to_string(),
            error: "stdout was not captured".to_string(),
        })?;
        let stderr = child.stderr.take().ok_or_else(|| Error::CommandLaunch {
            command: command.to_string(),
            error: "stderr was not captured".to_string(),
        })?;

        let (tx, mut rx) = mpsc::unbounded_channel();
        tokio::spawn(pump(stdout, Stream::Stdout, tx.clone()));
        tokio::spawn(pump(stderr, Stream::Stderr, tx));

        // Bytes are decoded only at the end so multi-byte characters split
        // across chunks survive
        let mut transcript = Vec::new();
        while let Some((stream, chunk)) = rx.recv().await {
            if self.echo {
                forward(stream, &chunk).await;
            }
            transcript.extend_from_slice(&chunk);
        }

        let status = child.wait().await?;
        let exit_code = status.code().unwrap_or(0);
        tracing::debug!(command, exit_code, bytes = transcript.len(), "Test process exited");

        Ok(Captured {
            transcript: String::from_utf8_lossy(&transcript).into_owned(),
            exit_code,
        })
    }
}

/// Read a pipe to EOF, sending each chunk as it arrives
async fn pump<R>(mut reader: R, stream: Stream, tx: mpsc::UnboundedSender<(Stream, Vec<u8>)>)
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                if tx.send((stream, buf[..n].to_vec())).is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::debug!(?stream, error = %e, "Pipe read failed");
                break;
            }
        }
    }
}

/// Echo a chunk to the matching stream of this process
async fn forward(stream: Stream, chunk: &[u8]) {
    let result = match stream {
        Stream::Stdout => {
            let mut out = tokio::io::stdout();
            match out.write_all(chunk).await {
                Ok(()) => out.flush().await,
                Err(e) => Err(e),
            }
        }
        Stream::Stderr => {
            let mut err = tokio::io::stderr();
            match err.write_all(chunk).await {
                Ok(()) => err.flush().await,
                Err(e) => Err(e),
            }
        }
    };
    if let Err(e) = result {
        tracing::trace!(error = %e, "Could not echo test output");
    }
}
