//! Malware scanning port and the clamd implementation.
//!
//! `ClamdScanService` speaks the INSTREAM protocol to a clamd daemon over
//! TCP: a `zINSTREAM` command followed by length-prefixed chunks and a
//! zero-length terminator, answered by a single NUL-terminated verdict line.

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    time::{timeout, Duration},
};

#[cfg(test)]
use mockall::automock;

const INSTREAM_CHUNK_SIZE: usize = 8192;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Scanner IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Scan timed out after {0} ms")]
    Timeout(u64),
    #[error("Unexpected scanner reply: {0}")]
    Protocol(String),
}

/// Verdict for a single scanned file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutcome {
    pub infected: bool,
    /// Signature names reported by the scanner; empty when clean.
    pub signatures: Vec<String>,
}

impl ScanOutcome {
    pub fn clean() -> Self {
        Self {
            infected: false,
            signatures: Vec::new(),
        }
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ScanService: Send + Sync {
    async fn scan_path(&self, path: &Path) -> Result<ScanOutcome, ScanError>;
}

#[derive(Debug, Clone)]
pub struct ClamdScanService {
    host: String,
    port: u16,
    timeout_ms: u64,
}

impl ClamdScanService {
    pub fn new(host: String, port: u16, timeout_ms: u64) -> Self {
        Self {
            host,
            port,
            timeout_ms,
        }
    }

    async fn stream_file(&self, path: &Path) -> Result<String, ScanError> {
        let mut stream = TcpStream::connect((self.host.as_str(), self.port)).await?;
        stream.write_all(b"zINSTREAM\0").await?;

        let mut file = tokio::fs::File::open(path).await?;
        let mut chunk = vec![0u8; INSTREAM_CHUNK_SIZE];
        loop {
            let read = file.read(&mut chunk).await?;
            if read == 0 {
                break;
            }
            stream.write_all(&(read as u32).to_be_bytes()).await?;
            stream.write_all(&chunk[..read]).await?;
        }
        stream.write_all(&0u32.to_be_bytes()).await?;

        let mut reply = Vec::new();
        stream.read_to_end(&mut reply).await?;
        Ok(String::from_utf8_lossy(&reply).into_owned())
    }
}

#[async_trait]
impl ScanService for ClamdScanService {
    async fn scan_path(&self, path: &Path) -> Result<ScanOutcome, ScanError> {
        let reply = timeout(
            Duration::from_millis(self.timeout_ms),
            self.stream_file(path),
        )
        .await
        .map_err(|_| ScanError::Timeout(self.timeout_ms))??;

        parse_clamd_reply(&reply)
    }
}

/// Parses a clamd verdict line such as `stream: OK` or
/// `stream: Eicar-Test-Signature FOUND`.
pub fn parse_clamd_reply(reply: &str) -> Result<ScanOutcome, ScanError> {
    let line = reply.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    let verdict = line.strip_prefix("stream: ").unwrap_or(line);

    if verdict == "OK" {
        return Ok(ScanOutcome::clean());
    }

    if let Some(signature) = verdict.strip_suffix(" FOUND") {
        return Ok(ScanOutcome {
            infected: true,
            signatures: vec![signature.to_string()],
        });
    }

    Err(ScanError::Protocol(line.to_string()))
}
