//! Streaming file transfer with progress

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{Client, StatusCode};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::sync::TransferError;

/// Moves the bytes behind a URL into a local file
#[async_trait]
pub trait Transfer: Send + Sync {
    /// Fetch `url` into `dest`, replacing any existing file.
    /// Returns the number of bytes written.
    async fn transfer(&self, url: &str, dest: &Path, display_name: &str) -> Result<u64, TransferError>;
}

/// Anything other than 200 counts as a failed transfer
fn ensure_ok(status: StatusCode) -> Result<(), TransferError> {
    if status == StatusCode::OK {
        Ok(())
    } else {
        Err(TransferError::Status {
            status: status.as_u16(),
        })
    }
}

/// Copy a response body into `writer`, advancing `bar`
///
/// Any error abandons the bar before it is returned.
async fn write_body<S, C, W>(stream: S, writer: &mut W, bar: &ProgressBar) -> Result<u64, TransferError>
where
    S: Stream<Item = reqwest::Result<C>>,
    C: AsRef<[u8]>,
    W: AsyncWrite + Unpin,
{
    let mut stream = std::pin::pin!(stream);
    let mut written = 0u64;

    while let Some(chunk) = stream.next().await {
        let result = match chunk {
            Ok(chunk) => writer
                .write_all(chunk.as_ref())
                .await
                .map(|_| chunk.as_ref().len() as u64)
                .map_err(TransferError::from),
            Err(e) => Err(e.into()),
        };
        match result {
            Ok(len) => {
                written += len;
                bar.set_position(written);
            }
            Err(e) => {
                bar.abandon();
                return Err(e);
            }
        }
    }

    if let Err(e) = writer.flush().await {
        bar.abandon();
        return Err(e.into());
    }
    Ok(written)
}

/// HTTP transfer that shows a progress bar per file
#[derive(Clone)]
pub struct HttpTransfer {
    http_client: Client,
    show_progress: bool,
}

impl HttpTransfer {
    pub fn new(http_client: Client) -> Self {
        Self {
            http_client,
            show_progress: true,
        }
    }

    /// Disable progress bars (e.g. when output is not a terminal)
    pub fn quiet(mut self) -> Self {
        self.show_progress = false;
        self
    }

    fn progress_bar(&self, content_length: Option<u64>, display_name: &str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let bar = match content_length {
            Some(len) if len > 0 => {
                let bar = ProgressBar::new(len);
                bar.set_style(
                    ProgressStyle::default_bar()
                        .template("      {msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")
                        .unwrap_or_else(|_| ProgressStyle::default_bar())
                        .progress_chars("#>-"),
                );
                bar
            }
            _ => {
                let bar = ProgressBar::new_spinner();
                bar.set_style(
                    ProgressStyle::default_spinner()
                        .template("      {spinner:.green} {msg} {bytes} ({bytes_per_sec})")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                bar
            }
        };
        bar.set_message(display_name.to_string());
        bar
    }
}

#[async_trait]
impl Transfer for HttpTransfer {
    async fn transfer(&self, url: &str, dest: &Path, display_name: &str) -> Result<u64, TransferError> {
        debug!("Transferring {} -> {}", url, dest.display());

        let response = self.http_client.get(url).send().await?;

        ensure_ok(response.status())?;

        let bar = self.progress_bar(response.content_length(), display_name);

        // Truncates any stale copy left from an earlier run
        let mut file = File::create(dest).await?;
        let written = write_body(response.bytes_stream(), &mut file, &bar).await?;
        bar.finish_and_clear();

        debug!("Wrote {} bytes to {}", written, dest.display());
        Ok(written)
    }
}
