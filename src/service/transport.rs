//! Chat transport
//!
//! The assistant only needs two things from a chat system: the next message
//! and a way to reply. [`LineTransport`] provides both over any async byte
//! stream, one message per line (stdin/stdout in the binary).

use crate::command::extract_directed_command;
use crate::error::Result;
use crate::service::dispatcher::CommandDispatcher;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};
use tokio::sync::{broadcast, mpsc, OwnedSemaphorePermit, Semaphore};
use tracing::{debug, error, info};

/// Trait for a message source with a reply channel
#[async_trait]
pub trait ChatTransport: Send {
    /// Next incoming message, `None` once the source is exhausted.
    /// Must be cancel safe.
    async fn receive(&mut self) -> Result<Option<String>>;

    /// Post a reply
    async fn send(&mut self, text: &str) -> Result<()>;
}

/// Newline-delimited transport over an async reader and writer
pub struct LineTransport<R, W> {
    lines: Lines<R>,
    writer: W,
}

impl<R, W> LineTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            lines: reader.lines(),
            writer,
        }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<R, W> ChatTransport for LineTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn receive(&mut self) -> Result<Option<String>> {
        Ok(self.lines.next_line().await?)
    }

    async fn send(&mut self, text: &str) -> Result<()> {
        self.writer.write_all(text.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }
}

/// Counters for one [`serve`] run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServeStats {
    pub received: usize,
    pub handled: usize,
    pub ignored: usize,
}

/// Answer every message addressed with `mention` until the transport is
/// exhausted or shutdown is signalled.
///
/// Commands run on the blocking pool, at most `max_concurrent` at a time.
/// With a single permit replies are sent in message order.
pub async fn serve<T>(
    transport: &mut T,
    dispatcher: Arc<CommandDispatcher>,
    mention: &str,
    max_concurrent: usize,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<ServeStats>
where
    T: ChatTransport + ?Sized,
{
    let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));
    let (reply_tx, mut reply_rx) = mpsc::unbounded_channel::<String>();
    let mut stats = ServeStats::default();
    let mut input_open = true;
    let mut in_flight = 0usize;

    loop {
        if !input_open && in_flight == 0 {
            break;
        }

        tokio::select! {
            _ = shutdown.recv() => {
                info!("Shutdown requested, {} commands still running", in_flight);
                break;
            }
            Some(reply) = reply_rx.recv() => {
                in_flight -= 1;
                transport.send(&reply).await?;
            }
            message = transport.receive(), if input_open => {
                let Some(text) = message? else {
                    debug!("Transport closed");
                    input_open = false;
                    continue;
                };
                stats.received += 1;

                let Some(command) = extract_directed_command(&text, mention) else {
                    stats.ignored += 1;
                    continue;
                };

                let Some(permit) = acquire_or_shutdown(&semaphore, &mut shutdown).await? else {
                    info!("Shutdown requested while waiting for a worker");
                    break;
                };
                let dispatcher = dispatcher.clone();
                let reply_tx = reply_tx.clone();
                in_flight += 1;
                stats.handled += 1;

                tokio::spawn(async move {
                    let reply = match tokio::task::spawn_blocking(move || dispatcher.handle(&command)).await {
                        Ok(reply) => reply,
                        Err(e) => {
                            error!("Command task failed: {}", e);
                            "Something went wrong, check the logs.".to_string()
                        }
                    };
                    let _ = reply_tx.send(reply);
                    drop(permit);
                });
            }
        }
    }

    Ok(stats)
}

/// Wait for a worker permit, giving up with `None` once shutdown is signalled
async fn acquire_or_shutdown(
    semaphore: &Arc<Semaphore>,
    shutdown: &mut broadcast::Receiver<()>,
) -> Result<Option<OwnedSemaphorePermit>> {
    tokio::select! {
        permit = semaphore.clone().acquire_owned() => Ok(Some(permit?)),
        _ = shutdown.recv() => Ok(None),
    }
}
