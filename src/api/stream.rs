//! # Chat Stream
//!
//! One reader task per stream owns the HTTP connection, decodes SSE payloads
//! and pushes [`ChatEvent`]s into a channel. The consumer pulls them with
//! [`ChatStream::next_event`] or hands a [`ChatHandler`] to
//! [`ChatStream::dispatch`].
//!
//! ```text
//! reader task ──ChatEvent──▶ mpsc ──▶ ChatStream ──▶ ChatHandler
//!      ▲                                   │
//!      └──────── StreamHandle::cancel ─────┘ (abort + Closed(Cancelled))
//! ```
//!
//! Terminal transitions go through [`close`], which only succeeds once. The
//! consumer commits `Closed(Done)` or `Closed(Error)` when it takes the
//! terminal event off the channel, not when the reader queues it. A cancel
//! therefore wins over anything still buffered, and a cancel racing a
//! terminal event can never produce both.

use std::sync::Arc;

use log::{debug, info, warn};
use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio::task::AbortHandle;

use super::sse::SseDecoder;
use super::types::{ChatError, ChatEvent, CloseReason, StreamEvent, StreamState};

const EVENT_BUFFER: usize = 64;

/// Optional callbacks for [`ChatStream::dispatch`]. Every method defaults to
/// doing nothing.
pub trait ChatHandler {
    fn on_start(&mut self) {}
    fn on_content(&mut self, _fragment: &str) {}
    fn on_complete(&mut self, _full_content: &str) {}
    fn on_error(&mut self, _error: &ChatError) {}
}

/// Cancellation and status handle for one stream. Cheap to clone.
#[derive(Clone, Debug)]
pub struct StreamHandle {
    state: Arc<watch::Sender<StreamState>>,
    abort: AbortHandle,
}

impl StreamHandle {
    /// Closes the connection and drops every event not yet delivered.
    /// Calling it again, or after the terminal event was delivered, does
    /// nothing.
    pub fn cancel(&self) {
        if close(&self.state, CloseReason::Cancelled) {
            info!("Chat stream cancelled");
        }
        self.abort.abort();
    }

    pub fn state(&self) -> StreamState {
        *self.state.borrow()
    }

    pub fn is_closed(&self) -> bool {
        self.state().is_closed()
    }

    pub fn is_cancelled(&self) -> bool {
        self.state() == StreamState::Closed(CloseReason::Cancelled)
    }

    /// Watches lifecycle transitions.
    pub fn subscribe(&self) -> watch::Receiver<StreamState> {
        self.state.subscribe()
    }
}

/// Consumer side of a chat stream. Dropping it cancels the stream.
pub struct ChatStream {
    events: mpsc::Receiver<ChatEvent>,
    handle: StreamHandle,
}

impl ChatStream {
    /// Spawns the reader for `request` on the current tokio runtime. An
    /// `Err` request is reported as the stream's only event.
    pub(crate) fn spawn(
        request: Result<reqwest::RequestBuilder, ChatError>,
        stream_id: String,
    ) -> Self {
        let (tx, events) = mpsc::channel(EVENT_BUFFER);
        let (state, _) = watch::channel(StreamState::Connecting);
        let state = Arc::new(state);

        let task = tokio::spawn(read_stream(request, Arc::clone(&state), tx, stream_id));

        Self {
            events,
            handle: StreamHandle {
                state,
                abort: task.abort_handle(),
            },
        }
    }

    pub fn handle(&self) -> StreamHandle {
        self.handle.clone()
    }

    /// Next event, or `None` once the stream is over or was cancelled.
    pub async fn next_event(&mut self) -> Option<ChatEvent> {
        if self.handle.is_closed() {
            return None;
        }
        let event = self.events.recv().await?;
        let delivered = match &event {
            ChatEvent::Completed(_) => close(&self.handle.state, CloseReason::Done),
            ChatEvent::Failed(_) => close(&self.handle.state, CloseReason::Error),
            ChatEvent::Started | ChatEvent::Content(_) => !self.handle.is_closed(),
        };
        delivered.then_some(event)
    }

    /// Runs `handler` until the stream ends. Cancelling from inside a
    /// callback stops delivery before the next event.
    pub async fn dispatch<H: ChatHandler + ?Sized>(mut self, handler: &mut H) {
        while let Some(event) = self.next_event().await {
            match event {
                ChatEvent::Started => handler.on_start(),
                ChatEvent::Content(fragment) => handler.on_content(&fragment),
                ChatEvent::Completed(full) => {
                    handler.on_complete(&full);
                    break;
                }
                ChatEvent::Failed(error) => {
                    handler.on_error(&error);
                    break;
                }
            }
        }
    }
}

impl Drop for ChatStream {
    fn drop(&mut self) {
        if close(&self.handle.state, CloseReason::Cancelled) {
            debug!("Chat stream dropped before it finished");
        }
        self.handle.abort.abort();
    }
}

/// Moves the stream into `Closed(reason)` unless it is closed already.
/// Returns whether this call did the transition.
fn close(state: &watch::Sender<StreamState>, reason: CloseReason) -> bool {
    state.send_if_modified(|current| {
        if current.is_closed() {
            false
        } else {
            *current = StreamState::Closed(reason);
            true
        }
    })
}

/// Whether the reader should keep going after a payload.
enum Flow {
    Continue,
    Stop,
}

struct Reader {
    state: Arc<watch::Sender<StreamState>>,
    tx: mpsc::Sender<ChatEvent>,
    stream_id: String,
    content_chunks: usize,
}

impl Reader {
    async fn emit(&self, event: ChatEvent) -> Flow {
        if self.tx.send(event).await.is_err() {
            warn!("[{}] Event send failed: receiver dropped", self.stream_id);
            close(&self.state, CloseReason::Cancelled);
            return Flow::Stop;
        }
        Flow::Continue
    }

    /// Queues the terminal event. The consumer commits the closed state.
    async fn finish(&self, event: ChatEvent) -> Flow {
        self.emit(event).await;
        Flow::Stop
    }

    async fn fail(&self, error: ChatError) -> Flow {
        warn!("[{}] Chat stream failed: {}", self.stream_id, error);
        self.finish(ChatEvent::Failed(error)).await
    }

    async fn handle_payload(&mut self, data: &str) -> Flow {
        let value: Value = match serde_json::from_str(data) {
            Ok(value) => value,
            Err(e) => return self.fail(ChatError::Decode(e.to_string())).await,
        };

        let event = match serde_json::from_value::<StreamEvent>(value) {
            Ok(event) => event,
            Err(e) => {
                warn!("[{}] Ignoring unrecognised payload ({}): {}", self.stream_id, e, data);
                return Flow::Continue;
            }
        };

        match event {
            StreamEvent::Status { content } => {
                debug!("[{}] Status: {}", self.stream_id, content);
                Flow::Continue
            }
            StreamEvent::Content { content } => {
                self.content_chunks += 1;
                debug!(
                    "[{}] Content chunk #{} (len={})",
                    self.stream_id,
                    self.content_chunks,
                    content.len()
                );
                self.emit(ChatEvent::Content(content)).await
            }
            StreamEvent::Done { full_content } => {
                info!(
                    "[{}] Stream complete: {} chunks, {} bytes",
                    self.stream_id,
                    self.content_chunks,
                    full_content.len()
                );
                self.finish(ChatEvent::Completed(full_content)).await
            }
            StreamEvent::Error { content } => self.fail(ChatError::Server(content)).await,
            StreamEvent::Unknown => {
                warn!("[{}] Unknown event type: {}", self.stream_id, data);
                Flow::Continue
            }
        }
    }
}

async fn read_stream(
    request: Result<reqwest::RequestBuilder, ChatError>,
    state: Arc<watch::Sender<StreamState>>,
    tx: mpsc::Sender<ChatEvent>,
    stream_id: String,
) {
    let mut reader = Reader {
        state,
        tx,
        stream_id,
        content_chunks: 0,
    };

    let request = match request {
        Ok(request) => request,
        Err(e) => {
            reader.fail(e).await;
            return;
        }
    };

    let mut response = match request.send().await {
        Ok(response) => response,
        Err(e) => {
            reader.fail(ChatError::Transport(e.to_string())).await;
            return;
        }
    };

    debug!("[{}] Chat stream status: {}", reader.stream_id, response.status());
    if !response.status().is_success() {
        let status = response.status().as_u16();
        reader
            .fail(ChatError::Transport(format!("HTTP {status}")))
            .await;
        return;
    }

    let opened = reader.state.send_if_modified(|current| {
        if *current == StreamState::Connecting {
            *current = StreamState::Open;
            true
        } else {
            false
        }
    });
    if !opened {
        return;
    }
    if let Flow::Stop = reader.emit(ChatEvent::Started).await {
        return;
    }

    let mut decoder = SseDecoder::new();
    loop {
        let chunk = match response.chunk().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            Err(e) => {
                reader.fail(ChatError::Transport(e.to_string())).await;
                return;
            }
        };
        debug!("[{}] Raw chunk received: {} bytes", reader.stream_id, chunk.len());

        for data in decoder.push(&chunk) {
            if let Flow::Stop = reader.handle_payload(&data).await {
                return;
            }
        }
    }

    if let Some(data) = decoder.finish()
        && let Flow::Stop = reader.handle_payload(&data).await
    {
        return;
    }

    reader
        .fail(ChatError::Transport(
            "stream ended before a terminal event".to_string(),
        ))
        .await;
}
