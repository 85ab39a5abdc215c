use std::fmt;

use serde::Deserialize;

/// Shown to the user when the chat server cannot be reached or drops the
/// connection before finishing.
pub const CONNECTION_FAILED_MESSAGE: &str = "Connection to the chat server failed";

/// Shown to the user when the chat server sends something that is not JSON.
pub const DECODE_FAILED_MESSAGE: &str = "Failed to parse the chat server response";

/// One server message on `/chatbot/stream`.
/// The event kind is embedded in the JSON `type` field, not in SSE `event:` lines.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
    /// Human-readable phase text. Logged, never surfaced.
    Status {
        #[serde(default)]
        content: String,
    },
    /// Incremental text fragment.
    Content {
        #[serde(default)]
        content: String,
    },
    /// Terminal: the whole reply.
    Done {
        #[serde(default)]
        full_content: String,
    },
    /// Terminal: the server gave up.
    Error {
        #[serde(default)]
        content: String,
    },
    #[serde(other)]
    Unknown,
}

/// What a chat stream consumer sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// The connection is open.
    Started,
    /// A fragment to append. Accumulation is the consumer's job.
    Content(String),
    /// Terminal: the full reply as the server assembled it.
    Completed(String),
    /// Terminal.
    Failed(ChatError),
}

impl ChatEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChatEvent::Completed(_) | ChatEvent::Failed(_))
    }
}

/// Errors surfaced by the chat client. None of them are retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    /// Connection refused, non-2xx status, body read failure, or the server
    /// closed the stream before a terminal event.
    Transport(String),
    /// The payload was not valid JSON.
    Decode(String),
    /// The server sent an explicit `error` event.
    Server(String),
}

impl ChatError {
    /// Text suitable for an inline chat error bubble.
    pub fn message(&self) -> &str {
        match self {
            ChatError::Transport(_) => CONNECTION_FAILED_MESSAGE,
            ChatError::Decode(_) => DECODE_FAILED_MESSAGE,
            ChatError::Server(msg) => msg,
        }
    }
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatError::Transport(detail) => write!(f, "transport error: {detail}"),
            ChatError::Decode(detail) => write!(f, "decode error: {detail}"),
            ChatError::Server(msg) => write!(f, "server error: {msg}"),
        }
    }
}

impl std::error::Error for ChatError {}

/// Why a stream stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    Done,
    Error,
    Cancelled,
}

/// Lifecycle of a chat stream.
///
/// ```text
/// Connecting → Open → Closed(Done | Error | Cancelled)
///     └──────────────→ Closed(Error | Cancelled)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Connecting,
    Open,
    Closed(CloseReason),
}

impl StreamState {
    pub fn is_closed(self) -> bool {
        matches!(self, StreamState::Closed(_))
    }
}
