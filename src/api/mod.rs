//! # Portal API
//!
//! Thin HTTP layer over the portal backend. Only the chatbot endpoints live
//! here:
//!
//! - `GET  {API_URL}/chatbot/stream?msg=…`: SSE reply, see [`stream`]
//! - `POST {API_URL}/chatbot/get`: one-shot JSON reply

pub mod client;
pub mod sse;
pub mod stream;
pub mod types;

pub use client::ChatClient;
pub use stream::{ChatHandler, ChatStream, StreamHandle};
pub use types::{ChatError, ChatEvent, CloseReason, StreamEvent, StreamState};
