use log::{debug, info, warn};
use reqwest::Url;
use reqwest::multipart::Form;

use super::stream::ChatStream;
use super::types::ChatError;

/// Client for the chatbot endpoints of the portal API.
#[derive(Clone, Debug)]
pub struct ChatClient {
    base_url: String,
    client: reqwest::Client,
}

impl ChatClient {
    /// Creates a client rooted at `base_url` (the `API_URL`).
    ///
    /// # Arguments
    /// * `base_url` - API base, e.g. `http://localhost:8000`. A trailing `/` is ignored.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}/chatbot/stream?msg=<message>`, with the message form-encoded.
    pub fn stream_url(&self, message: &str) -> Result<Url, ChatError> {
        Url::parse_with_params(
            &format!("{}/chatbot/stream", self.base_url),
            &[("msg", message)],
        )
        .map_err(|e| ChatError::Transport(format!("invalid stream URL: {e}")))
    }

    /// Opens a streaming reply to `message`.
    ///
    /// Must be called from within a tokio runtime. Nothing is retried; a
    /// failed or finished stream has to be opened again by the caller.
    /// # Example
    /// ```no_run
    /// use jobportal::api::{ChatClient, ChatEvent};
    /// # async fn demo() {
    /// let client = ChatClient::new("http://localhost:8000");
    /// let mut stream = client.stream_chat("Which companies are hiring?");
    /// while let Some(event) = stream.next_event().await {
    ///     if let ChatEvent::Content(fragment) = event {
    ///         print!("{fragment}");
    ///     }
    /// }
    /// # }
    /// ```
    pub fn stream_chat(&self, message: &str) -> ChatStream {
        let stream_id = uuid::Uuid::new_v4().to_string();
        info!(
            "[{}] Opening chat stream (message len={})",
            stream_id,
            message.len()
        );

        // An unparseable base URL surfaces through the stream as a transport failure
        let request = self.stream_url(message).map(|url| {
            self.client
                .get(url)
                .header("Accept", "text/event-stream")
                .header("Cache-Control", "no-cache")
        });

        ChatStream::spawn(request, stream_id)
    }

    /// Non-streaming fallback: posts `msg` as a multipart form field and
    /// returns the JSON body as-is.
    pub async fn send_message(&self, message: &str) -> Result<serde_json::Value, ChatError> {
        let form = Form::new().text("msg", message.to_string());

        let response = self
            .client
            .post(format!("{}/chatbot/get", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ChatError::Transport(e.to_string()))?;

        debug!("Chatbot response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let err_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("Chatbot API error: {} - {}", status, err_body);
            return Err(ChatError::Transport(format!("HTTP {status}: {err_body}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ChatError::Transport(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| ChatError::Decode(e.to_string()))
    }
}
