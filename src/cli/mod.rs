//! # Command Line Adapter
//!
//! Wires the library into the `jobportal` binary: stream a chat reply to
//! stdout, ask the one-shot chat endpoint, or walk through a navigation with
//! a progress bar on stderr.

pub mod progress;

use std::error::Error;
use std::io::Write;

use async_trait::async_trait;
use log::{info, warn};

use crate::api::{ChatClient, ChatError, ChatHandler};
use crate::core::config::ResolvedConfig;
use crate::core::{NavigateOptions, NavigationController, Navigator, Router};

/// Prints fragments as they arrive and remembers the failure, if any.
struct StreamPrinter<W: Write> {
    out: W,
    printed: bool,
    error: Option<ChatError>,
}

impl<W: Write> StreamPrinter<W> {
    fn new(out: W) -> Self {
        Self {
            out,
            printed: false,
            error: None,
        }
    }

    fn write_flushed(&mut self, text: &str) -> std::io::Result<()> {
        self.out.write_all(text.as_bytes())?;
        self.out.flush()
    }
}

impl<W: Write> ChatHandler for StreamPrinter<W> {
    fn on_start(&mut self) {
        info!("Chat stream open");
    }

    fn on_content(&mut self, fragment: &str) {
        if let Err(e) = self.write_flushed(fragment) {
            warn!("Failed to print chat fragment: {}", e);
        }
        self.printed = true;
    }

    fn on_complete(&mut self, full_content: &str) {
        // Servers that only send `done` still get their reply shown
        let text = if self.printed {
            "\n".to_string()
        } else {
            format!("{full_content}\n")
        };
        if let Err(e) = self.write_flushed(&text) {
            warn!("Failed to print chat reply: {}", e);
        }
    }

    fn on_error(&mut self, error: &ChatError) {
        self.error = Some(error.clone());
    }
}

/// `jobportal chat <MESSAGE>`. Ctrl-C closes the stream.
pub async fn chat(config: &ResolvedConfig, message: &str) -> Result<(), Box<dyn Error>> {
    let client = ChatClient::new(config.api_url.as_str());
    let stream = client.stream_chat(message);
    let handle = stream.handle();
    let mut printer = StreamPrinter::new(std::io::stdout());

    tokio::select! {
        _ = stream.dispatch(&mut printer) => {}
        _ = tokio::signal::ctrl_c() => {
            handle.cancel();
            println!();
            eprintln!("(cancelled)");
        }
    }

    match printer.error {
        Some(error) => {
            eprintln!("{}", error.message());
            Err(Box::new(error))
        }
        None => Ok(()),
    }
}

/// `jobportal ask <MESSAGE>`: the non-streaming endpoint.
pub async fn ask(config: &ResolvedConfig, message: &str) -> Result<(), Box<dyn Error>> {
    let client = ChatClient::new(config.api_url.as_str());
    let body = client.send_message(message).await?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

/// Stands in for a client-side router: announces where it would go.
struct AnnouncingRouter;

#[async_trait]
impl Router for AnnouncingRouter {
    async fn navigate(&self, href: &str) {
        info!("Routed to {}", href);
        eprintln!("\n→ {href}");
    }
}

/// `jobportal open <HREF> [--fetch PATH]`: runs the navigation choreography,
/// loading `{API_URL}/{PATH}` as the page data.
pub async fn open(
    config: &ResolvedConfig,
    href: &str,
    fetch_path: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let controller = NavigationController::new();
    let follower = tokio::spawn(progress::follow(controller.subscribe()));

    let fetch_url = fetch_path.map(|p| {
        format!(
            "{}/{}",
            config.api_url.trim_end_matches('/'),
            p.trim_start_matches('/')
        )
    });
    let fetch = fetch_page_data(fetch_url);

    let result = {
        let router = AnnouncingRouter;
        let navigator = Navigator::new(&controller, &router, config.easing.clone());
        navigator
            .navigate_with_api(href, fetch, NavigateOptions::default())
            .await
    };

    drop(controller);
    if let Err(e) = follower.await {
        warn!("Progress renderer stopped abnormally: {}", e);
    }

    let data = result?;
    if !data.is_null() {
        println!("{}", serde_json::to_string_pretty(&data)?);
    }
    Ok(())
}

async fn fetch_page_data(url: Option<String>) -> Result<serde_json::Value, reqwest::Error> {
    let Some(url) = url else {
        return Ok(serde_json::Value::Null);
    };
    let response = reqwest::get(url).await?.error_for_status()?;
    response.json().await
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Writer whose every write fails.
    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn test_printer_writes_fragments_then_newline() {
        let mut printer = StreamPrinter::new(Vec::new());
        printer.on_start();
        printer.on_content("Hello, ");
        printer.on_content("world");
        printer.on_complete("Hello, world");
        assert_eq!(String::from_utf8_lossy(&printer.out), "Hello, world\n");
        assert!(printer.error.is_none());
    }

    #[test]
    fn test_printer_shows_full_content_when_no_fragments() {
        let mut printer = StreamPrinter::new(Vec::new());
        printer.on_complete("Only done");
        assert_eq!(String::from_utf8_lossy(&printer.out), "Only done\n");
    }

    #[test]
    fn test_printer_survives_write_failures() {
        let mut printer = StreamPrinter::new(BrokenPipe);
        printer.on_content("lost");
        printer.on_complete("lost");
        printer.on_error(&ChatError::Server("boom".to_string()));
        assert!(printer.printed);
        assert_eq!(printer.error, Some(ChatError::Server("boom".to_string())));
    }
}
