//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::api::{ChatError, ChatHandler};
use crate::core::choreography::Router;
use crate::core::navigation::NavigationState;

/// A router that remembers where it was sent and, when attached to a
/// controller, what the navigation state looked like at that moment.
#[derive(Default)]
pub struct RecordingRouter {
    visited: Mutex<Vec<String>>,
    watcher: Mutex<Option<watch::Receiver<NavigationState>>>,
    seen: Mutex<Vec<NavigationState>>,
}

impl RecordingRouter {
    pub fn attach(&self, rx: watch::Receiver<NavigationState>) {
        *self.watcher.lock().unwrap() = Some(rx);
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }

    pub fn states_at_navigate(&self) -> Vec<NavigationState> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Router for RecordingRouter {
    async fn navigate(&self, href: &str) {
        self.visited.lock().unwrap().push(href.to_string());
        if let Some(rx) = self.watcher.lock().unwrap().as_ref() {
            self.seen.lock().unwrap().push(rx.borrow().clone());
        }
    }
}

/// Every callback a chat handler received, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Start,
    Content(String),
    Complete(String),
    Error(String),
}

#[derive(Default)]
pub struct RecordingHandler {
    pub calls: Vec<Call>,
}

impl ChatHandler for RecordingHandler {
    fn on_start(&mut self) {
        self.calls.push(Call::Start);
    }

    fn on_content(&mut self, fragment: &str) {
        self.calls.push(Call::Content(fragment.to_string()));
    }

    fn on_complete(&mut self, full_content: &str) {
        self.calls.push(Call::Complete(full_content.to_string()));
    }

    fn on_error(&mut self, error: &ChatError) {
        self.calls.push(Call::Error(error.message().to_string()));
    }
}
