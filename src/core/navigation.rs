//! # Navigation Progress
//!
//! Tracks the in-flight client-side navigation and the synthetic progress
//! percentage a progress bar renders.
//!
//! ```text
//! NavigationState
//! ├── is_navigating: bool          // navigation in flight
//! ├── progress: i32                // 0..=100 by convention, not enforced
//! └── pending_href: Option<String> // target of the last start
//! ```
//!
//! State changes only happen through `update(state, action)`. The
//! [`NavigationController`] owns one state value and publishes every change
//! on a `watch` channel so renderers can follow along.
//!
//! There is no writer guard: two choreographies driving the same controller
//! interleave their writes at every await point. Keep one navigation active
//! at a time.

use log::debug;
use tokio::sync::watch;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    pub is_navigating: bool,
    pub progress: i32,
    pub pending_href: Option<String>,
}

/// Everything that can happen to the navigation state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavAction {
    Start(String),
    Progress(i32),
    Complete,
    Cancel,
}

/// Applies an action to the state.
///
/// `Complete` leaves `pending_href` set even though nothing is navigating
/// any more. Readers that care must check `is_navigating` first.
pub fn update(state: &mut NavigationState, action: NavAction) {
    match action {
        NavAction::Start(href) => {
            state.is_navigating = true;
            state.pending_href = Some(href);
            state.progress = 0;
        }
        NavAction::Progress(value) => {
            state.progress = value;
        }
        NavAction::Complete => {
            state.is_navigating = false;
            state.progress = 100;
        }
        NavAction::Cancel => {
            state.is_navigating = false;
            state.pending_href = None;
            state.progress = 0;
        }
    }
}

/// Owner of the navigation state. Pass it by reference to whatever drives
/// or renders navigation.
pub struct NavigationController {
    state: watch::Sender<NavigationState>,
}

impl Default for NavigationController {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationController {
    pub fn new() -> Self {
        let (state, _) = watch::channel(NavigationState::default());
        Self { state }
    }

    /// Returns a receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<NavigationState> {
        self.state.subscribe()
    }

    /// Clones the current state.
    pub fn snapshot(&self) -> NavigationState {
        self.state.borrow().clone()
    }

    pub fn dispatch(&self, action: NavAction) {
        debug!("Navigation action: {:?}", action);
        self.state.send_modify(|state| update(state, action));
    }

    pub fn start_navigation(&self, href: impl Into<String>) {
        self.dispatch(NavAction::Start(href.into()));
    }

    /// Stores `value` verbatim. Ordering and bounds are the caller's problem.
    pub fn update_progress(&self, value: i32) {
        self.dispatch(NavAction::Progress(value));
    }

    pub fn complete_navigation(&self) {
        self.dispatch(NavAction::Complete);
    }

    pub fn cancel_navigation(&self) {
        self.dispatch(NavAction::Cancel);
    }
}
