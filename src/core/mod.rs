//! # Core Application Logic
//!
//! Navigation state and the choreography that drives it. Nothing here knows
//! about HTTP or the terminal; the data fetch and the router are supplied by
//! the caller.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • NavigationState      │
//!                    │  • NavAction + update() │
//!                    │  • Navigator            │
//!                    └───────────┬─────────────┘
//!                                │ watch::Receiver
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │    CLI     │      │   Router   │      │  Progress  │
//!     │  (clap)    │      │  (caller)  │      │    bar     │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`navigation`]: the state, its actions and the owning controller
//! - [`choreography`]: `navigate_with_api`, progress in lockstep with a fetch
//! - [`config`]: settings resolution

pub mod choreography;
pub mod config;
pub mod navigation;

pub use choreography::{EasingProfile, NavigateOptions, Navigator, Router};
pub use navigation::{NavAction, NavigationController, NavigationState};
