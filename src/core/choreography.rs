//! # Navigation Choreography
//!
//! Animates the progress bar in lockstep with a navigation that waits on a
//! data fetch:
//!
//! ```text
//! start(href) → step[0] → fetch ─┬─ Ok  → step[1] → on_success → step[2]
//!                                │        → settle → 100 → navigate_delay
//!                                │        → router.navigate(href)
//!                                │        → complete_delay → complete()
//!                                └─ Err → on_error → cancel() → Err(e)
//! ```
//!
//! The delays only exist to make the bar feel smooth. Once started, a
//! choreography cannot be aborted.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};

use super::navigation::NavigationController;

/// Default progress values shown while the fetch runs.
pub const DEFAULT_PROGRESS_STEPS: [i32; 3] = [30, 60, 90];

/// Performs the actual location change once the bar reaches 100.
#[async_trait]
pub trait Router: Send + Sync {
    async fn navigate(&self, href: &str);
}

/// Timing of the choreography.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EasingProfile {
    pub progress_steps: [i32; 3],
    /// Pause after the last step before jumping to 100.
    pub settle: Duration,
    /// Pause at 100 before the router is called.
    pub navigate_delay: Duration,
    /// Pause after the router call before the navigation is marked complete.
    pub complete_delay: Duration,
}

impl Default for EasingProfile {
    fn default() -> Self {
        Self {
            progress_steps: DEFAULT_PROGRESS_STEPS,
            settle: Duration::from_millis(300),
            navigate_delay: Duration::from_millis(400),
            complete_delay: Duration::from_millis(500),
        }
    }
}

impl EasingProfile {
    /// Same steps, no waiting.
    pub fn instant() -> Self {
        Self {
            progress_steps: DEFAULT_PROGRESS_STEPS,
            settle: Duration::ZERO,
            navigate_delay: Duration::ZERO,
            complete_delay: Duration::ZERO,
        }
    }
}

/// Per-call hooks and overrides for [`Navigator::navigate_with_api`].
pub struct NavigateOptions<'a, T, E> {
    /// Overrides the profile's steps for this call.
    pub progress_steps: Option<[i32; 3]>,
    pub on_success: Option<Box<dyn FnOnce(&T) + Send + 'a>>,
    pub on_error: Option<Box<dyn FnOnce(&E) + Send + 'a>>,
}

impl<T, E> Default for NavigateOptions<'_, T, E> {
    fn default() -> Self {
        Self {
            progress_steps: None,
            on_success: None,
            on_error: None,
        }
    }
}

impl<'a, T, E> NavigateOptions<'a, T, E> {
    pub fn with_steps(mut self, steps: [i32; 3]) -> Self {
        self.progress_steps = Some(steps);
        self
    }

    pub fn on_success(mut self, f: impl FnOnce(&T) + Send + 'a) -> Self {
        self.on_success = Some(Box::new(f));
        self
    }

    pub fn on_error(mut self, f: impl FnOnce(&E) + Send + 'a) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }
}

/// Drives a [`NavigationController`] and a [`Router`] together.
pub struct Navigator<'a> {
    controller: &'a NavigationController,
    router: &'a dyn Router,
    profile: EasingProfile,
}

impl<'a> Navigator<'a> {
    pub fn new(
        controller: &'a NavigationController,
        router: &'a dyn Router,
        profile: EasingProfile,
    ) -> Self {
        Self {
            controller,
            router,
            profile,
        }
    }

    pub fn profile(&self) -> &EasingProfile {
        &self.profile
    }

    /// Navigates to `href` once `fetch` resolves.
    ///
    /// On failure the navigation is cancelled, the user stays where they are
    /// and the fetch's own error is returned unchanged.
    pub async fn navigate_with_api<T, E, F>(
        &self,
        href: &str,
        fetch: F,
        options: NavigateOptions<'_, T, E>,
    ) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
    {
        let [first, second, third] = options
            .progress_steps
            .unwrap_or(self.profile.progress_steps);

        info!("Navigation to {} started", href);
        self.controller.start_navigation(href);
        self.controller.update_progress(first);

        match fetch.await {
            Ok(data) => {
                self.controller.update_progress(second);
                if let Some(on_success) = options.on_success {
                    on_success(&data);
                }
                self.controller.update_progress(third);

                pause(self.profile.settle).await;
                self.controller.update_progress(100);

                pause(self.profile.navigate_delay).await;
                debug!("Router navigating to {}", href);
                self.router.navigate(href).await;

                pause(self.profile.complete_delay).await;
                self.controller.complete_navigation();
                info!("Navigation to {} complete", href);
                Ok(data)
            }
            Err(e) => {
                warn!("Navigation to {} failed: data fetch rejected", href);
                if let Some(on_error) = options.on_error {
                    on_error(&e);
                }
                self.controller.cancel_navigation();
                Err(e)
            }
        }
    }
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::navigation::NavigationState;
    use crate::test_support::RecordingRouter;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn test_success_completes_and_navigates() {
        let controller = NavigationController::new();
        let router = RecordingRouter::default();
        let navigator = Navigator::new(&controller, &router, EasingProfile::instant());

        let result: Result<u32, String> = navigator
            .navigate_with_api("/jobs/7", async { Ok(7) }, NavigateOptions::default())
            .await;

        assert_eq!(result, Ok(7));
        assert_eq!(router.visited(), vec!["/jobs/7".to_string()]);
        assert_eq!(
            controller.snapshot(),
            NavigationState {
                is_navigating: false,
                progress: 100,
                pending_href: Some("/jobs/7".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_failure_cancels_and_returns_original_error() {
        let controller = NavigationController::new();
        let router = RecordingRouter::default();
        let navigator = Navigator::new(&controller, &router, EasingProfile::instant());
        let seen = Arc::new(Mutex::new(None));
        let seen_in_hook = Arc::clone(&seen);

        let result: Result<(), String> = navigator
            .navigate_with_api(
                "/companies",
                async { Err("503 from jobs API".to_string()) },
                NavigateOptions::default()
                    .on_error(move |e: &String| *seen_in_hook.lock().unwrap() = Some(e.clone())),
            )
            .await;

        assert_eq!(result, Err("503 from jobs API".to_string()));
        assert_eq!(seen.lock().unwrap().as_deref(), Some("503 from jobs API"));
        assert!(router.visited().is_empty());
        assert_eq!(controller.snapshot(), NavigationState::default());
    }

    #[tokio::test]
    async fn test_progress_follows_custom_steps_in_order() {
        let controller = NavigationController::new();
        let router = RecordingRouter::default();
        let navigator = Navigator::new(&controller, &router, EasingProfile::instant());
        let observed = Arc::new(Mutex::new(Vec::new()));

        // Progress seen while the fetch runs, then inside the success hook
        let during_fetch = {
            let observed = Arc::clone(&observed);
            let controller = &controller;
            async move {
                observed.lock().unwrap().push(controller.snapshot().progress);
                Ok::<_, ()>("payload")
            }
        };
        let in_hook = Arc::clone(&observed);
        let hook_controller = &controller;

        let result = navigator
            .navigate_with_api(
                "/resume",
                during_fetch,
                NavigateOptions::default()
                    .with_steps([10, 20, 80])
                    .on_success(move |_: &&str| {
                        in_hook
                            .lock()
                            .unwrap()
                            .push(hook_controller.snapshot().progress)
                    }),
            )
            .await;

        tokio_test::assert_ok!(result);
        assert_eq!(*observed.lock().unwrap(), vec![10, 20]);
        assert_eq!(controller.snapshot().progress, 100);
    }

    #[tokio::test]
    async fn test_router_sees_full_progress_before_completion() {
        let controller = NavigationController::new();
        let router = RecordingRouter::default();
        let navigator = Navigator::new(&controller, &router, EasingProfile::instant());
        router.attach(controller.subscribe());

        let _: Result<(), ()> = navigator
            .navigate_with_api("/dashboard", async { Ok(()) }, NavigateOptions::default())
            .await;

        let seen = router.states_at_navigate();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].is_navigating);
        assert_eq!(seen[0].progress, 100);
    }

    #[test]
    fn test_default_profile_values() {
        let profile = EasingProfile::default();
        assert_eq!(profile.progress_steps, [30, 60, 90]);
        assert_eq!(profile.settle, Duration::from_millis(300));
        assert_eq!(profile.navigate_delay, Duration::from_millis(400));
        assert_eq!(profile.complete_delay, Duration::from_millis(500));
        assert!(EasingProfile::instant().complete_delay.is_zero());
    }
}
