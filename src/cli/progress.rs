//! Text progress bar that follows a [`NavigationController`].
//!
//! [`NavigationController`]: crate::core::NavigationController

use std::io::Write;

use log::warn;
use tokio::sync::watch;

use crate::core::NavigationState;

const BAR_WIDTH: usize = 30;

/// Renders one line, e.g. `[#########.....................]  30% /jobs`.
/// Progress outside 0..=100 is clamped for display only.
pub fn render_bar(state: &NavigationState) -> String {
    let pct = state.progress.clamp(0, 100) as usize;
    let filled = pct * BAR_WIDTH / 100;
    let target = if state.is_navigating {
        state.pending_href.as_deref().unwrap_or("")
    } else {
        ""
    };
    format!(
        "[{}{}] {:>3}% {}",
        "#".repeat(filled),
        ".".repeat(BAR_WIDTH - filled),
        pct,
        target
    )
    .trim_end()
    .to_string()
}

/// Redraws the bar on stderr until the controller is dropped.
pub async fn follow(rx: watch::Receiver<NavigationState>) {
    follow_into(rx, std::io::stderr()).await;
}

/// Redraws the bar on `out` until the controller is dropped. Stops drawing
/// after the first failed write.
pub async fn follow_into<W: Write>(mut rx: watch::Receiver<NavigationState>, mut out: W) {
    loop {
        let line = render_bar(&rx.borrow_and_update());
        if let Err(e) = write!(out, "\r{line}\x1b[K").and_then(|_| out.flush()) {
            warn!("Progress bar disabled: {}", e);
            return;
        }
        if rx.changed().await.is_err() {
            break;
        }
    }
    if let Err(e) = writeln!(out) {
        warn!("Failed to finish progress bar: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_bar_in_flight() {
        let state = NavigationState {
            is_navigating: true,
            progress: 60,
            pending_href: Some("/jobs".to_string()),
        };
        let line = render_bar(&state);
        assert_eq!(line, format!("[{}{}]  60% /jobs", "#".repeat(18), ".".repeat(12)));
    }

    #[test]
    fn test_render_bar_hides_stale_target_after_completion() {
        let state = NavigationState {
            is_navigating: false,
            progress: 100,
            pending_href: Some("/jobs".to_string()),
        };
        assert_eq!(render_bar(&state), format!("[{}] 100%", "#".repeat(30)));
    }

    #[test]
    fn test_render_bar_clamps() {
        let over = NavigationState {
            progress: 250,
            ..Default::default()
        };
        let under = NavigationState {
            progress: -5,
            ..Default::default()
        };
        assert!(render_bar(&over).contains("100%"));
        assert!(render_bar(&under).starts_with(&format!("[{}]   0%", ".".repeat(30))));
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_follow_draws_until_sender_dropped() {
        let (tx, rx) = watch::channel(NavigationState::default());
        drop(tx);

        let mut out = Vec::new();
        follow_into(rx, &mut out).await;

        let text = String::from_utf8_lossy(&out);
        assert!(text.starts_with('\r'));
        assert!(text.contains("  0%"));
        assert!(text.ends_with('\n'));
    }

    #[tokio::test]
    async fn test_follow_stops_on_write_failure() {
        let (tx, rx) = watch::channel(NavigationState::default());
        // Returns even though the sender is still alive
        tokio::time::timeout(std::time::Duration::from_secs(1), follow_into(rx, BrokenPipe))
            .await
            .expect("follow kept running after a failed write");
        drop(tx);
    }
}
