//! User-visible alerts.
//!
//! Notifications are fire-and-forget: the caller never waits for delivery
//! and a failed delivery is logged and dropped.

use notify_rust::{Notification, Timeout};

const APP_NAME: &str = "dwtimer";
const SUMMARY: &str = "DeepWork Timer";

/// Fire-and-forget alert sink.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    /// Request an alert. Must return without waiting for delivery.
    fn notify(&self, message: &str);
}

/// Desktop notifications through the platform notification service.
///
/// Each alert is shown from its own detached thread.
#[derive(Debug, Clone, Copy)]
pub struct DesktopNotifier {
    enabled: bool,
}

impl DesktopNotifier {
    #[must_use]
    pub const fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, message: &str) {
        if !self.enabled {
            tracing::debug!(message, "notifications disabled");
            return;
        }

        let body = message.to_string();
        let spawned = std::thread::Builder::new()
            .name("dwtimer-notify".to_string())
            .spawn(move || {
                let result = Notification::new()
                    .appname(APP_NAME)
                    .summary(SUMMARY)
                    .body(&body)
                    .timeout(Timeout::Milliseconds(5_000))
                    .show();
                if let Err(e) = result {
                    tracing::warn!(error = %e, message = %body, "notification not delivered");
                }
            });

        if let Err(e) = spawned {
            tracing::warn!(error = %e, message, "could not spawn notification thread");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_notifier_returns_immediately() {
        DesktopNotifier::new(false).notify("Task finished: test");
    }
}
