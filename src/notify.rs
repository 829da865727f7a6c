//! User-visible notification channel.
//!
//! Business-failure classification writes the server's message here before
//! rejecting, so the UI-visible effect does not depend on the caller handling
//! the error. Applications plug in their own toast/banner implementation.

/// Sink for user-visible success and failure messages.
pub trait Notifier: Send + Sync {
    fn error(&self, message: &str);
    fn success(&self, message: &str);
}

/// Default [`Notifier`] routing messages through `tracing`.
#[derive(Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn error(&self, message: &str) {
        tracing::error!("{}", message);
    }

    fn success(&self, message: &str) {
        tracing::info!("{}", message);
    }
}
