//! vigil-notify — alert delivery.
//!
//! An [`Alert`] carries a title, a markdown body, a [`Severity`] (rendered as
//! an attachment colour) and the time it was raised. A [`Notifier`] delivers
//! it to a destination; [`WebhookNotifier`] posts a Block Kit attachment to an
//! incoming-webhook URL.

pub mod alert;
pub mod error;
pub mod webhook;

use std::future::Future;

pub use alert::{Alert, Severity};
pub use error::NotifyError;
pub use webhook::WebhookNotifier;

/// Delivers alerts. Implementations must not retry.
pub trait Notifier: Send + Sync {
    fn deliver(
        &self,
        destination: &str,
        alert: &Alert,
    ) -> impl Future<Output = Result<(), NotifyError>> + Send;
}
