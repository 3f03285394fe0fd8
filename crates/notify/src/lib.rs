//! Appointment confirmation delivery.

pub mod courier;
pub mod notice;

use intake_core::domain::fields::ConfirmationFields;
use tracing::{error, info};

pub use courier::{CourierNotifier, Notifier, NotifyError};
pub use notice::ConfirmationNotice;

/// Sends the confirmation for one call and reports whether it was accepted.
/// Failures are logged, never returned, and nothing is retried.
pub async fn dispatch_confirmation(notifier: &dyn Notifier, fields: &ConfirmationFields) -> bool {
    let notice = ConfirmationNotice::for_fields(fields);

    match notifier.send(&notice).await {
        Ok(()) => {
            info!(event_name = "notify.confirmation.sent", "appointment confirmation sent");
            true
        }
        Err(err) => {
            error!(
                event_name = "notify.confirmation.failed",
                error = %err,
                "appointment confirmation could not be sent"
            );
            false
        }
    }
}
