//! Notification parser port.

use crate::domain::ParsedNotification;

/// Extracts trade fields from free-form notification text.
///
/// Parsing never fails; fields that cannot be found are left as `None` and
/// validation happens in [`crate::domain::Signal::from_parsed`].
pub trait NotificationParser: Send + Sync {
    fn parse(&self, text: &str) -> ParsedNotification;
}
