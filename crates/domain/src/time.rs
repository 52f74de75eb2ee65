//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp used for order dates and account creation.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}
