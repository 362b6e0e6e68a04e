use std::sync::Arc;

use chrono::NaiveDate;
use hn_storage::DigestCache;

/// Process-wide context shared by the request handlers.
pub struct AppState {
    pub cache: Arc<DigestCache>,
    today: fn() -> NaiveDate,
}

impl AppState {
    pub fn new(cache: Arc<DigestCache>) -> Self {
        Self {
            cache,
            today: hn_core::today,
        }
    }

    /// Replace the date source used to pick "today's" digest.
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn today(&self) -> NaiveDate {
        (self.today)()
    }
}
