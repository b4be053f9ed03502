//! Clock port — the only source of "now" for the core.

use std::sync::Arc;

use hostflow_domain::time::{self, Timestamp};

/// Provides the current time.
pub trait Clock: Send + Sync {
    /// Current UTC time.
    fn now(&self) -> Timestamp;
}

/// Clock handle shared between services.
pub type SharedClock = Arc<dyn Clock>;

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        time::now()
    }
}

impl SystemClock {
    /// A [`SystemClock`] behind a [`SharedClock`] handle.
    #[must_use]
    pub fn shared() -> SharedClock {
        Arc::new(Self)
    }
}
