use jiff::Timestamp;
#[cfg(feature = "mock-time")]
use std::{cell::RefCell, rc::Rc};

/// Dedup window for the course catalog, which changes rarely.
pub const CATALOG_DEDUP_WINDOW_SECS: i64 = 60;
/// Dedup window for everything else, including progress records.
pub const DEFAULT_DEDUP_WINDOW_SECS: i64 = 30;

/// Clock used for dedup-window freshness checks. Single-threaded, like
/// the rest of the core.
#[derive(Clone)]
pub struct TimeSource {
    #[cfg(feature = "mock-time")]
    time: Rc<RefCell<Timestamp>>,
}

impl TimeSource {
    #[allow(clippy::new_without_default)]
    #[cfg(not(feature = "mock-time"))]
    pub fn new() -> Self {
        Self {}
    }

    #[cfg(feature = "mock-time")]
    pub fn new(initial_time: Timestamp) -> Self {
        Self {
            time: Rc::new(RefCell::new(initial_time)),
        }
    }

    #[cfg(not(feature = "mock-time"))]
    pub fn now(&self) -> Timestamp {
        Timestamp::now()
    }

    #[cfg(feature = "mock-time")]
    pub fn now(&self) -> Timestamp {
        *self.time.borrow()
    }

    #[cfg(feature = "mock-time")]
    pub fn advance(&self, duration: jiff::Span) {
        let mut time = self.time.borrow_mut();
        *time += duration;
    }

    #[cfg(feature = "mock-time")]
    pub fn set(&self, time: Timestamp) {
        *self.time.borrow_mut() = time;
    }
}
