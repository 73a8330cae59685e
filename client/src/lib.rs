//! Client-side progress synchronization for the course catalog front end.
//!
//! Three independently-fetched resources (the course catalog, the current
//! user's enrollment list, and per-course progress records) are cached by
//! stable key, gated by authentication state, combined into view-ready
//! derived values, and kept consistent after mutations through targeted
//! invalidation rather than full reloads.

pub mod api;
pub mod derived;
pub mod gate;
pub mod logs;
mod mutations;
pub mod notify;
mod resources;
pub mod state;
pub mod time;

pub use api::CourseApi;
pub use mutations::MutationError;
pub use notify::{Notice, NoticeLevel, Notifier, NullNotifier};
pub use resources::{CourseDetail, WorkoutDetail};
pub use state::{FetchState, KeyState, Resource, ResourceKey, State};
pub use time::TimeSource;

use std::cell::RefCell;
use std::rc::Rc;

use payloads::TokenStore;

/// Owns the cache store and coordinates fetching, derivation, and
/// mutation for one browser-tab-like session.
///
/// Single-threaded by design: the store lives behind `Rc<RefCell<_>>` and
/// no borrow is held across an await point, so every read/recompute/write
/// between suspension points is effectively atomic.
pub struct SyncClient<A: CourseApi> {
    api: A,
    tokens: Rc<dyn TokenStore>,
    notifier: Rc<dyn Notifier>,
    time: TimeSource,
    state: Rc<RefCell<State>>,
}

impl<A: CourseApi> SyncClient<A> {
    pub fn new(api: A, tokens: Rc<dyn TokenStore>, time: TimeSource) -> Self {
        Self {
            api,
            tokens,
            notifier: Rc::new(NullNotifier),
            time,
            state: Rc::new(RefCell::new(State::default())),
        }
    }

    /// Attach the notification collaborator mutation outcomes are
    /// reported to.
    pub fn with_notifier(mut self, notifier: Rc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Shared handle to the cache store.
    pub fn state(&self) -> Rc<RefCell<State>> {
        self.state.clone()
    }

    pub(crate) fn has_token(&self) -> bool {
        self.tokens.token().is_some()
    }

    /// Drop all user-scoped cache after the externally-owned token has
    /// been discarded. The catalog and workout stores survive.
    pub fn logout_cleanup(&self) {
        self.state.borrow_mut().logout();
        tracing::debug!("cleared user-scoped cache on logout");
    }
}
