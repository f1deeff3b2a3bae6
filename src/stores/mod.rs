//! Stores module
//!
//! Each store owns its state exclusively. Mutations are applied under a short
//! lock that is never held across an `.await`.

pub mod chat;
pub mod datasets;
pub mod notifications;
pub mod search;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use chat::{ChatMutation, ChatObserver, ChatSessionState, ChatStore};
pub use datasets::{DatasetCacheState, DatasetMutation, DatasetStore};
pub use notifications::{NotificationMutation, NotificationState, NotificationStore};
pub use search::{SearchMutation, SearchSessionState, SearchStore};

/// State stays usable even if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
