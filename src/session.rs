//! Per-user conversation state.
//!
//! A session only remembers which catalog item the user last selected. It is
//! created lazily on first write, overwritten on every new selection and never
//! explicitly deleted; a process restart clears all sessions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use teloxide::types::UserId;
use tokio::sync::RwLock;

/// Transient per-user record of the current selection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub selected_item: Option<String>,
}

/// In-memory key-value store of sessions, keyed by Telegram user id.
///
/// The narrow `get`/`set_selection` surface keeps the controller independent
/// of the backing store. Handlers run as concurrent tasks, so access goes
/// through an `RwLock`; `set_selection` is last-write-wins.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<UserId, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the user's session, or an empty default if none exists yet.
    pub async fn get(&self, user_id: UserId) -> Session {
        self.inner
            .read()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Unconditionally records `item_id` as the user's current selection.
    pub async fn set_selection(&self, user_id: UserId, item_id: &str) {
        let mut sessions = self.inner.write().await;
        let session = sessions.entry(user_id).or_default();
        session.selected_item = Some(item_id.to_string());
    }
}
