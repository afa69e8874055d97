use std::sync::Arc;

use super::{session::SessionStore, store::CredentialStore};

/// Shared auth dependencies handed to every request.
pub struct AuthState {
    store: Arc<dyn CredentialStore>,
    sessions: SessionStore,
}

impl AuthState {
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>, sessions: SessionStore) -> Self {
        Self { store, sessions }
    }

    #[must_use]
    pub fn store(&self) -> &dyn CredentialStore {
        self.store.as_ref()
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }
}
