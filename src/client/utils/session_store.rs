use std::sync::Arc;

use keyring::Entry;
use log::{debug, warn};

use crate::client::utils::local_store::LocalStore;
use crate::common::errors::{ConsoleError, Result};

const SERVICE: &str = "tp_console";
const USER: &str = "tp_console_session";
const USER_ID_KEY: &str = "userId";

enum Backend {
    /// OS keyring, optionally falling back to the local store.
    Keyring { fallback: Option<Arc<dyn LocalStore>> },
    Local(Arc<dyn LocalStore>),
}

/// Holds the opaque user identifier returned by `/login`.
pub struct SessionStore {
    backend: Backend,
}

impl SessionStore {
    pub fn keyring(store: Arc<dyn LocalStore>, allow_fallback: bool) -> Self {
        let fallback = if allow_fallback { Some(store) } else { None };
        Self { backend: Backend::Keyring { fallback } }
    }

    pub fn local(store: Arc<dyn LocalStore>) -> Self {
        Self { backend: Backend::Local(store) }
    }

    pub fn save(&self, user_id: &str) -> Result<()> {
        match &self.backend {
            Backend::Local(store) => store.set(USER_ID_KEY, user_id),
            Backend::Keyring { fallback } => {
                let entry = Entry::new(SERVICE, USER);
                match entry.set_password(user_id) {
                    Ok(()) => Ok(()),
                    Err(e) => match fallback {
                        Some(store) => {
                            // never log the identifier itself
                            warn!("Keyring unavailable ({}), persisting session to local store", e);
                            store.set(USER_ID_KEY, user_id)
                        }
                        None => Err(ConsoleError::Storage("keyring unavailable and local fallback disabled".to_string())),
                    },
                }
            }
        }
    }

    pub fn load(&self) -> Option<String> {
        let raw = match &self.backend {
            Backend::Local(store) => read_local(store.as_ref()),
            Backend::Keyring { fallback } => match Entry::new(SERVICE, USER).get_password() {
                Ok(t) => Some(t),
                Err(e) => {
                    debug!("No session in keyring: {}", e);
                    fallback.as_ref().and_then(|store| read_local(store.as_ref()))
                }
            },
        };
        raw.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
    }

    pub fn clear(&self) -> Result<()> {
        match &self.backend {
            Backend::Local(store) => store.remove(USER_ID_KEY),
            Backend::Keyring { fallback } => {
                let _ = Entry::new(SERVICE, USER).delete_password();
                if let Some(store) = fallback {
                    store.remove(USER_ID_KEY)?;
                }
                Ok(())
            }
        }
    }

    /// Route guard: the identifier, or `NotAuthenticated`.
    pub fn require_user_id(&self) -> Result<String> {
        self.load().ok_or(ConsoleError::NotAuthenticated)
    }
}

fn read_local(store: &dyn LocalStore) -> Option<String> {
    match store.get(USER_ID_KEY) {
        Ok(v) => v,
        Err(e) => {
            warn!("Failed to read session from local store: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::utils::local_store::MemoryStore;

    #[test]
    fn local_session_lifecycle() {
        let store: Arc<dyn LocalStore> = Arc::new(MemoryStore::new());
        let session = SessionStore::local(store.clone());

        assert!(matches!(session.require_user_id(), Err(ConsoleError::NotAuthenticated)));

        session.save("user-42").unwrap();
        assert_eq!(session.load().as_deref(), Some("user-42"));
        assert_eq!(session.require_user_id().unwrap(), "user-42");

        session.clear().unwrap();
        assert_eq!(session.load(), None);
        // clearing twice is fine
        session.clear().unwrap();
    }

    #[test]
    fn blank_identifier_counts_as_signed_out() {
        let store: Arc<dyn LocalStore> = Arc::new(MemoryStore::new());
        store.set(USER_ID_KEY, "   ").unwrap();
        let session = SessionStore::local(store);
        assert_eq!(session.load(), None);
    }
}
