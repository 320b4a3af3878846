//! Collaborator traits supplied by the surrounding framework.
//!
//! Strategies never perform HTTP redirects or persist per-flow values
//! themselves; they hand those side effects to the caller through these
//! traits. Implementations live with the host application (web framework
//! session, response writer, ...), not in this workspace.

/// Opaque key/value store for per-flow values.
///
/// Used to persist values that must survive the redirect round-trip to the
/// provider's consent page, e.g. the anti-forgery `state` token the caller
/// verifies on callback.
pub trait Session: Send + Sync {
    /// Stores a value under the given key, replacing any previous value.
    fn store(&self, key: &str, value: &str);

    /// Loads the value stored under the given key, if any.
    fn load(&self, key: &str) -> Option<String>;
}

/// Performs the actual HTTP redirect to a provider URL.
///
/// `login` is terminal once this has been invoked: in a correct flow no
/// further statements of the login step execute afterwards.
pub trait Router: Send + Sync {
    /// Redirects the current request to the given URL.
    fn redirect(&self, url: &str);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct MapSession(Mutex<std::collections::HashMap<String, String>>);

    impl Session for MapSession {
        fn store(&self, key: &str, value: &str) {
            self.0.lock().unwrap().insert(key.into(), value.into());
        }

        fn load(&self, key: &str) -> Option<String> {
            self.0.lock().unwrap().get(key).cloned()
        }
    }

    #[test]
    fn session_store_and_load() {
        let session = MapSession(Mutex::new(Default::default()));
        session.store("oauth_state", "xyzzy");
        assert_eq!(session.load("oauth_state").as_deref(), Some("xyzzy"));
        assert!(session.load("missing").is_none());
    }
}
