//! Change observer registry

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tabula_content::{ContentUri, ObserverToken};

type Callback = Arc<dyn Fn(&ContentUri) + Send + Sync>;

struct Registration {
    token: ObserverToken,
    uri: ContentUri,
    notify_for_descendants: bool,
    callback: Callback,
}

impl Registration {
    fn matches(&self, uri: &ContentUri) -> bool {
        self.uri == *uri || (self.notify_for_descendants && self.uri.is_ancestor_of(uri))
    }
}

#[derive(Clone, Default)]
pub struct ObserverRegistry {
    registrations: Arc<RwLock<Vec<Registration>>>,
    next_token: Arc<AtomicU64>,
}

impl ObserverRegistry {
    pub fn register(
        &self,
        uri: ContentUri,
        notify_for_descendants: bool,
        callback: Callback,
    ) -> ObserverToken {
        let token = ObserverToken::new(self.next_token.fetch_add(1, Ordering::Relaxed) + 1);

        self.registrations.write().push(Registration {
            token,
            uri,
            notify_for_descendants,
            callback,
        });

        token
    }

    pub fn unregister(&self, token: ObserverToken) -> bool {
        let mut registrations = self.registrations.write();
        let before = registrations.len();
        registrations.retain(|r| r.token != token);
        registrations.len() != before
    }

    /// Invoke every observer of `uri` except `origin`. Returns how many ran.
    pub fn notify(&self, uri: &ContentUri, origin: Option<ObserverToken>) -> usize {
        // Collect first so callbacks run without the lock held
        let callbacks: Vec<Callback> = self
            .registrations
            .read()
            .iter()
            .filter(|r| Some(r.token) != origin && r.matches(uri))
            .map(|r| Arc::clone(&r.callback))
            .collect();

        for callback in &callbacks {
            callback(uri);
        }

        callbacks.len()
    }

    pub fn count(&self) -> usize {
        self.registrations.read().len()
    }
}
