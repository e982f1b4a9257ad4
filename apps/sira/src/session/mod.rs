//! Session gate — the identity boundary in front of the form.
//!
//! Any provider that can report the current user, notify on changes and sign
//! out satisfies `SessionGate`. Subscriptions are handles: dropping an
//! `AuthSubscription` unregisters its callback.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::info;

use crate::models::user::User;

pub type AuthCallback = Arc<dyn Fn(Option<&User>) + Send + Sync>;

pub trait SessionGate: Send + Sync {
    fn current_user(&self) -> Option<User>;

    /// Registers `callback` for every sign-in and sign-out until the returned
    /// handle is dropped.
    fn on_auth_change(&self, callback: AuthCallback) -> AuthSubscription;

    fn sign_out(&self);
}

#[derive(Default)]
struct Listeners {
    next_id: u64,
    callbacks: HashMap<u64, AuthCallback>,
}

type SharedListeners = Arc<Mutex<Listeners>>;

fn lock(listeners: &Mutex<Listeners>) -> MutexGuard<'_, Listeners> {
    // Callbacks run outside the lock, so a poisoned map is still consistent.
    listeners.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Unregisters its callback on drop.
#[must_use = "dropping the subscription unsubscribes immediately"]
pub struct AuthSubscription {
    id: u64,
    listeners: Weak<Mutex<Listeners>>,
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            lock(&listeners).callbacks.remove(&self.id);
        }
    }
}

/// In-process identity provider: whoever signs in here is the current user.
#[derive(Default)]
pub struct LocalSessionGate {
    user: Mutex<Option<User>>,
    listeners: SharedListeners,
}

impl LocalSessionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signs `email` in, replacing any current user, and notifies subscribers.
    pub fn sign_in(&self, email: &str) -> User {
        let user = User::new(email.trim());
        *self.user.lock().unwrap_or_else(PoisonError::into_inner) = Some(user.clone());
        info!("Signed in {} ({})", user.email, user.id);
        self.notify(Some(&user));
        user
    }

    fn notify(&self, user: Option<&User>) {
        let callbacks: Vec<AuthCallback> = lock(&self.listeners).callbacks.values().cloned().collect();
        for callback in callbacks {
            callback(user);
        }
    }

    #[cfg(test)]
    fn subscriber_count(&self) -> usize {
        lock(&self.listeners).callbacks.len()
    }
}

impl SessionGate for LocalSessionGate {
    fn current_user(&self) -> Option<User> {
        self.user.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn on_auth_change(&self, callback: AuthCallback) -> AuthSubscription {
        let mut listeners = lock(&self.listeners);
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.callbacks.insert(id, callback);
        AuthSubscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    fn sign_out(&self) {
        let previous = self.user.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(user) = previous {
            info!("Signed out {}", user.email);
            self.notify(None);
        }
    }
}
