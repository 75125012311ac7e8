//! ``src/auth/session.rs``
//! ============================================================================
//! # Sign-In State Capability
//!
//! The file manager only needs to know whether somebody is signed in. A
//! provider publishes that through `AuthSubscription`s; each subscription
//! yields the current state first, then every change, until it is torn down
//! with `unsubscribe` or dropped.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub uid: CompactString,
    pub display_name: CompactString,
}

impl AuthUser {
    #[must_use]
    pub fn new(name: impl Into<CompactString>) -> Self {
        let display_name: CompactString = name.into();

        Self {
            uid: CompactString::new(display_name.to_lowercase()),
            display_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(AuthUser),
    SignedOut,
}

impl From<Option<AuthUser>> for AuthEvent {
    fn from(user: Option<AuthUser>) -> Self {
        user.map_or(Self::SignedOut, Self::SignedIn)
    }
}

/// Source of sign-in state changes.
pub trait AuthProvider: Send + Sync {
    fn subscribe(&self) -> AuthSubscription;

    fn current(&self) -> Option<AuthUser>;

    fn sign_in(&self, user: AuthUser);

    fn sign_out(&self);
}

/// Live subscription to sign-in changes.
#[derive(Debug)]
pub struct AuthSubscription {
    rx: Option<watch::Receiver<Option<AuthUser>>>,
    initial_sent: bool,
}

impl AuthSubscription {
    #[must_use]
    pub const fn new(rx: watch::Receiver<Option<AuthUser>>) -> Self {
        Self {
            rx: Some(rx),
            initial_sent: false,
        }
    }

    /// Next sign-in event. The first call resolves immediately with the
    /// current state. `None` once unsubscribed or the provider is gone.
    pub async fn changed(&mut self) -> Option<AuthEvent> {
        let rx = self.rx.as_mut()?;

        if !self.initial_sent {
            self.initial_sent = true;
            return Some(rx.borrow_and_update().clone().into());
        }

        if rx.changed().await.is_err() {
            debug!("Auth provider dropped, ending subscription");
            self.rx = None;
            return None;
        }

        Some(rx.borrow_and_update().clone().into())
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.rx.is_some()
    }

    /// Stop receiving events.
    pub fn unsubscribe(&mut self) {
        self.rx = None;
    }
}

/// In-process provider driven by explicit sign-in / sign-out calls.
#[derive(Debug)]
pub struct SessionAuth {
    tx: watch::Sender<Option<AuthUser>>,
}

impl SessionAuth {
    #[must_use]
    pub fn new(initial: Option<AuthUser>) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for SessionAuth {
    fn default() -> Self {
        Self::new(None)
    }
}

impl AuthProvider for SessionAuth {
    fn subscribe(&self) -> AuthSubscription {
        AuthSubscription::new(self.tx.subscribe())
    }

    fn current(&self) -> Option<AuthUser> {
        self.tx.borrow().clone()
    }

    fn sign_in(&self, user: AuthUser) {
        info!(uid = %user.uid, "User signed in");
        self.tx.send_replace(Some(user));
    }

    fn sign_out(&self) {
        info!("User signed out");
        self.tx.send_replace(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_event_is_current_state() {
        let auth = SessionAuth::new(Some(AuthUser::new("Ada")));
        let mut sub = auth.subscribe();

        assert_eq!(sub.changed().await, Some(AuthEvent::SignedIn(AuthUser::new("Ada"))));
    }

    #[tokio::test]
    async fn sign_out_is_delivered() {
        let auth = SessionAuth::new(Some(AuthUser::new("Ada")));
        let mut sub = auth.subscribe();
        sub.changed().await;

        auth.sign_out();

        assert_eq!(sub.changed().await, Some(AuthEvent::SignedOut));
        assert_eq!(auth.current(), None);
    }

    #[tokio::test]
    async fn unsubscribe_tears_down_receiver() {
        let auth = SessionAuth::default();
        let mut sub = auth.subscribe();
        assert_eq!(auth.subscriber_count(), 1);

        sub.unsubscribe();

        assert!(!sub.is_active());
        assert_eq!(auth.subscriber_count(), 0);
        assert_eq!(sub.changed().await, None);
    }

    #[tokio::test]
    async fn dropped_provider_ends_subscription() {
        let auth = SessionAuth::default();
        let mut sub = auth.subscribe();
        sub.changed().await;

        drop(auth);

        assert_eq!(sub.changed().await, None);
        assert!(!sub.is_active());
    }
}
