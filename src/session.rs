//! Client-side session holder.
//!
//! One holder is built at start-up and shared by everything that needs the
//! bearer token. Listeners get every change exactly once, in the order the
//! holder applied them; late subscribers see no replay and read
//! [`SessionHolder::current`] instead.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::models::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionChange {
    pub event: AuthEvent,
    pub session: Option<Session>,
}

#[derive(Default)]
struct Inner {
    current: Option<Session>,
    listeners: BTreeMap<u64, UnboundedSender<SessionChange>>,
    next_id: u64,
}

#[derive(Default)]
pub struct SessionHolder {
    inner: Mutex<Inner>,
}

pub struct Subscription {
    id: u64,
    rx: UnboundedReceiver<SessionChange>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Next change, or `None` once unsubscribed and drained.
    pub async fn recv(&mut self) -> Option<SessionChange> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<SessionChange> {
        match self.rx.try_recv() {
            Ok(change) => Some(change),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

impl SessionHolder {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn current(&self) -> Option<Session> {
        self.lock().current.clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.lock().current.as_ref().map(|s| s.access_token.clone())
    }

    pub fn is_signed_in(&self) -> bool {
        self.lock().current.is_some()
    }

    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.insert(id, tx);
        Subscription { id, rx }
    }

    /// Stops delivery to `subscription`. Changes already queued stay readable.
    pub fn unsubscribe(&self, subscription: &Subscription) {
        self.lock().listeners.remove(&subscription.id);
    }

    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    /// Records a change and fans it out. The lock is held across delivery so
    /// every listener sees changes in the order they were applied.
    pub fn emit(&self, event: AuthEvent, session: Option<Session>) {
        let mut inner = self.lock();
        Self::emit_locked(&mut inner, event, session);
    }

    fn emit_locked(inner: &mut Inner, event: AuthEvent, session: Option<Session>) {
        inner.current = session.clone();
        let change = SessionChange { event, session };

        // Dropped receivers are pruned on the way.
        inner
            .listeners
            .retain(|_, tx| tx.send(change.clone()).is_ok());
        debug!(?event, listeners = inner.listeners.len(), "Session change delivered");
    }

    pub fn set(&self, session: Session) {
        self.emit(AuthEvent::SignedIn, Some(session));
    }

    /// Drops the session. Nothing is emitted when there was none, so
    /// concurrent callers produce a single `SignedOut`.
    pub fn clear(&self) {
        let mut inner = self.lock();
        if inner.current.is_some() {
            Self::emit_locked(&mut inner, AuthEvent::SignedOut, None);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Collection,
}

impl Screen {
    pub fn for_session(session: Option<&Session>) -> Self {
        match session {
            Some(_) => Screen::Collection,
            None => Screen::Login,
        }
    }
}

/// Decides which screen is shown: the list while a session is present,
/// the login form otherwise.
pub struct AuthGate {
    subscription: Subscription,
    screen: Screen,
}

impl AuthGate {
    pub fn new(holder: &SessionHolder) -> Self {
        let subscription = holder.subscribe();
        let screen = Screen::for_session(holder.current().as_ref());
        Self { subscription, screen }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Waits for the next change and returns the screen it leads to.
    pub async fn next(&mut self) -> Option<Screen> {
        let change = self.subscription.recv().await?;
        self.screen = Screen::for_session(change.session.as_ref());
        Some(self.screen)
    }

    /// Applies queued changes without waiting.
    pub fn poll(&mut self) -> Screen {
        while let Some(change) = self.subscription.try_recv() {
            self.screen = Screen::for_session(change.session.as_ref());
        }
        self.screen
    }

    pub fn close(self, holder: &SessionHolder) {
        holder.unsubscribe(&self.subscription);
    }
}
