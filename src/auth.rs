//! Session synchronization between the identity provider and the backend.
//!
//! [`SessionProvider`] keeps a process-wide `{user, session, loading}`
//! snapshot consistent with the identity provider's event stream. A single
//! background task consumes events and applies them in order; profile
//! fetches triggered by an event carry a sequence number, and a response
//! that has been superseded by a newer event is discarded instead of
//! overwriting fresher state.

use crate::{
    AuthEvent, Backend, BackendError, IdentityError, IdentityProvider,
    NewProfile, ProfileUpdate, Session, User,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, oneshot, watch};
use tokio::task::JoinHandle;

/// Errors surfaced by the explicit [`SessionProvider`] calls.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The call needs a signed-in user and none is loaded.
    #[error("Not signed in")]
    Unauthenticated,
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// A snapshot of the client's authentication state.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    /// The backend profile. Only ever populated while a session is held;
    /// the reverse can be false between a sign-in and the profile fetch
    /// resolving.
    pub user: Option<User>,
    /// The identity provider's session, mirrored read-only.
    pub session: Option<Session>,
    /// Raised until the initial session restore resolves, and again around
    /// the explicit sign-up/sign-in calls.
    pub loading: bool,
}

impl AuthState {
    pub fn status(&self) -> AuthStatus {
        if self.loading {
            AuthStatus::Loading
        } else if self.session.is_some() {
            AuthStatus::Authenticated
        } else {
            AuthStatus::Anonymous
        }
    }
}

/// Where the per-tab state machine currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    Loading,
    Authenticated,
    Anonymous,
}

struct StateCell {
    current: AuthState,
    tx: watch::Sender<AuthState>,
}

struct Inner {
    identity: Arc<dyn IdentityProvider>,
    backend: Arc<dyn Backend>,
    state: Mutex<StateCell>,
    snapshot: watch::Receiver<AuthState>,
    seq: AtomicU64,
}

impl Inner {
    fn update(&self, apply: impl FnOnce(&mut AuthState)) {
        let mut cell = self.state.lock().unwrap();
        apply(&mut cell.current);
        let _ = cell.tx.broadcast(cell.current.clone());
    }

    fn read(&self) -> AuthState {
        self.state.lock().unwrap().current.clone()
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, seq: u64) -> bool {
        self.seq.load(Ordering::SeqCst) == seq
    }
}

/// Process-wide authentication state, kept in step with the identity
/// provider's event stream.
///
/// Construct one at startup with [`SessionProvider::spawn`] and hand it to
/// whatever needs identity. [`close`][SessionProvider::close] (or dropping
/// the provider) releases the event subscription; it is held nowhere else.
pub struct SessionProvider {
    inner: Arc<Inner>,
    shutdown: Mutex<Option<oneshot::Sender<()>>>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl SessionProvider {
    /// Subscribe to the provider's events, restore any existing session and
    /// start the listener task.
    pub fn spawn(
        identity: Arc<dyn IdentityProvider>,
        backend: Arc<dyn Backend>,
    ) -> SessionProvider {
        let initial = AuthState {
            user: None,
            session: None,
            loading: true,
        };
        let (tx, snapshot) = watch::channel(initial.clone());
        let inner = Arc::new(Inner {
            identity,
            backend,
            state: Mutex::new(StateCell {
                current: initial,
                tx,
            }),
            snapshot,
            seq: AtomicU64::new(0),
        });

        // Subscribe before the restore so no event slips between the two.
        let events = inner.identity.subscribe();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let listener =
            tokio::spawn(run(Arc::clone(&inner), events, shutdown_rx));

        SessionProvider {
            inner,
            shutdown: Mutex::new(Some(shutdown_tx)),
            listener: Mutex::new(Some(listener)),
        }
    }

    pub fn current_user(&self) -> Option<User> {
        self.inner.read().user
    }

    pub fn current_session(&self) -> Option<Session> {
        self.inner.read().session
    }

    pub fn is_loading(&self) -> bool {
        self.inner.read().loading
    }

    pub fn status(&self) -> AuthStatus {
        self.inner.read().status()
    }

    /// Watch for state changes. The receiver always starts with the latest
    /// snapshot; intermediate snapshots may be coalesced.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.inner.snapshot.clone()
    }

    /// Wait until the initial session restore has resolved.
    pub async fn ready(&self) {
        let mut changes = self.subscribe();
        loop {
            let loading = changes.borrow().loading;
            if !loading {
                return;
            }
            if changes.recv().await.is_none() {
                return;
            }
        }
    }

    /// Create an account with the identity provider, then its backend
    /// profile record with `extra` merged in.
    ///
    /// If the profile creation fails the identity account is left behind;
    /// there is no rollback.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        extra: ProfileUpdate,
    ) -> Result<(), AuthError> {
        self.inner.update(|state| state.loading = true);
        let result = self.do_sign_up(email, password, extra).await;
        self.inner.update(|state| state.loading = false);

        if let Err(error) = &result {
            log::error!("Error signing up: {}", error);
        }
        result
    }

    async fn do_sign_up(
        &self,
        email: &str,
        password: &str,
        extra: ProfileUpdate,
    ) -> Result<(), AuthError> {
        let identity = self.inner.identity.sign_up(email, password).await?;
        let profile = NewProfile {
            id: identity.id,
            email: identity.email,
            extra,
        };
        self.inner.backend.create_profile(&profile).await?;

        Ok(())
    }

    /// Check credentials with the identity provider.
    ///
    /// The profile arrives asynchronously through the event stream, so
    /// `current_user` can briefly lag a successful return.
    pub async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(), AuthError> {
        self.inner.update(|state| state.loading = true);
        let result = self.inner.identity.sign_in(email, password).await;
        self.inner.update(|state| state.loading = false);

        if let Err(error) = &result {
            log::error!("Error signing in: {}", error);
        }
        result.map_err(AuthError::from)
    }

    /// End the session. Local state is cleared by the resulting event, not
    /// here.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.inner.identity.sign_out().await.map_err(|error| {
            log::error!("Error signing out: {}", error);
            AuthError::from(error)
        })
    }

    /// Send a partial profile update and adopt the server's representation.
    pub async fn update_profile(
        &self,
        update: &ProfileUpdate,
    ) -> Result<User, AuthError> {
        let state = self.inner.read();
        if state.user.is_none() {
            return Err(AuthError::Unauthenticated);
        }
        let session = state.session.ok_or(AuthError::Unauthenticated)?;

        let user = self
            .inner
            .backend
            .update_profile(&session.access_token, update)
            .await
            .map_err(|error| {
                log::error!("Error updating profile: {}", error);
                AuthError::from(error)
            })?;

        self.inner.update(|state| state.user = Some(user.clone()));

        Ok(user)
    }

    /// Stop the event listener and release the subscription. Idempotent;
    /// later calls are no-ops.
    pub async fn close(&self) {
        let signal = self.shutdown.lock().unwrap().take();
        if let Some(signal) = signal {
            let _ = signal.send(());
        }

        let listener = self.listener.lock().unwrap().take();
        if let Some(listener) = listener {
            let _ = listener.await;
        }
    }
}

impl Drop for SessionProvider {
    fn drop(&mut self) {
        // backstop when close() was never called; never panics mid-drop
        if let Ok(mut guard) = self.shutdown.lock() {
            if let Some(signal) = guard.take() {
                let _ = signal.send(());
            }
        }
    }
}

async fn run(
    inner: Arc<Inner>,
    mut events: broadcast::Receiver<AuthEvent>,
    mut shutdown: oneshot::Receiver<()>,
) {
    restore(&inner).await;

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            event = events.recv() => match event {
                Ok(event) => handle(&inner, event),
                Err(broadcast::RecvError::Lagged(skipped)) => {
                    log::warn!(
                        "Dropped {} auth events; state may lag until the next one",
                        skipped
                    );
                }
                Err(broadcast::RecvError::Closed) => break,
            },
        }
    }

    log::debug!("Auth event listener released");
}

/// Pick up whatever session the provider already holds and mirror it,
/// profile included.
async fn restore(inner: &Arc<Inner>) {
    match inner.identity.current_session().await {
        Ok(Some(session)) => {
            inner.update(|state| state.session = Some(session.clone()));

            match inner.backend.fetch_profile(&session.access_token).await {
                Ok(user) => inner.update(|state| state.user = Some(user)),
                // Signed in with no profile loaded, not an error the UI
                // ever sees.
                Err(error) => {
                    log::error!("Error fetching user profile: {}", error)
                }
            }
        }
        Ok(None) => {}
        Err(error) => log::error!("Error restoring the session: {}", error),
    }

    inner.update(|state| state.loading = false);
}

fn handle(inner: &Arc<Inner>, event: AuthEvent) {
    match event {
        AuthEvent::SignedIn(session) => {
            log::debug!("Signed in; refreshing the profile");
            inner.update(|state| state.session = Some(session.clone()));

            let seq = inner.next_seq();
            let inner = Arc::clone(inner);
            tokio::spawn(async move {
                match inner.backend.fetch_profile(&session.access_token).await
                {
                    Ok(user) => {
                        if inner.is_current(seq) {
                            inner.update(|state| state.user = Some(user));
                        } else {
                            log::debug!(
                                "Discarding a profile superseded by a newer auth event"
                            );
                        }
                    }
                    Err(error) => {
                        log::error!("Error fetching user profile: {}", error)
                    }
                }
            });
        }
        AuthEvent::SignedOut(session) => {
            log::debug!("Signed out; clearing the profile");
            // also invalidates any in-flight profile fetch
            inner.next_seq();
            inner.update(move |state| {
                state.user = None;
                state.session = session;
            });
        }
        AuthEvent::TokenRefreshed(session) => {
            inner.update(|state| state.session = Some(session.clone()));
        }
    }
}
