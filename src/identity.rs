//! The identity provider seam.
//!
//! The session synchronizer talks to whatever implements
//! [`IdentityProvider`]; [`HttpIdentity`] is the real client for a
//! GoTrue-style JSON surface. The provider owns the canonical session and a
//! broadcast channel of [`AuthEvent`]s that every interested party can
//! subscribe to.

use crate::{endpoints, endpoints::EndpointError, Session};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_derive::Deserialize;
use std::sync::Mutex;
use tokio::sync::broadcast;
use url::Url;

/// A notification from the identity provider.
#[derive(Debug, Clone)]
pub enum AuthEvent {
    /// A session was established.
    SignedIn(Session),
    /// The session ended; carries whatever session the provider still
    /// reports (normally nothing).
    SignedOut(Option<Session>),
    /// The access token was swapped without the identity changing.
    TokenRefreshed(Session),
}

/// The identity provider's own user record, distinct from the backend
/// profile.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IdentityUser {
    pub id: String,
    pub email: String,
}

/// Errors coming back from the identity provider.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The provider rejected the email/password pair.
    #[error("Invalid login credentials")]
    InvalidCredentials,
    /// The provider refused the request for some other reason.
    #[error("The identity provider refused the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error(transparent)]
    Endpoint(#[from] EndpointError),
}

/// What the session synchronizer needs from an identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The session currently held by the provider's client, if any.
    async fn current_session(&self) -> Result<Option<Session>, IdentityError>;

    /// Register a new account.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> Result<IdentityUser, IdentityError>;

    /// Check credentials and establish a session. State updates arrive
    /// through the event stream, not the return value.
    async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(), IdentityError>;

    /// End the current session.
    async fn sign_out(&self) -> Result<(), IdentityError>;

    /// Subscribe to auth events for as long as the receiver is held.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}

/// An HTTP identity provider client.
pub struct HttpIdentity {
    client: Client,
    base: Url,
    session: Mutex<Option<Session>>,
    events: broadcast::Sender<AuthEvent>,
}

impl HttpIdentity {
    pub fn new(client: Client, base: Url) -> HttpIdentity {
        let (events, _) = broadcast::channel(16);

        HttpIdentity {
            client,
            base,
            session: Mutex::new(None),
            events,
        }
    }

    fn emit(&self, event: AuthEvent) {
        // nobody listening is fine
        let _ = self.events.send(event);
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentity {
    async fn current_session(&self) -> Result<Option<Session>, IdentityError> {
        Ok(self.session.lock().unwrap().clone())
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> Result<IdentityUser, IdentityError> {
        endpoints::sign_up(&self.client, &self.base, email, password)
            .await
            .map_err(refused)
    }

    async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(), IdentityError> {
        let response =
            endpoints::password_grant(&self.client, &self.base, email, password)
                .await
                .map_err(|err| match err {
                    EndpointError::Api { status, message }
                        if status == 400 || status == 401 =>
                    {
                        log::error!(
                            "Sign-in rejected ({}): {}",
                            status,
                            message
                        );
                        IdentityError::InvalidCredentials
                    }
                    other => refused(other),
                })?;

        let session = response.into_session(Utc::now());
        *self.session.lock().unwrap() = Some(session.clone());
        self.emit(AuthEvent::SignedIn(session));

        Ok(())
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        let token = self
            .session
            .lock()
            .unwrap()
            .as_ref()
            .map(|session| session.access_token.clone());

        // The session stays put until the server accepts the revocation.
        if let Some(token) = token {
            endpoints::sign_out(&self.client, &self.base, &token)
                .await
                .map_err(refused)?;
        }

        *self.session.lock().unwrap() = None;
        self.emit(AuthEvent::SignedOut(None));

        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

fn refused(err: EndpointError) -> IdentityError {
    match err {
        EndpointError::Api { status, message } => {
            log::error!(
                "The identity provider refused the request ({}): {}",
                status,
                message
            );
            IdentityError::Rejected { status, message }
        }
        other => IdentityError::Endpoint(other),
    }
}
