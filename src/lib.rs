//! Client-side state for a campus question-and-answer application.
//!
//! The crate covers the three pieces of the browser client: the session
//! synchronizer ([`SessionProvider`]), the question feed ([`FeedView`]) and
//! the static profile page ([`ProfileSummary`]). Network access goes through
//! the [`IdentityProvider`] and [`Backend`] seams, so everything can run
//! against the real HTTP services or in-memory stand-ins.

#![forbid(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

mod auth;
mod backend;
pub mod endpoints;
mod feed;
mod identity;
mod profile;
mod questions;
mod session;
mod users;

pub use auth::{AuthError, AuthState, AuthStatus, SessionProvider};
pub use backend::{Backend, BackendError, HttpBackend, StaticBackend};
pub use feed::{AuthorBadge, FeedEntry, FeedView};
pub use identity::{
    AuthEvent, HttpIdentity, IdentityError, IdentityProvider, IdentityUser,
};
pub use profile::ProfileSummary;
pub use questions::{FeedFilter, FeedTab, ParseFeedParamError, Question};
pub use session::Session;
pub use users::{NewProfile, ProfileUpdate, Role, User};

/// The default user agent to use when communicating with the backend.
pub const DEFAULT_USER_AGENT: &str =
    concat!(env!("CARGO_PKG_NAME"), "-", env!("CARGO_PKG_VERSION"));
