use chrono::{DateTime, Utc};

/// Proof of authentication issued by the identity provider.
///
/// The provider's client owns the canonical copy; everything else in the
/// crate mirrors it read-only for the lifetime of the process.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct Session {
    /// The identity provider's id for the signed-in user.
    pub user_id: String,
    /// The bearer credential attached to backend requests.
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// When the access token stops being accepted.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
