use crate::{endpoints::EndpointError, IdentityUser, Session};
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde_derive::{Deserialize, Serialize};
use url::Url;

/// Exchange an email/password pair for a fresh session payload.
pub async fn password_grant(
    client: &Client,
    base: &Url,
    email: &str,
    password: &str,
) -> Result<TokenResponse, EndpointError> {
    let mut url = base.join("/auth/v1/token")?;
    url.query_pairs_mut().append_pair("grant_type", "password");

    let data = Data { email, password };
    log::debug!("Requesting a password-grant token from {}", url);
    // the payload carries the password, so no trace logging here

    let response = super::send(client.post(url).json(&data)).await?;

    let body = response.text().await?;
    let doc: TokenResponse = serde_json::from_str(&body)?;
    log::info!("Signed in as {}", doc.user.email);

    Ok(doc)
}

#[derive(Debug, Copy, Clone, Serialize)]
struct Data<'a> {
    email: &'a str,
    password: &'a str,
}

/// The session payload returned by the password grant.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub expires_at: Option<i64>,
    pub refresh_token: Option<String>,
    pub user: IdentityUser,
}

impl TokenResponse {
    /// Turn the wire payload into a [`Session`], pinning the expiry to a
    /// concrete instant.
    pub fn into_session(self, now: DateTime<Utc>) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or_else(|| now + Duration::seconds(self.expires_in));

        Session {
            user_id: self.user.id,
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
        }
    }
}
