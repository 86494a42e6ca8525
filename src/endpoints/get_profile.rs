use crate::{endpoints::EndpointError, User};
use reqwest::Client;
use url::Url;

/// Fetch the signed-in user's profile record from the backend.
pub async fn get_profile(
    client: &Client,
    base: &Url,
    access_token: &str,
) -> Result<User, EndpointError> {
    let url = base.join("/api/users/profile")?;

    log::debug!("Fetching the profile from {}", url);

    let response = super::send(client.get(url).bearer_auth(access_token)).await?;

    let body = response.text().await?;
    log::trace!("Response: {}", body);

    let user: User = serde_json::from_str(&body)?;

    Ok(user)
}
