use crate::{endpoints::EndpointError, NewProfile, User};
use reqwest::Client;
use url::Url;

/// Ask the backend to create the profile record for a freshly signed-up
/// user.
pub async fn create_profile(
    client: &Client,
    base: &Url,
    profile: &NewProfile,
) -> Result<User, EndpointError> {
    let url = base.join("/api/users")?;

    log::debug!("Creating a profile at {}", url);
    log::trace!("Payload: {:#?}", profile);

    let response = super::send(client.post(url).json(profile)).await?;

    let body = response.text().await?;
    log::trace!("Response: {}", body);

    let user: User = serde_json::from_str(&body)?;
    log::info!("Created a profile for {}", user.email);

    Ok(user)
}
