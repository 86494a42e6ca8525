use crate::{endpoints::EndpointError, ProfileUpdate, User};
use reqwest::Client;
use url::Url;

/// Send a partial profile update and get back the server's representation.
pub async fn update_profile(
    client: &Client,
    base: &Url,
    access_token: &str,
    update: &ProfileUpdate,
) -> Result<User, EndpointError> {
    let url = base.join("/api/users/profile")?;

    log::debug!("Updating the profile at {}", url);
    log::trace!("Payload: {:#?}", update);

    let response =
        super::send(client.put(url).bearer_auth(access_token).json(update))
            .await?;

    let body = response.text().await?;
    log::trace!("Response: {}", body);

    let user: User = serde_json::from_str(&body)?;

    Ok(user)
}
