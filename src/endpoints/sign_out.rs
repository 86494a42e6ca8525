use crate::endpoints::EndpointError;
use reqwest::Client;
use url::Url;

/// Tell the identity provider to revoke the current session.
pub async fn sign_out(
    client: &Client,
    base: &Url,
    access_token: &str,
) -> Result<(), EndpointError> {
    let url = base.join("/auth/v1/logout")?;

    log::debug!("Sending a sign-out request to {}", url);

    super::send(client.post(url).bearer_auth(access_token)).await?;

    Ok(())
}
