use crate::{endpoints::EndpointError, IdentityUser};
use reqwest::Client;
use serde_derive::Serialize;
use url::Url;

/// Register a new account with the identity provider.
pub async fn sign_up(
    client: &Client,
    base: &Url,
    email: &str,
    password: &str,
) -> Result<IdentityUser, EndpointError> {
    let url = base.join("/auth/v1/signup")?;
    let data = Data { email, password };

    log::debug!("Sending a sign-up request to {}", url);

    let response = super::send(client.post(url).json(&data)).await?;

    let body = response.text().await?;
    log::trace!("Response: {}", body);

    let user: IdentityUser = serde_json::from_str(&body)?;
    log::info!("Registered a new identity for {}", user.email);

    Ok(user)
}

#[derive(Debug, Copy, Clone, Serialize)]
struct Data<'a> {
    email: &'a str,
    password: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_happy_sign_up_response() {
        let src = include_str!("sign_up_response_okay.json");
        let should_be = IdentityUser {
            id: String::from("7c9e6679-7425-40de-944b-e07fc1f90ae7"),
            email: String::from("a@b.com"),
        };

        let got: IdentityUser = serde_json::from_str(src).unwrap();

        assert_eq!(got, should_be);
    }
}
