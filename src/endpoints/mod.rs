//! The identity provider and backend wire endpoints.

mod create_profile;
mod get_profile;
mod get_questions;
mod sign_out;
mod sign_up;
mod token;
mod update_profile;

pub use create_profile::create_profile;
pub use get_profile::get_profile;
pub use get_questions::get_questions;
pub use sign_out::sign_out;
pub use sign_up::sign_up;
pub use token::{password_grant, TokenResponse};
pub use update_profile::update_profile;

use reqwest::{RequestBuilder, Response, StatusCode};
use serde_derive::Deserialize;

/// Typical endpoint errors.
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    /// The HTTP client encountered an error.
    #[error("Unable to send the request")]
    HttpClient(#[from] reqwest::Error),
    /// Unable to parse the JSON in the response.
    #[error("Unable to parse the response")]
    Json(#[from] serde_json::Error),
    /// Unable to construct the request URL.
    #[error("Unable to construct the request URL")]
    BadUrl(#[from] url::ParseError),
    /// The server answered with a non-success status.
    #[error("The server rejected the request ({status}): {message}")]
    Api { status: u16, message: String },
}

pub(crate) async fn send(
    request: RequestBuilder,
) -> Result<Response, EndpointError> {
    let response = request.send().await?;
    log::trace!("Headers: {:#?}", response.headers());

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    log::debug!("Request failed with {}: {}", status, body);

    Err(EndpointError::Api {
        status: status.as_u16(),
        message: error_message(&body, status),
    })
}

/// Pull a human-readable message out of an error body, whichever of the
/// known shapes the server used.
fn error_message(body: &str, status: StatusCode) -> String {
    #[derive(Debug, Deserialize)]
    struct ErrorBody {
        message: Option<String>,
        error_description: Option<String>,
        msg: Option<String>,
        error: Option<String>,
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        let best = parsed
            .message
            .or(parsed.error_description)
            .or(parsed.msg)
            .or(parsed.error);
        if let Some(message) = best {
            return message;
        }
    }

    if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    } else {
        body.trim().to_string()
    }
}
