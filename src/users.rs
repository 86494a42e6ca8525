//! Profile records held by the application backend.

use chrono::{DateTime, Utc};
use serde_derive::{Deserialize, Serialize};

/// The backend's profile record for an authenticated identity.
///
/// Keyed by the identity provider's user id. Fetched on sign-in or session
/// restore, replaced wholesale on profile updates, dropped on sign-out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct User {
    /// Shared with the identity provider.
    pub id: String,
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub role: Role,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// How much the backend trusts this account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Verified,
    Admin,
}

/// Body of the profile-creation request sent right after sign-up.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewProfile {
    pub id: String,
    pub email: String,
    #[serde(flatten)]
    pub extra: ProfileUpdate,
}

/// A partial profile update; unset fields are left untouched by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_a_profile_record() {
        let src = r#"{
            "id": "101",
            "email": "john@example.com",
            "username": "john_doe",
            "fullName": "John Doe",
            "role": "verified",
            "avatar": null,
            "createdAt": "2023-01-15T00:00:00Z",
            "updatedAt": "2023-01-15T00:00:00Z"
        }"#;

        let got: User = serde_json::from_str(src).unwrap();

        assert_eq!(got.id, "101");
        assert_eq!(got.full_name, "John Doe");
        assert_eq!(got.role, Role::Verified);
        assert_eq!(got.avatar, None);
    }

    #[test]
    fn new_profile_flattens_the_extra_fields() {
        let profile = NewProfile {
            id: String::from("7"),
            email: String::from("a@b.com"),
            extra: ProfileUpdate {
                full_name: Some(String::from("A")),
                ..ProfileUpdate::default()
            },
        };

        let got = serde_json::to_value(&profile).unwrap();
        let should_be = serde_json::json!({
            "id": "7",
            "email": "a@b.com",
            "fullName": "A",
        });

        assert_eq!(got, should_be);
    }

    #[test]
    fn unset_update_fields_are_not_serialized() {
        let update = ProfileUpdate {
            username: Some(String::from("jo")),
            ..ProfileUpdate::default()
        };

        let got = serde_json::to_string(&update).unwrap();

        assert_eq!(got, r#"{"username":"jo"}"#);
    }
}
