//! The application backend seam.
//!
//! [`HttpBackend`] speaks the real REST surface. [`StaticBackend`] is the
//! explicit stand-in for the sample-data path the web client shipped with
//! while the feed API was unfinished: it answers every filter/tab
//! combination with the same canned list, so switching tabs visibly changes
//! nothing. Inject [`HttpBackend`] once the server is up.

use crate::{
    endpoints, endpoints::EndpointError, FeedFilter, FeedTab, NewProfile,
    ProfileUpdate, Question, Role, User,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::sync::Mutex;
use url::Url;

/// Errors coming back from the application backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// No profile record exists for the authenticated identity.
    #[error("No profile record for this user")]
    NotFound,
    /// The backend refused the submitted fields.
    #[error("The backend rejected the submitted fields: {0}")]
    Validation(String),
    #[error(transparent)]
    Endpoint(#[from] EndpointError),
}

/// What the client needs from the application backend.
#[async_trait]
pub trait Backend: Send + Sync {
    /// `GET /api/users/profile`
    async fn fetch_profile(
        &self,
        access_token: &str,
    ) -> Result<User, BackendError>;

    /// `POST /api/users`
    async fn create_profile(
        &self,
        profile: &NewProfile,
    ) -> Result<User, BackendError>;

    /// `PUT /api/users/profile`
    async fn update_profile(
        &self,
        access_token: &str,
        update: &ProfileUpdate,
    ) -> Result<User, BackendError>;

    /// `GET /api/questions?filter=&tab=`
    async fn questions(
        &self,
        filter: FeedFilter,
        tab: FeedTab,
    ) -> Result<Vec<Question>, BackendError>;
}

/// The real REST backend.
pub struct HttpBackend {
    client: Client,
    base: Url,
}

impl HttpBackend {
    pub fn new(client: Client, base: Url) -> HttpBackend {
        HttpBackend { client, base }
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn fetch_profile(
        &self,
        access_token: &str,
    ) -> Result<User, BackendError> {
        endpoints::get_profile(&self.client, &self.base, access_token)
            .await
            .map_err(classify)
    }

    async fn create_profile(
        &self,
        profile: &NewProfile,
    ) -> Result<User, BackendError> {
        endpoints::create_profile(&self.client, &self.base, profile)
            .await
            .map_err(classify)
    }

    async fn update_profile(
        &self,
        access_token: &str,
        update: &ProfileUpdate,
    ) -> Result<User, BackendError> {
        endpoints::update_profile(&self.client, &self.base, access_token, update)
            .await
            .map_err(classify)
    }

    async fn questions(
        &self,
        filter: FeedFilter,
        tab: FeedTab,
    ) -> Result<Vec<Question>, BackendError> {
        endpoints::get_questions(&self.client, &self.base, filter, tab)
            .await
            .map_err(classify)
    }
}

fn classify(err: EndpointError) -> BackendError {
    match err {
        EndpointError::Api { status: 404, .. } => BackendError::NotFound,
        EndpointError::Api { status, message }
            if status == 400 || status == 422 =>
        {
            BackendError::Validation(message)
        }
        other => BackendError::Endpoint(other),
    }
}

/// A backend stand-in serving a canned feed and an in-memory profile store.
pub struct StaticBackend {
    profile: Mutex<Option<User>>,
    questions: Vec<Question>,
}

impl StaticBackend {
    pub fn new() -> StaticBackend {
        StaticBackend {
            profile: Mutex::new(None),
            questions: sample_questions(),
        }
    }

    /// A stand-in that already knows the signed-in user's profile.
    pub fn with_profile(user: User) -> StaticBackend {
        let backend = StaticBackend::new();
        *backend.profile.lock().unwrap() = Some(user);
        backend
    }
}

impl Default for StaticBackend {
    fn default() -> StaticBackend {
        StaticBackend::new()
    }
}

#[async_trait]
impl Backend for StaticBackend {
    async fn fetch_profile(
        &self,
        _access_token: &str,
    ) -> Result<User, BackendError> {
        self.profile
            .lock()
            .unwrap()
            .clone()
            .ok_or(BackendError::NotFound)
    }

    async fn create_profile(
        &self,
        profile: &NewProfile,
    ) -> Result<User, BackendError> {
        let now = Utc::now();
        let username = profile
            .extra
            .username
            .clone()
            .unwrap_or_else(|| local_part(&profile.email));
        let user = User {
            id: profile.id.clone(),
            email: profile.email.clone(),
            username,
            full_name: profile.extra.full_name.clone().unwrap_or_default(),
            role: Role::User,
            avatar: profile.extra.avatar.clone(),
            created_at: now,
            updated_at: now,
        };

        *self.profile.lock().unwrap() = Some(user.clone());

        Ok(user)
    }

    async fn update_profile(
        &self,
        _access_token: &str,
        update: &ProfileUpdate,
    ) -> Result<User, BackendError> {
        let mut guard = self.profile.lock().unwrap();
        let user = guard.as_mut().ok_or(BackendError::NotFound)?;

        if let Some(username) = &update.username {
            user.username = username.clone();
        }
        if let Some(full_name) = &update.full_name {
            user.full_name = full_name.clone();
        }
        if let Some(avatar) = &update.avatar {
            user.avatar = Some(avatar.clone());
        }
        user.updated_at = Utc::now();

        Ok(user.clone())
    }

    async fn questions(
        &self,
        filter: FeedFilter,
        tab: FeedTab,
    ) -> Result<Vec<Question>, BackendError> {
        // The store behind this stand-in has no notion of tabs or sort
        // orders yet, so every combination gets the same list.
        log::debug!("Serving the canned feed for filter={} tab={}", filter, tab);

        Ok(self.questions.clone())
    }
}

fn local_part(email: &str) -> String {
    email.split('@').next().unwrap_or_default().to_string()
}

fn sample_author(
    id: &str,
    email: &str,
    username: &str,
    full_name: &str,
    role: Role,
    joined: &str,
) -> User {
    User {
        id: id.to_string(),
        email: email.to_string(),
        username: username.to_string(),
        full_name: full_name.to_string(),
        role,
        avatar: None,
        created_at: ts(joined),
        updated_at: ts(joined),
    }
}

fn ts(value: &str) -> DateTime<Utc> {
    value.parse().expect("hard-coded timestamps always parse")
}

fn sample_questions() -> Vec<Question> {
    vec![
        Question {
            id: String::from("1"),
            title: String::from(
                "How to prepare for technical interviews as a CS student?",
            ),
            content: String::from(
                "I am a junior CS student and want to prepare for internship \
                 interviews. What resources should I use?",
            ),
            tags: vec![
                String::from("career"),
                String::from("interviews"),
                String::from("computer-science"),
            ],
            author: sample_author(
                "101",
                "john@example.com",
                "john_doe",
                "John Doe",
                Role::Verified,
                "2023-01-15T00:00:00Z",
            ),
            upvotes: 24,
            downvotes: 2,
            answer_count: 5,
            views: 120,
            created_at: ts("2023-05-10T14:30:00Z"),
            updated_at: ts("2023-05-10T14:30:00Z"),
        },
        Question {
            id: String::from("2"),
            title: String::from(
                "What electives should I take for a Data Science career?",
            ),
            content: String::from(
                "I'm majoring in Statistics and want to pursue Data Science. \
                 Which electives would be most beneficial?",
            ),
            tags: vec![
                String::from("data-science"),
                String::from("academics"),
                String::from("career-advice"),
            ],
            author: sample_author(
                "102",
                "sarah@example.com",
                "sarah_smith",
                "Sarah Smith",
                Role::User,
                "2023-02-20T00:00:00Z",
            ),
            upvotes: 18,
            downvotes: 0,
            answer_count: 3,
            views: 95,
            created_at: ts("2023-05-12T09:15:00Z"),
            updated_at: ts("2023-05-12T09:15:00Z"),
        },
        Question {
            id: String::from("3"),
            title: String::from("How to balance part-time work and studies?"),
            content: String::from(
                "I need to work part-time to support my education. How do I \
                 balance work and academics effectively?",
            ),
            tags: vec![
                String::from("work-life-balance"),
                String::from("academics"),
                String::from("student-life"),
            ],
            author: sample_author(
                "103",
                "mike@example.com",
                "mike_johnson",
                "Mike Johnson",
                Role::User,
                "2023-03-05T00:00:00Z",
            ),
            upvotes: 32,
            downvotes: 1,
            answer_count: 8,
            views: 210,
            created_at: ts("2023-05-08T16:45:00Z"),
            updated_at: ts("2023-05-08T16:45:00Z"),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_tab_gets_the_same_canned_list() {
        let backend = StaticBackend::new();

        let all = backend
            .questions(FeedFilter::Latest, FeedTab::All)
            .await
            .unwrap();
        let unanswered = backend
            .questions(FeedFilter::Latest, FeedTab::Unanswered)
            .await
            .unwrap();
        let votes = backend
            .questions(FeedFilter::Votes, FeedTab::Following)
            .await
            .unwrap();

        assert_eq!(all.len(), 3);
        assert_eq!(all, unanswered);
        assert_eq!(all, votes);
    }

    #[tokio::test]
    async fn profiles_can_be_created_fetched_and_updated() {
        let backend = StaticBackend::new();
        let profile = NewProfile {
            id: String::from("7"),
            email: String::from("a@b.com"),
            extra: ProfileUpdate {
                full_name: Some(String::from("A B")),
                ..ProfileUpdate::default()
            },
        };

        let created = backend.create_profile(&profile).await.unwrap();
        assert_eq!(created.username, "a");
        assert_eq!(created.full_name, "A B");
        assert_eq!(created.role, Role::User);

        let fetched = backend.fetch_profile("TOKEN").await.unwrap();
        assert_eq!(fetched, created);

        let update = ProfileUpdate {
            username: Some(String::from("ab")),
            ..ProfileUpdate::default()
        };
        let updated = backend.update_profile("TOKEN", &update).await.unwrap();
        assert_eq!(updated.username, "ab");
        assert_eq!(updated.full_name, "A B");
    }

    #[tokio::test]
    async fn fetching_a_missing_profile_is_not_found() {
        let backend = StaticBackend::new();

        let err = backend.fetch_profile("TOKEN").await.unwrap_err();

        assert!(matches!(err, BackendError::NotFound));
    }

    #[test]
    fn validation_failures_keep_the_server_message() {
        let err = classify(EndpointError::Api {
            status: 422,
            message: String::from("username taken"),
        });

        match err {
            BackendError::Validation(message) => {
                assert_eq!(message, "username taken")
            }
            other => panic!("expected a validation error, got {:?}", other),
        }
    }
}
