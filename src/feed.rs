//! The question feed view-model.

use crate::{Backend, FeedFilter, FeedTab, Question};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// How many characters of the question body make it into the excerpt.
const EXCERPT_CHARS: usize = 140;

/// Client-side state for the question feed page.
///
/// Changing the filter or tab re-queries the backend with both parameters;
/// whether the rows actually differ is up to the backend serving them (see
/// [`StaticBackend`][crate::StaticBackend]).
pub struct FeedView {
    backend: Arc<dyn Backend>,
    questions: Vec<Question>,
    filter: FeedFilter,
    tab: FeedTab,
    loading: bool,
}

impl FeedView {
    pub fn new(backend: Arc<dyn Backend>) -> FeedView {
        FeedView {
            backend,
            questions: Vec::new(),
            filter: FeedFilter::default(),
            tab: FeedTab::default(),
            loading: false,
        }
    }

    pub fn filter(&self) -> FeedFilter {
        self.filter
    }

    pub fn tab(&self) -> FeedTab {
        self.tab
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Re-query the backend with the current filter and tab.
    ///
    /// Failures keep the list that is already on screen.
    pub async fn refresh(&mut self) {
        self.loading = true;
        match self.backend.questions(self.filter, self.tab).await {
            Ok(questions) => self.questions = questions,
            Err(error) => log::error!("Error fetching questions: {}", error),
        }
        self.loading = false;
    }

    pub async fn set_filter(&mut self, filter: FeedFilter) {
        self.filter = filter;
        self.refresh().await;
    }

    pub async fn set_tab(&mut self, tab: FeedTab) {
        self.tab = tab;
        self.refresh().await;
    }

    /// Shape the current questions for rendering.
    pub fn entries(&self) -> Vec<FeedEntry> {
        self.entries_at(Utc::now())
    }

    fn entries_at(&self, now: DateTime<Utc>) -> Vec<FeedEntry> {
        self.questions
            .iter()
            .map(|question| FeedEntry::new(question, now))
            .collect()
    }
}

/// One row of the feed, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    /// Target of the title link.
    pub question_id: String,
    pub title: String,
    pub excerpt: String,
    pub tags: Vec<String>,
    pub upvotes: u64,
    pub answers: u64,
    pub views: u64,
    pub author_name: String,
    pub author_badge: AuthorBadge,
    /// A relative-time label like "3 days ago".
    pub posted: String,
}

/// The author's avatar image, or their initial when they have none.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthorBadge {
    Avatar(String),
    Initial(char),
}

impl FeedEntry {
    fn new(question: &Question, now: DateTime<Utc>) -> FeedEntry {
        let author = &question.author;
        let author_badge = match &author.avatar {
            Some(url) => AuthorBadge::Avatar(url.clone()),
            None => AuthorBadge::Initial(initial(&author.username)),
        };

        FeedEntry {
            question_id: question.id.clone(),
            title: question.title.clone(),
            excerpt: excerpt(&question.content),
            tags: question.tags.clone(),
            upvotes: question.upvotes,
            answers: question.answer_count,
            views: question.views,
            author_name: author.username.clone(),
            author_badge,
            posted: relative_time(question.created_at, now),
        }
    }
}

fn initial(username: &str) -> char {
    username
        .chars()
        .next()
        .map(|c| c.to_uppercase().next().unwrap_or(c))
        .unwrap_or('U')
}

/// Truncate a question body on a character boundary.
fn excerpt(content: &str) -> String {
    if content.chars().count() <= EXCERPT_CHARS {
        return content.to_string();
    }

    let cut: String = content.chars().take(EXCERPT_CHARS).collect();
    format!("{}…", cut.trim_end())
}

/// The coarse "how long ago" label rendered next to each author.
fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);

    if elapsed < Duration::minutes(1) {
        return String::from("just now");
    }

    let (amount, unit) = if elapsed < Duration::hours(1) {
        (elapsed.num_minutes(), "minute")
    } else if elapsed < Duration::days(1) {
        (elapsed.num_hours(), "hour")
    } else if elapsed < Duration::days(30) {
        (elapsed.num_days(), "day")
    } else if elapsed < Duration::days(365) {
        (elapsed.num_days() / 30, "month")
    } else {
        (elapsed.num_days() / 365, "year")
    };

    if amount == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", amount, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        BackendError, NewProfile, ProfileUpdate, Role, StaticBackend, User,
    };
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records the parameters of every feed query; optionally fails.
    #[derive(Default)]
    struct RecordingBackend {
        calls: Mutex<Vec<(FeedFilter, FeedTab)>>,
        fail: Mutex<bool>,
        serve: Mutex<Vec<Question>>,
    }

    #[async_trait]
    impl Backend for RecordingBackend {
        async fn fetch_profile(
            &self,
            _access_token: &str,
        ) -> Result<User, BackendError> {
            Err(BackendError::NotFound)
        }

        async fn create_profile(
            &self,
            _profile: &NewProfile,
        ) -> Result<User, BackendError> {
            Err(BackendError::NotFound)
        }

        async fn update_profile(
            &self,
            _access_token: &str,
            _update: &ProfileUpdate,
        ) -> Result<User, BackendError> {
            Err(BackendError::NotFound)
        }

        async fn questions(
            &self,
            filter: FeedFilter,
            tab: FeedTab,
        ) -> Result<Vec<Question>, BackendError> {
            self.calls.lock().unwrap().push((filter, tab));
            if *self.fail.lock().unwrap() {
                return Err(BackendError::NotFound);
            }
            Ok(self.serve.lock().unwrap().clone())
        }
    }

    fn sample_question(content: &str, avatar: Option<&str>) -> Question {
        let now = Utc::now();
        Question {
            id: String::from("1"),
            title: String::from("A title"),
            content: content.to_string(),
            tags: vec![String::from("career")],
            author: User {
                id: String::from("101"),
                email: String::from("john@example.com"),
                username: String::from("john_doe"),
                full_name: String::from("John Doe"),
                role: Role::Verified,
                avatar: avatar.map(str::to_string),
                created_at: now,
                updated_at: now,
            },
            upvotes: 24,
            downvotes: 2,
            answer_count: 5,
            views: 120,
            created_at: now - Duration::days(3),
            updated_at: now - Duration::days(3),
        }
    }

    #[tokio::test]
    async fn filter_and_tab_changes_requery_with_both_parameters() {
        let backend = Arc::new(RecordingBackend::default());
        let mut feed = FeedView::new(backend.clone());

        feed.set_filter(FeedFilter::Votes).await;
        feed.set_tab(FeedTab::Following).await;

        let calls = backend.calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![
                (FeedFilter::Votes, FeedTab::All),
                (FeedFilter::Votes, FeedTab::Following),
            ]
        );
    }

    #[tokio::test]
    async fn a_failed_refresh_keeps_the_current_list() {
        let backend = Arc::new(RecordingBackend::default());
        *backend.serve.lock().unwrap() = vec![sample_question("body", None)];
        let mut feed = FeedView::new(backend.clone());

        feed.refresh().await;
        assert_eq!(feed.questions().len(), 1);

        *backend.fail.lock().unwrap() = true;
        feed.set_tab(FeedTab::Unanswered).await;

        assert_eq!(feed.questions().len(), 1);
        assert!(!feed.is_loading());
    }

    #[tokio::test]
    async fn the_canned_feed_ignores_the_tab() {
        let mut feed = FeedView::new(Arc::new(StaticBackend::new()));
        feed.refresh().await;
        let all = feed.questions().to_vec();

        feed.set_tab(FeedTab::Unanswered).await;

        // The stand-in backend serves the same list for every tab.
        assert_eq!(feed.questions(), all.as_slice());
    }

    #[tokio::test]
    async fn entries_carry_the_rendering_fields() {
        let backend = Arc::new(RecordingBackend::default());
        *backend.serve.lock().unwrap() = vec![sample_question("short body", None)];
        let mut feed = FeedView::new(backend);
        feed.refresh().await;

        let entries = feed.entries();

        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.question_id, "1");
        assert_eq!(entry.excerpt, "short body");
        assert_eq!(entry.upvotes, 24);
        assert_eq!(entry.answers, 5);
        assert_eq!(entry.views, 120);
        assert_eq!(entry.author_name, "john_doe");
        assert_eq!(entry.author_badge, AuthorBadge::Initial('J'));
        assert_eq!(entry.posted, "3 days ago");
    }

    #[tokio::test]
    async fn an_avatar_wins_over_the_initial() {
        let backend = Arc::new(RecordingBackend::default());
        *backend.serve.lock().unwrap() =
            vec![sample_question("body", Some("https://cdn.example.com/a.png"))];
        let mut feed = FeedView::new(backend);
        feed.refresh().await;

        let entries = feed.entries();

        assert_eq!(
            entries[0].author_badge,
            AuthorBadge::Avatar(String::from("https://cdn.example.com/a.png"))
        );
    }

    #[test]
    fn long_bodies_are_cut_on_a_character_boundary() {
        let long = "é".repeat(300);

        let got = excerpt(&long);

        assert_eq!(got.chars().count(), EXCERPT_CHARS + 1);
        assert!(got.ends_with('…'));
    }

    #[test]
    fn short_bodies_are_untouched() {
        assert_eq!(excerpt("hello"), "hello");
    }

    #[test]
    fn initials_are_uppercased_with_a_fallback() {
        assert_eq!(initial("john_doe"), 'J');
        assert_eq!(initial("ärna"), 'Ä');
        assert_eq!(initial(""), 'U');
    }

    #[test]
    fn relative_time_labels() {
        let now = Utc::now();

        let cases = vec![
            (Duration::seconds(30), "just now"),
            (Duration::minutes(1), "1 minute ago"),
            (Duration::minutes(45), "45 minutes ago"),
            (Duration::hours(3), "3 hours ago"),
            (Duration::days(1), "1 day ago"),
            (Duration::days(12), "12 days ago"),
            (Duration::days(60), "2 months ago"),
            (Duration::days(800), "2 years ago"),
        ];

        for (elapsed, should_be) in cases {
            assert_eq!(relative_time(now - elapsed, now), should_be);
        }
    }
}
