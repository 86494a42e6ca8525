//! The static profile page.

use chrono::NaiveDate;

/// The locally-held summary shown on the profile page.
///
/// Entirely static: the page renders whatever this carries and never talks
/// to the backend, so there are no loading or error states.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSummary {
    pub username: String,
    pub email: String,
    pub joined: NaiveDate,
    pub questions_asked: u32,
    pub answers_given: u32,
}

impl ProfileSummary {
    /// The avatar placeholder, the first letter of the username.
    pub fn initial(&self) -> char {
        self.username
            .chars()
            .next()
            .map(|c| c.to_uppercase().next().unwrap_or(c))
            .unwrap_or('U')
    }

    /// The record the page currently displays.
    pub fn sample() -> ProfileSummary {
        ProfileSummary {
            username: String::from("JohnDoe"),
            email: String::from("john@example.com"),
            joined: NaiveDate::from_ymd_opt(2023, 1, 1)
                .unwrap_or_else(NaiveDate::default),
            questions_asked: 5,
            answers_given: 12,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_sample_record_is_complete() {
        let profile = ProfileSummary::sample();

        assert_eq!(profile.username, "JohnDoe");
        assert_eq!(profile.email, "john@example.com");
        assert_eq!(profile.questions_asked, 5);
        assert_eq!(profile.answers_given, 12);
    }

    #[test]
    fn the_initial_is_uppercased() {
        let mut profile = ProfileSummary::sample();
        assert_eq!(profile.initial(), 'J');

        profile.username = String::from("ada");
        assert_eq!(profile.initial(), 'A');

        profile.username = String::new();
        assert_eq!(profile.initial(), 'U');
    }
}
