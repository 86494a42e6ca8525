//! Feed entries and the parameters the feed is queried with.

use crate::User;
use chrono::{DateTime, Utc};
use serde_derive::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// A question summary as served by `GET /api/questions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Question {
    pub id: String,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub author: User,
    pub upvotes: u64,
    pub downvotes: u64,
    pub answer_count: u64,
    pub views: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sort order for the question feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFilter {
    Latest,
    Trending,
    Votes,
}

impl FeedFilter {
    /// The value sent as the `filter` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            FeedFilter::Latest => "latest",
            FeedFilter::Trending => "trending",
            FeedFilter::Votes => "votes",
        }
    }
}

impl Default for FeedFilter {
    fn default() -> FeedFilter {
        FeedFilter::Latest
    }
}

/// Which slice of the feed is being looked at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedTab {
    All,
    Following,
    Unanswered,
}

impl FeedTab {
    /// The value sent as the `tab` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            FeedTab::All => "all",
            FeedTab::Following => "following",
            FeedTab::Unanswered => "unanswered",
        }
    }
}

impl Default for FeedTab {
    fn default() -> FeedTab {
        FeedTab::All
    }
}

impl Display for FeedFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for FeedTab {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The name didn't match any feed filter or tab.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Unknown feed parameter: {0}")]
pub struct ParseFeedParamError(String);

impl FromStr for FeedFilter {
    type Err = ParseFeedParamError;

    fn from_str(s: &str) -> Result<FeedFilter, ParseFeedParamError> {
        match s {
            "latest" => Ok(FeedFilter::Latest),
            "trending" => Ok(FeedFilter::Trending),
            "votes" => Ok(FeedFilter::Votes),
            other => Err(ParseFeedParamError(other.to_string())),
        }
    }
}

impl FromStr for FeedTab {
    type Err = ParseFeedParamError;

    fn from_str(s: &str) -> Result<FeedTab, ParseFeedParamError> {
        match s {
            "all" => Ok(FeedTab::All),
            "following" => Ok(FeedTab::Following),
            "unanswered" => Ok(FeedTab::Unanswered),
            other => Err(ParseFeedParamError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_names_round_trip() {
        for filter in &[FeedFilter::Latest, FeedFilter::Trending, FeedFilter::Votes]
        {
            assert_eq!(filter.as_str().parse::<FeedFilter>().unwrap(), *filter);
        }
        assert!("newest".parse::<FeedFilter>().is_err());
    }

    #[test]
    fn tab_names_round_trip() {
        for tab in &[FeedTab::All, FeedTab::Following, FeedTab::Unanswered] {
            assert_eq!(tab.as_str().parse::<FeedTab>().unwrap(), *tab);
        }
        assert!("answered".parse::<FeedTab>().is_err());
    }
}
