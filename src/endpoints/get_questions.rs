use crate::{endpoints::EndpointError, FeedFilter, FeedTab, Question};
use reqwest::Client;
use url::Url;

/// Fetch the question feed, sorted by `filter` and restricted to `tab`.
pub async fn get_questions(
    client: &Client,
    base: &Url,
    filter: FeedFilter,
    tab: FeedTab,
) -> Result<Vec<Question>, EndpointError> {
    let url = base.join("/api/questions")?;

    log::debug!("Fetching the {} feed ({}) from {}", filter, tab, url);

    let request = client
        .get(url)
        .query(&[("filter", filter.as_str()), ("tab", tab.as_str())]);
    let response = super::send(request).await?;

    let body = response.text().await?;
    log::trace!("Response: {}", body);

    let questions: Vec<Question> = serde_json::from_str(&body)?;
    log::debug!("Received {} questions", questions.len());

    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;

    #[test]
    fn parse_happy_questions_response() {
        let src = include_str!("questions_response_okay.json");

        let got: Vec<Question> = serde_json::from_str(src).unwrap();

        assert_eq!(got.len(), 2);

        let first = &got[0];
        assert_eq!(
            first.title,
            "How to prepare for technical interviews as a CS student?"
        );
        assert_eq!(
            first.tags,
            vec!["career", "interviews", "computer-science"]
        );
        assert_eq!(first.upvotes, 24);
        assert_eq!(first.answer_count, 5);
        assert_eq!(first.views, 120);
        assert_eq!(first.author.username, "john_doe");
        assert_eq!(first.author.role, Role::Verified);

        let second = &got[1];
        assert_eq!(second.id, "2");
        assert_eq!(second.downvotes, 0);
        assert_eq!(second.author.role, Role::User);
    }
}
