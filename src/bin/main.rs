use anyhow::Error;
use campusq::{FeedFilter, FeedView, HttpBackend, HttpIdentity, SessionProvider};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use structopt::StructOpt;
use url::Url;

/// Sign in and print the question feed.
#[derive(Debug, StructOpt)]
struct Args {
    /// Base URL of the identity provider.
    #[structopt(long, default_value = "https://auth.campusq.example")]
    identity_url: Url,
    /// Base URL of the application backend.
    #[structopt(long, default_value = "https://api.campusq.example")]
    backend_url: Url,
    #[structopt(short, long)]
    email: String,
    #[structopt(short, long)]
    password: String,
    /// Sort order: latest, trending or votes.
    #[structopt(long, default_value = "latest")]
    filter: FeedFilter,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    let args = Args::from_args();

    let client = Client::builder()
        .user_agent(campusq::DEFAULT_USER_AGENT)
        .cookie_store(true)
        .build()?;

    let identity = Arc::new(HttpIdentity::new(
        client.clone(),
        args.identity_url.clone(),
    ));
    let backend =
        Arc::new(HttpBackend::new(client, args.backend_url.clone()));

    let provider = SessionProvider::spawn(identity, backend.clone());
    provider.ready().await;

    provider.sign_in(&args.email, &args.password).await?;

    // The profile arrives through the event stream, so give it a moment.
    let profile_loaded = async {
        let mut changes = provider.subscribe();
        loop {
            let loaded = changes.borrow().user.is_some();
            if loaded {
                return;
            }
            if changes.recv().await.is_none() {
                return;
            }
        }
    };
    if tokio::time::timeout(Duration::from_secs(10), profile_loaded)
        .await
        .is_err()
    {
        log::warn!("No profile arrived; continuing without one");
    }

    if let Some(user) = provider.current_user() {
        log::info!("Signed in as {} ({:?})", user.username, user.role);
    }

    let mut feed = FeedView::new(backend);
    feed.set_filter(args.filter).await;

    for entry in feed.entries() {
        println!(
            "{:>4} votes  {:>3} answers  {:>5} views  {}",
            entry.upvotes, entry.answers, entry.views, entry.title
        );
        println!("           asked by {} {}", entry.author_name, entry.posted);
    }

    provider.close().await;
    Ok(())
}
