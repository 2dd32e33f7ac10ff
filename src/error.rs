/// Failure of a single request against the quotation feed.
///
/// None of these abort a report run: the resolver logs them and moves on to
/// the next fallback day.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("feed returned status {0}")]
    Status(u16),

    #[error("failed to decode feed payload: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FeedError {
    fn from(e: reqwest::Error) -> Self {
        FeedError::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for FeedError {
    fn from(e: serde_json::Error) -> Self {
        FeedError::Decode(e.to_string())
    }
}
