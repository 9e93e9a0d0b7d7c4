use thiserror::Error;

/// The markup could not be read at all. Bad bytes inside it are not an error.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read markup: {0}")]
    Read(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("replay page request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("replay page returned HTTP {0}")]
    Status(reqwest::StatusCode),
}

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl CrawlError {
    /// Short stage name for audit events.
    pub fn stage(&self) -> &'static str {
        match self {
            CrawlError::Fetch(_) => "fetch",
            CrawlError::Parse(_) => "parse",
        }
    }
}
