use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Jira returned {status} for {url}: {body}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
        body: String,
    },
    #[error("Unexpected Jira payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

impl Error {
    /// True when Jira answered 404 for the requested resource.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Status { status, .. } if *status == reqwest::StatusCode::NOT_FOUND)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
