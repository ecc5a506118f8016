use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("The selector you are trying to scrape for is missing. Selector: {0}")]
    ParseMissingSelector(String),

    #[error("Table has no header cells")]
    ParseEmptyHeader,

    #[error("HTTP status {status} for {url}")]
    HttpStatus { status: u16, url: String },
    #[error("Gave up on {url} after {attempts} attempts, last failure: {last}")]
    RetriesExhausted {
        attempts: u32,
        url: String,
        last: String,
    },
    #[error("Invalid request header: {0}")]
    InvalidHeader(String),

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Csv Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Tokio Join Error, couldn't await a task! {0}")]
    RuntimeJoin(#[from] tokio::task::JoinError),

    #[error("Reqwest Error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

impl Error {
    /// True for the failures a page fetch ends with: a non-retryable status
    /// or a used-up retry budget.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Error::HttpStatus { .. } | Error::RetriesExhausted { .. })
    }
}
