use async_trait::async_trait;
use thiserror::Error;

/// Placeholder the data source puts in fields it has no value for.
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Movie,
}

impl MediaType {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub keyword: String,
    pub media_type: MediaType,
    pub year: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieSummary {
    pub id: String,
}

/// Detail record exactly as the data source returned it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawMovieDetail {
    pub title: Option<String>,
    pub plot: Option<String>,
    pub released: Option<String>,
    pub poster: Option<String>,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("data source error: {0}")]
    Api(String),
    #[error("response has no {0}")]
    MissingField(&'static str),
}

#[async_trait]
pub trait MovieSource: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<MovieSummary>, SourceError>;
    async fn detail(&self, id: &str) -> Result<RawMovieDetail, SourceError>;
}
