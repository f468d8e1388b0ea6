use crate::source::{MovieSource, MovieSummary, RawMovieDetail, SearchQuery, SourceError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// OMDb answers a search with no hits this way instead of an empty list.
const NOT_FOUND: &str = "Movie not found!";

#[derive(Clone)]
pub struct OmdbClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OmdbClient {
    pub fn new(api_key: String, base_url: impl Into<String>) -> reqwest::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent("horror-movie-bot/0.1")
            .build()?;
        Ok(Self { api_key, base_url: base_url.into(), http })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/?apikey={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&self.api_key)
        )
    }

    async fn get<T: for<'de> Deserialize<'de>>(&self, url: String) -> Result<T, SourceError> {
        let resp = self.http.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(SourceError::Status(resp.status()));
        }
        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Search by keyword, media type and release year.
    pub async fn search_movies(
        &self,
        query: &SearchQuery,
    ) -> Result<Vec<MovieSummary>, SourceError> {
        let url = format!(
            "{}&s={}&type={}&y={}",
            self.endpoint(),
            urlencoding::encode(&query.keyword),
            query.media_type.as_str(),
            query.year
        );
        let data: SearchResp = self.get(url).await?;
        if !data.ok() {
            return match data.error.as_deref() {
                Some(NOT_FOUND) | None => Ok(vec![]),
                Some(msg) => Err(SourceError::Api(msg.to_string())),
            };
        }
        Ok(data
            .search
            .into_iter()
            .map(|hit| MovieSummary { id: hit.imdb_id })
            .collect())
    }

    pub async fn movie_details(&self, imdb_id: &str) -> Result<RawMovieDetail, SourceError> {
        let url = format!("{}&i={}&plot=short", self.endpoint(), urlencoding::encode(imdb_id));
        let d: DetailResp = self.get(url).await?;
        if d.response != "True" {
            return Err(SourceError::Api(
                d.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        Ok(RawMovieDetail {
            title: d.title,
            plot: d.plot,
            released: d.released,
            poster: d.poster,
        })
    }
}

#[async_trait]
impl MovieSource for OmdbClient {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<MovieSummary>, SourceError> {
        self.search_movies(query).await
    }

    async fn detail(&self, id: &str) -> Result<RawMovieDetail, SourceError> {
        self.movie_details(id).await
    }
}

/* ======= DTOs ======= */

#[derive(Deserialize, Debug)]
struct SearchResp {
    #[serde(rename = "Search", default)]
    search: Vec<SearchHit>,
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Error")]
    error: Option<String>,
}

impl SearchResp {
    fn ok(&self) -> bool {
        self.response == "True"
    }
}

#[derive(Deserialize, Debug)]
struct SearchHit {
    #[serde(rename = "imdbID")]
    imdb_id: String,
}

#[derive(Deserialize, Debug)]
struct DetailResp {
    #[serde(rename = "Title")]
    title: Option<String>,
    #[serde(rename = "Plot")]
    plot: Option<String>,
    #[serde(rename = "Released")]
    released: Option<String>,
    #[serde(rename = "Poster")]
    poster: Option<String>,
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Error")]
    error: Option<String>,
}
