use crate::budget::SharedBudget;
use crate::notify::Notifier;
use crate::source::{
    MediaType, MovieSource, MovieSummary, RawMovieDetail, SearchQuery, SourceError, NOT_AVAILABLE,
};
use chrono::{Datelike, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Earliest release year a random pick can land on.
pub const FIRST_YEAR: i32 = 1950;
pub const SEARCH_KEYWORD: &str = "horror";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieDetail {
    pub title: String,
    pub plot: Option<String>,
    pub release_date: Option<String>,
    pub poster_url: Option<String>,
}

impl MovieDetail {
    pub fn from_raw(raw: RawMovieDetail) -> Result<Self, SourceError> {
        let title = available(raw.title).ok_or(SourceError::MissingField("Title"))?;
        Ok(Self {
            title,
            plot: available(raw.plot),
            release_date: available(raw.released),
            poster_url: available(raw.poster),
        })
    }
}

fn available(field: Option<String>) -> Option<String> {
    field.filter(|v| v != NOT_AVAILABLE && !v.trim().is_empty())
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Daily API call limit reached ({limit} calls)")]
    QuotaExceeded { limit: u32 },
    #[error("No movies found for {year}")]
    NoResultsFound { year: i32 },
    #[error(transparent)]
    DataSource(#[from] SourceError),
}

pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local calendar date of the host.
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// Uniform draw from `[FIRST_YEAR, current_year]`.
pub fn pick_year<R: Rng + ?Sized>(rng: &mut R, current_year: i32) -> i32 {
    rng.gen_range(FIRST_YEAR..=current_year.max(FIRST_YEAR))
}

pub fn pick_one<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> Option<&'a T> {
    items.choose(rng)
}

pub struct MovieFetcher {
    source: Arc<dyn MovieSource>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    budget: SharedBudget,
}

impl MovieFetcher {
    pub fn new(
        source: Arc<dyn MovieSource>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        budget: SharedBudget,
    ) -> Self {
        Self { source, notifier, clock, budget }
    }

    pub fn budget(&self) -> &SharedBudget {
        &self.budget
    }

    /// Picks a random horror movie, spending at most two calls of today's budget.
    ///
    /// Failures are reported to the operator channel before being returned; a
    /// failed report is only logged.
    pub async fn fetch_random_horror_movie(&self) -> Result<MovieDetail, FetchError> {
        let result = self.fetch().await;
        if let Err(err) = &result {
            error!(error = %err, "error fetching horror movie");
            let text = format!("⚠️ Error fetching horror movie: {err}");
            if let Err(notify_err) = self.notifier.notify(&text).await {
                warn!(error = %notify_err, "operator notification failed");
            }
        }
        result
    }

    async fn fetch(&self) -> Result<MovieDetail, FetchError> {
        let today = self.clock.today();
        let used = self
            .budget
            .try_reserve(today)
            .await
            .map_err(|e| FetchError::QuotaExceeded { limit: e.limit })?;

        let year = pick_year(&mut rand::thread_rng(), today.year());
        debug!(year, used, limit = self.budget.limit(), "searching");
        let query = SearchQuery {
            keyword: SEARCH_KEYWORD.to_string(),
            media_type: MediaType::Movie,
            year,
        };
        let results = self.source.search(&query).await?;

        let picked =
            pick_one(&mut rand::thread_rng(), &results).map(|m: &MovieSummary| m.id.clone());
        let Some(id) = picked else {
            return Err(FetchError::NoResultsFound { year });
        };

        let used = self.budget.record(self.clock.today()).await;
        let raw = self.source.detail(&id).await?;
        let movie = MovieDetail::from_raw(raw)?;
        info!(year, id = %id, title = %movie.title, used, "picked horror movie");
        Ok(movie)
    }
}
