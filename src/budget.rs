use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Outbound calls made to the movie data source on `reset_date`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallBudget {
    pub count: u32,
    pub reset_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exhausted {
    pub limit: u32,
}

impl CallBudget {
    pub fn new(today: NaiveDate) -> Self {
        Self { count: 0, reset_date: today }
    }

    /// Zeroes the counter when the calendar date has moved on. Returns true if it did.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        if today == self.reset_date {
            return false;
        }
        self.count = 0;
        self.reset_date = today;
        true
    }

    /// Guarded increment: fails without counting once `limit` calls were made today.
    pub fn try_reserve(&mut self, today: NaiveDate, limit: u32) -> Result<u32, Exhausted> {
        self.roll_over(today);
        if self.count >= limit {
            return Err(Exhausted { limit });
        }
        self.count += 1;
        Ok(self.count)
    }

    /// Unguarded increment for a call that is already committed to.
    pub fn record(&mut self, today: NaiveDate) -> u32 {
        self.roll_over(today);
        self.count = self.count.saturating_add(1);
        self.count
    }
}

/// Process-wide budget shared by every concurrent command handler.
#[derive(Clone)]
pub struct SharedBudget {
    inner: Arc<Mutex<CallBudget>>,
    limit: u32,
}

impl SharedBudget {
    pub fn new(today: NaiveDate, limit: u32) -> Self {
        Self::from_state(CallBudget::new(today), limit)
    }

    pub fn from_state(state: CallBudget, limit: u32) -> Self {
        Self { inner: Arc::new(Mutex::new(state)), limit }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub async fn try_reserve(&self, today: NaiveDate) -> Result<u32, Exhausted> {
        let mut guard = self.inner.lock().await;
        guard.try_reserve(today, self.limit)
    }

    pub async fn record(&self, today: NaiveDate) -> u32 {
        let mut guard = self.inner.lock().await;
        guard.record(today)
    }

    pub async fn snapshot(&self) -> CallBudget {
        self.inner.lock().await.clone()
    }
}
