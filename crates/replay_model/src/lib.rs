/// barca-replays - shared model
///
/// One `ReplayRecord` per full-match replay link, plus the wall-clock seam
/// used by the extractor (fallback year) and the store (window cutoff).

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Single match replay entry.
///
/// `url` is the identity key. `date` is a calendar day and serializes as
/// `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayRecord {
    pub title: String,
    pub url:   String,
    pub date:  NaiveDate,
}

impl ReplayRecord {
    pub fn new(title: impl Into<String>, url: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            url:   url.into(),
            date,
        }
    }
}

/// Source of "today" for date fallbacks and window cutoffs.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to one day, for tests and offline fixture parsing.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
