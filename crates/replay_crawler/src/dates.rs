//! Date recovery for replay entries.
//!
//! Two sources, fixed precedence:
//!   1. date embedded in the link path, e.g. `/zuqiu/2026/0226-xxx.htm`
//!   2. the day-section header, e.g. `2月26日 星期四` (no year, wall clock year assumed)

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

static HEADER_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})月(\d{1,2})日").unwrap());

static PATH_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/[^/]+/(\d{4})/(\d{2})(\d{2})").unwrap());

/// Outcome of per-entry date resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateResolution {
    PathDate(NaiveDate),
    SectionFallback(NaiveDate),
    Unresolved,
}

impl DateResolution {
    pub fn resolve(href: &str, fallback: Option<NaiveDate>) -> Self {
        if let Some(d) = path_date(href) {
            return DateResolution::PathDate(d);
        }
        match fallback {
            Some(d) => DateResolution::SectionFallback(d),
            None => DateResolution::Unresolved,
        }
    }

    pub fn date(self) -> Option<NaiveDate> {
        match self {
            DateResolution::PathDate(d) | DateResolution::SectionFallback(d) => Some(d),
            DateResolution::Unresolved => None,
        }
    }
}

/// `/<segment>/YYYY/MMDD...` in a link. Impossible days (1340, 0230) => None.
pub fn path_date(href: &str) -> Option<NaiveDate> {
    let caps = PATH_DATE_RE.captures(href)?;
    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// `M月D日` from a section header, placed in `year`.
pub fn header_date(text: &str, year: i32) -> Option<NaiveDate> {
    let caps = HEADER_DATE_RE.captures(text)?;
    let month: u32 = caps[1].parse().ok()?;
    let day: u32 = caps[2].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}
