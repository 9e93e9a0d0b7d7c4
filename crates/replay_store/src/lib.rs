/// barca-replays - in-memory replay store
///
/// Merges successive crawls into one collection keyed by URL and answers
/// "last N days" queries.
///   - ingest: exclusive (write lock), replace-or-append, then re-sort by date desc
///   - query:  shared (read lock), never mutates
///
/// Nothing is evicted. Old entries stay in memory and are only filtered out
/// by the window.

use chrono::{Days, NaiveDate};
use replay_model::{Clock, ReplayRecord, SystemClock};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

pub struct ReplayStore {
    items: RwLock<Vec<ReplayRecord>>,
    clock: Arc<dyn Clock>,
}

impl Default for ReplayStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplayStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            items: RwLock::new(Vec::new()),
            clock,
        }
    }

    /// Merge a crawl batch. Same URL => whole record replaced in place,
    /// otherwise appended. Readers never see a half-merged collection.
    pub async fn ingest(&self, batch: Vec<ReplayRecord>) {
        let mut items = self.items.write().await;

        let mut index: HashMap<String, usize> = items
            .iter()
            .enumerate()
            .map(|(i, it)| (it.url.clone(), i))
            .collect();

        let mut replaced = 0usize;
        let mut added = 0usize;
        for rec in batch {
            match index.get(&rec.url) {
                Some(&i) => {
                    items[i] = rec;
                    replaced += 1;
                }
                None => {
                    index.insert(rec.url.clone(), items.len());
                    items.push(rec);
                    added += 1;
                }
            }
        }

        // Stable sort; YYYY-MM-DD order == calendar order.
        items.sort_by(|a, b| b.date.cmp(&a.date));

        debug!(added, replaced, total = items.len(), "replay batch merged");
    }

    /// Records from the last `window_days` calendar days, today being day 1.
    /// Non-positive window => empty.
    pub async fn query(&self, window_days: i64) -> Vec<ReplayRecord> {
        let Some(cutoff) = window_cutoff(self.clock.today(), window_days) else {
            return Vec::new();
        };

        let items = self.items.read().await;
        items.iter().filter(|it| it.date >= cutoff).cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

/// First day of the window, or None when the window is empty.
fn window_cutoff(today: NaiveDate, window_days: i64) -> Option<NaiveDate> {
    if window_days <= 0 {
        return None;
    }
    let back = Days::new((window_days - 1) as u64);
    Some(today.checked_sub_days(back).unwrap_or(NaiveDate::MIN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use replay_model::FixedClock;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rec(title: &str, url: &str, date: NaiveDate) -> ReplayRecord {
        ReplayRecord::new(title, url, date)
    }

    fn store_at(today: NaiveDate) -> ReplayStore {
        ReplayStore::with_clock(Arc::new(FixedClock(today)))
    }

    fn is_sorted_desc(items: &[ReplayRecord]) -> bool {
        items.windows(2).all(|w| w[0].date >= w[1].date)
    }

    #[tokio::test]
    async fn reingest_same_batch_is_idempotent() {
        let today = day(2026, 3, 10);
        let store = store_at(today);
        let batch = vec![
            rec("巴萨vs皇马", "https://x/a", day(2026, 3, 9)),
            rec("巴萨vs马竞", "https://x/b", day(2026, 3, 10)),
        ];

        store.ingest(batch.clone()).await;
        let once = store.query(30).await;
        store.ingest(batch).await;
        let twice = store.query(30).await;

        assert_eq!(once, twice);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn same_url_replaces_all_fields() {
        let today = day(2026, 3, 10);
        let store = store_at(today);
        store.ingest(vec![rec("old title", "https://x/a", day(2026, 3, 1))]).await;
        store.ingest(vec![rec("new title", "https://x/a", day(2026, 3, 8))]).await;

        let items = store.query(30).await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "new title");
        assert_eq!(items[0].date, day(2026, 3, 8));
    }

    #[tokio::test]
    async fn duplicate_urls_inside_one_batch_keep_the_last() {
        let store = store_at(day(2026, 3, 10));
        store
            .ingest(vec![
                rec("first", "https://x/a", day(2026, 3, 2)),
                rec("second", "https://x/a", day(2026, 3, 3)),
            ])
            .await;

        let items = store.query(30).await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "second");
    }

    #[tokio::test]
    async fn collection_stays_sorted_desc_across_ingests() {
        let store = store_at(day(2026, 3, 31));
        store
            .ingest(vec![
                rec("a", "https://x/a", day(2026, 3, 3)),
                rec("b", "https://x/b", day(2026, 3, 20)),
            ])
            .await;
        store
            .ingest(vec![
                rec("c", "https://x/c", day(2026, 3, 11)),
                rec("d", "https://x/d", day(2026, 3, 29)),
                rec("a", "https://x/a", day(2026, 3, 30)),
            ])
            .await;

        let items = store.query(31).await;
        assert_eq!(items.len(), 4);
        assert!(is_sorted_desc(&items));
        assert_eq!(items[0].url, "https://x/a");
    }

    #[tokio::test]
    async fn window_includes_today_as_day_one() {
        let today = day(2026, 3, 20);
        let store = store_at(today);
        let dates = [0u64, 1, 5, 10].map(|back| today.checked_sub_days(Days::new(back)).unwrap());
        store
            .ingest(
                dates
                    .iter()
                    .enumerate()
                    .map(|(i, d)| rec("巴萨", &format!("https://x/{i}"), *d))
                    .collect(),
            )
            .await;

        let got: Vec<NaiveDate> = store.query(7).await.into_iter().map(|r| r.date).collect();
        assert_eq!(got, vec![dates[0], dates[1], dates[2]]);

        let just_today = store.query(1).await;
        assert_eq!(just_today.len(), 1);
        assert_eq!(just_today[0].date, today);

        // T-6 is the last day inside a 7-day window.
        let edge = today.checked_sub_days(Days::new(6)).unwrap();
        store.ingest(vec![rec("巴萨", "https://x/edge", edge)]).await;
        assert_eq!(store.query(7).await.len(), 4);
    }

    #[tokio::test]
    async fn non_positive_window_is_empty() {
        let store = store_at(day(2026, 3, 20));
        store.ingest(vec![rec("巴萨", "https://x/a", day(2026, 3, 20))]).await;

        assert!(store.query(0).await.is_empty());
        assert!(store.query(-3).await.is_empty());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn huge_window_does_not_overflow() {
        let store = store_at(day(2026, 3, 20));
        store.ingest(vec![rec("巴萨", "https://x/a", day(1999, 1, 1))]).await;
        assert_eq!(store.query(i64::MAX).await.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn readers_running_during_ingest_see_whole_batches() {
        use std::sync::atomic::{AtomicBool, Ordering};

        const BATCH: usize = 5_000;
        const BATCHES: usize = 4;

        let today = day(2026, 3, 20);
        let store = Arc::new(store_at(today));
        let done = Arc::new(AtomicBool::new(false));

        let readers: Vec<_> = (0..3)
            .map(|_| {
                let store = Arc::clone(&store);
                let done = Arc::clone(&done);
                tokio::spawn(async move {
                    let mut reads = 0usize;
                    loop {
                        let finished = done.load(Ordering::Acquire);
                        let items = store.query(30).await;
                        assert_eq!(items.len() % BATCH, 0, "partial batch visible: {}", items.len());
                        assert!(is_sorted_desc(&items));
                        reads += 1;
                        if finished {
                            return reads;
                        }
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();

        let writer = {
            let store = Arc::clone(&store);
            let done = Arc::clone(&done);
            tokio::spawn(async move {
                for b in 0..BATCHES {
                    let batch: Vec<ReplayRecord> = (0..BATCH)
                        .map(|i| {
                            let back = Days::new((i % 20) as u64);
                            rec("巴萨", &format!("https://x/{b}/{i}"), today.checked_sub_days(back).unwrap())
                        })
                        .collect();
                    store.ingest(batch).await;
                    tokio::task::yield_now().await;
                }
                done.store(true, Ordering::Release);
            })
        };

        writer.await.unwrap();
        for reader in readers {
            assert!(reader.await.unwrap() >= 1);
        }
        assert_eq!(store.len().await, BATCH * BATCHES);
        assert_eq!(store.query(30).await.len(), BATCH * BATCHES);
    }
}
