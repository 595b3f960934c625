use super::{PaginationStats, Paginator, QuerySpec, SeenSet, Strategy};
use crate::error::Result;
use crate::model::{Batch, Issue};
use crate::store::IssueStore;
use tracing::{debug, info};

/// Repeated searches from offset 0 until the result set is empty.
///
/// Issues that were already handed out but still match the query (skipped,
/// failed, or dry-run) stay at the head of the result set. They are never
/// handed out twice. The next request window grows by their count, and when
/// the store returns less than the window (servers cap page size) the scan
/// continues past them until fresh issues, an empty page, or the reported
/// total is reached.
pub struct RestartDrain {
    spec: QuerySpec,
    handed_out: SeenSet,
    window_extra: usize,
    done: bool,
    stats: PaginationStats,
}

impl RestartDrain {
    #[must_use]
    pub fn new(spec: QuerySpec) -> Self {
        Self {
            spec,
            handed_out: SeenSet::new(),
            window_extra: 0,
            done: false,
            stats: PaginationStats::default(),
        }
    }

    fn finish(&mut self, stalled: usize) {
        self.done = true;
        self.stats.stalled = stalled;
        if stalled > 0 {
            info!(
                remaining = stalled,
                "Drain complete; issues still matching the query were already handled this run"
            );
        }
    }
}

impl Paginator for RestartDrain {
    fn next_batch(
        &mut self,
        store: &mut dyn IssueStore,
        remaining: Option<usize>,
    ) -> Result<Option<Batch>> {
        if self.done {
            return Ok(None);
        }
        let Some(want) = self.spec.page_limit(remaining) else {
            self.done = true;
            return Ok(None);
        };

        // Every scan restarts at the head; `offset` only moves past issues
        // already handled this run.
        let mut offset = 0;
        loop {
            let limit = want + self.window_extra;
            let batch = store.search(&self.spec.request(offset, limit))?;
            self.stats.record_fetch(&batch);
            debug!(
                offset,
                limit,
                returned = batch.len(),
                total = ?batch.reported_total,
                "fetched result set"
            );

            if batch.is_empty() {
                self.finish(offset);
                return Ok(None);
            }

            let fetched = batch.len();
            let reported_total = batch.reported_total;
            let (fresh, recycled): (Vec<Issue>, Vec<Issue>) = batch
                .issues
                .into_iter()
                .partition(|issue| !self.handed_out.contains(&issue.key));
            self.stats.recycled += recycled.len();

            if !fresh.is_empty() {
                self.window_extra = offset + recycled.len();
                let issues: Vec<Issue> = fresh.into_iter().take(want).collect();
                for issue in &issues {
                    self.handed_out.observe(&issue.key);
                }
                self.stats.observed = self.handed_out.len();
                return Ok(Some(Batch::new(issues, reported_total)));
            }

            offset += fetched;
            if reported_total.is_some_and(|total| offset as u64 >= total) {
                self.finish(offset);
                return Ok(None);
            }
            debug!(
                handled = offset,
                "only handled issues so far; scanning past them"
            );
        }
    }

    fn strategy(&self) -> Strategy {
        Strategy::RestartDrain
    }

    fn stats(&self) -> &PaginationStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldUpdate, LabelSet};
    use crate::store::{MemoryStore, StoreCall};

    fn spec(page_size: usize) -> QuerySpec {
        QuerySpec {
            query: "q".to_string(),
            fields: Vec::new(),
            page_size,
        }
    }

    fn issues(n: usize) -> Vec<Issue> {
        (1..=n).map(|i| Issue::new(format!("ES-{i}"))).collect()
    }

    fn label(store: &mut MemoryStore, key: &str) {
        let update = FieldUpdate {
            field: "target".to_string(),
            values: LabelSet::from_iter(["S-12345"]),
        };
        store.update(key, &update).unwrap();
    }

    #[test]
    fn test_always_requests_offset_zero() {
        let mut store = MemoryStore::new(issues(3));
        let mut drain = RestartDrain::new(spec(2));
        while let Some(batch) = drain.next_batch(&mut store, None).unwrap() {
            for issue in &batch.issues {
                label(&mut store, &issue.key);
            }
        }
        let offsets: Vec<usize> = store
            .calls()
            .iter()
            .filter_map(|call| match call {
                StoreCall::Search { offset, .. } => Some(*offset),
                StoreCall::Update { .. } => None,
            })
            .collect();
        assert_eq!(offsets, [0, 0, 0]);
        assert_eq!(drain.stats().stalled, 0);
    }

    #[test]
    fn test_untouched_issues_widen_window_and_terminate() {
        // Nothing is ever updated: every issue stays in the result set.
        let mut store = MemoryStore::new(issues(3));
        let mut drain = RestartDrain::new(spec(2));
        let mut keys = Vec::new();
        while let Some(batch) = drain.next_batch(&mut store, None).unwrap() {
            keys.extend(batch.issues.into_iter().map(|i| i.key));
        }
        assert_eq!(keys, ["ES-1", "ES-2", "ES-3"]);
        assert_eq!(
            store.calls(),
            [
                StoreCall::Search { offset: 0, limit: 2 },
                StoreCall::Search { offset: 0, limit: 2 },
                StoreCall::Search { offset: 2, limit: 2 },
                StoreCall::Search { offset: 0, limit: 4 },
            ]
        );
        assert_eq!(drain.stats().stalled, 3);
        assert_eq!(drain.stats().duplicates, 0);
    }

    #[test]
    fn test_capped_server_page_still_reaches_every_issue() {
        // The store never returns more than two issues per search.
        let mut store = MemoryStore::new(issues(5)).with_max_page(2);
        let mut drain = RestartDrain::new(spec(2));
        let mut keys = Vec::new();
        while let Some(batch) = drain.next_batch(&mut store, None).unwrap() {
            keys.extend(batch.issues.into_iter().map(|i| i.key));
        }
        assert_eq!(keys, ["ES-1", "ES-2", "ES-3", "ES-4", "ES-5"]);
        assert_eq!(drain.stats().stalled, 5);
        assert_eq!(drain.stats().last_total, Some(5));
    }

    #[test]
    fn test_unknown_total_scans_until_empty_page() {
        let mut store = MemoryStore::new(issues(3)).with_reported_total(None);
        let mut drain = RestartDrain::new(spec(2));
        let mut handed = 0;
        while let Some(batch) = drain.next_batch(&mut store, None).unwrap() {
            handed += batch.len();
        }
        assert_eq!(handed, 3);
        assert_eq!(drain.stats().stalled, 3);
        assert_eq!(
            store.calls().last(),
            Some(&StoreCall::Search { offset: 3, limit: 4 })
        );
    }
}
