use super::{PaginationStats, Paginator, QuerySpec, SeenSet, Strategy};
use crate::error::Result;
use crate::model::Batch;
use crate::store::IssueStore;
use tracing::{debug, warn};

/// Single pass over the result set with an advancing offset.
///
/// Stops on an empty page, once the offset reaches a positive reported
/// total, or when the caller has no capacity left.
pub struct OffsetWalk {
    spec: QuerySpec,
    offset: usize,
    seen: SeenSet,
    done: bool,
    stats: PaginationStats,
}

impl OffsetWalk {
    #[must_use]
    pub fn new(spec: QuerySpec) -> Self {
        Self {
            spec,
            offset: 0,
            seen: SeenSet::new(),
            done: false,
            stats: PaginationStats::default(),
        }
    }

    fn reached_total(&self) -> bool {
        self.stats
            .last_total
            .is_some_and(|total| self.offset as u64 >= total)
    }
}

impl Paginator for OffsetWalk {
    fn next_batch(
        &mut self,
        store: &mut dyn IssueStore,
        remaining: Option<usize>,
    ) -> Result<Option<Batch>> {
        loop {
            if self.done {
                return Ok(None);
            }
            let Some(limit) = self.spec.page_limit(remaining) else {
                self.done = true;
                return Ok(None);
            };
            if self.reached_total() {
                debug!(offset = self.offset, "offset reached reported total");
                self.done = true;
                return Ok(None);
            }

            let batch = store.search(&self.spec.request(self.offset, limit))?;
            self.stats.record_fetch(&batch);
            debug!(
                offset = self.offset,
                returned = batch.len(),
                total = ?batch.reported_total,
                "fetched page"
            );

            if batch.is_empty() {
                self.done = true;
                return Ok(None);
            }
            self.offset += batch.len();

            let reported_total = batch.reported_total;
            let mut fresh = Vec::with_capacity(batch.len());
            for issue in batch.issues {
                if self.seen.observe(&issue.key) {
                    fresh.push(issue);
                } else {
                    warn!(key = %issue.key, "Duplicate issue returned by search; ignoring");
                }
            }
            self.stats.duplicates = self.seen.duplicates();
            self.stats.observed = self.seen.len();

            if fresh.is_empty() {
                debug!(offset = self.offset, "page held only duplicates; continuing");
                continue;
            }
            return Ok(Some(Batch::new(fresh, reported_total)));
        }
    }

    fn strategy(&self) -> Strategy {
        Strategy::OffsetWalk
    }

    fn stats(&self) -> &PaginationStats {
        &self.stats
    }
}
