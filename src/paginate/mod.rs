//! Paginated fetching over a result set that may shrink while it is read.
//!
//! Two interchangeable policies:
//!
//! - [`OffsetWalk`]: one pass with a monotonically increasing offset. Cheap,
//!   but issues can be skipped when earlier matches leave the result set
//!   mid-walk; overlapping pages are caught by a [`SeenSet`].
//! - [`RestartDrain`]: every request starts at offset 0 and relies on
//!   processed issues leaving the result set. Costs one extra search per
//!   page but never drifts.

mod drain;
mod offset;
mod seen;

pub use drain::RestartDrain;
pub use offset::OffsetWalk;
pub use seen::SeenSet;

use crate::error::Result;
use crate::model::Batch;
use crate::store::{IssueStore, SearchRequest};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default number of issues requested per search.
pub const DEFAULT_PAGE_SIZE: usize = 50;
/// Largest page size accepted from configuration.
pub const MAX_PAGE_SIZE: usize = 1000;

/// Pagination policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Single pass with an advancing offset and duplicate detection.
    OffsetWalk,
    /// Repeat searches from offset 0 until the result set is drained.
    #[default]
    RestartDrain,
}

impl Strategy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OffsetWalk => "offset-walk",
            Self::RestartDrain => "restart-drain",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = crate::error::BulkEditError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "offset-walk" | "offset" => Ok(Self::OffsetWalk),
            "restart-drain" | "drain" => Ok(Self::RestartDrain),
            other => Err(crate::error::BulkEditError::validation(
                "strategy",
                format!("unknown strategy '{other}' (expected offset-walk or restart-drain)"),
            )),
        }
    }
}

/// What to search for and how large each page is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    pub query: String,
    pub fields: Vec<String>,
    pub page_size: usize,
}

impl QuerySpec {
    pub(crate) fn request(&self, offset: usize, limit: usize) -> SearchRequest {
        SearchRequest {
            query: self.query.clone(),
            offset,
            limit,
            fields: self.fields.clone(),
        }
    }

    /// Page size bounded by the caller's remaining capacity.
    ///
    /// Returns `None` when no capacity is left.
    pub(crate) fn page_limit(&self, remaining: Option<usize>) -> Option<usize> {
        match remaining {
            Some(0) => None,
            Some(left) => Some(left.min(self.page_size)),
            None => Some(self.page_size),
        }
    }
}

/// Diagnostics accumulated by a paginator over one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PaginationStats {
    /// Search calls issued.
    pub fetches: usize,
    /// Issues dropped because an earlier page already returned them.
    pub duplicates: usize,
    /// Already-handed-out issues seen again at the head of a drain.
    pub recycled: usize,
    /// Distinct issues handed to the caller.
    pub observed: usize,
    /// Total reported by the first search.
    pub initial_total: Option<u64>,
    /// Total reported by the most recent search.
    pub last_total: Option<u64>,
    /// Issues still matching the query when a drain stopped making progress.
    pub stalled: usize,
}

impl PaginationStats {
    pub(crate) fn record_fetch(&mut self, batch: &Batch) {
        self.fetches += 1;
        if self.fetches == 1 {
            self.initial_total = batch.reported_total;
        }
        self.last_total = batch.reported_total;
    }

    /// Issues the first search reported but the walk never handed out.
    ///
    /// Only meaningful for an uncapped offset walk.
    #[must_use]
    pub fn possibly_skipped(&self) -> usize {
        self.initial_total.map_or(0, |total| {
            usize::try_from(total)
                .unwrap_or(usize::MAX)
                .saturating_sub(self.observed)
        })
    }
}

/// Source of batches for one run.
pub trait Paginator {
    /// Fetch the next non-empty batch, or `None` once the walk is complete.
    ///
    /// `remaining` is the caller's remaining capacity; the paginator never
    /// requests more than that.
    ///
    /// # Errors
    ///
    /// Propagates store errors unchanged; no retry happens at this layer.
    fn next_batch(
        &mut self,
        store: &mut dyn IssueStore,
        remaining: Option<usize>,
    ) -> Result<Option<Batch>>;

    fn strategy(&self) -> Strategy;

    fn stats(&self) -> &PaginationStats;
}

/// Build the paginator for a strategy.
#[must_use]
pub fn paginator_for(strategy: Strategy, spec: QuerySpec) -> Box<dyn Paginator> {
    match strategy {
        Strategy::OffsetWalk => Box::new(OffsetWalk::new(spec)),
        Strategy::RestartDrain => Box::new(RestartDrain::new(spec)),
    }
}
