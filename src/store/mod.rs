//! Issue store abstraction.
//!
//! The run only needs two capabilities from the remote tracker: a paged,
//! read-only search and a single-field update. `JiraStore` speaks the Jira
//! REST API; `MemoryStore` is a deterministic in-process stand-in.

mod jira;
mod memory;

pub use jira::JiraStore;
pub use memory::{MemoryStore, StoreCall};

use crate::error::Result;
use crate::model::{Batch, FieldUpdate};

/// Parameters for one search call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub offset: usize,
    pub limit: usize,
    pub fields: Vec<String>,
}

/// Remote issue store used by the paginator and the record processor.
pub trait IssueStore {
    /// Fetch up to `limit` issues starting at `offset`.
    ///
    /// May return fewer issues than requested even when more exist.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the store answers with a non-success
    /// status, or a malformed-response error if the payload cannot be read.
    fn search(&mut self, request: &SearchRequest) -> Result<Batch>;

    /// Replace one field of an issue.
    ///
    /// # Errors
    ///
    /// Returns an error carrying the store's diagnostic if the update is
    /// rejected.
    fn update(&mut self, key: &str, update: &FieldUpdate) -> Result<()>;
}

impl<S: IssueStore + ?Sized> IssueStore for &mut S {
    fn search(&mut self, request: &SearchRequest) -> Result<Batch> {
        (**self).search(request)
    }

    fn update(&mut self, key: &str, update: &FieldUpdate) -> Result<()> {
        (**self).update(key, update)
    }
}

impl<S: IssueStore + ?Sized> IssueStore for Box<S> {
    fn search(&mut self, request: &SearchRequest) -> Result<Batch> {
        (**self).search(request)
    }

    fn update(&mut self, key: &str, update: &FieldUpdate) -> Result<()> {
        (**self).update(key, update)
    }
}
