//! `jira_bulk_edit`: copy validated submission numbers between Jira fields.
//!
//! The library drives one bulk edit: page through a search whose result set
//! shrinks as issues are updated, validate each issue's source field, and
//! union the value into the target labels field.
//!
//! Layers, bottom up: [`model`] and [`validation`], the [`store`] seam,
//! [`paginate`] strategies, the per-issue [`process`] step, and the [`run`]
//! orchestrator. [`cli`] wires them to configuration and output.

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod model;
pub mod paginate;
pub mod process;
pub mod run;
pub mod store;
pub mod util;
pub mod validation;

pub use error::{BulkEditError, ErrorCode, Result, StructuredError};
