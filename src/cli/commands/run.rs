//! Run command implementation.
//!
//! Resolves configuration once, builds the store, and hands both to the
//! orchestrator. Live runs against Jira ask for confirmation unless `--yes`.

use crate::cli::RunArgs;
use crate::config::{ConfigSources, RunConfig, StoreConfig, load_config};
use crate::error::{BulkEditError, Result};
use crate::format::{RunOutput, format_result_line, format_summary};
use crate::model::ProcessResult;
use crate::paginate::paginator_for;
use crate::process::RecordProcessor;
use crate::run::{RunOptions, RunOrchestrator, RunReport};
use crate::store::{IssueStore, JiraStore, MemoryStore};
use crate::util::confirm_live_run;
use crate::util::progress::should_show_progress;
use std::io;
use tracing::{debug, info};

/// Execute the run command.
///
/// # Errors
///
/// Returns configuration errors before any request is made, `Cancelled`
/// when the operator declines, and store errors that abort pagination.
pub fn execute(args: &RunArgs, sources: &ConfigSources, json: bool, quiet: bool) -> Result<()> {
    let layer = load_config(sources, &args.overrides())?;
    let run_config = RunConfig::from_layer(&layer)?;
    let options = RunOptions {
        cap: args.max_results,
        dry_run: args.dry_run,
        show_progress: !json && !quiet && should_show_progress(),
        keep_results: json,
    };
    debug!(?run_config, ?options, "Resolved run configuration");

    // Text output streams one line per issue; JSON needs the whole list.
    let mut print_line = |result: &ProcessResult| println!("{}", format_result_line(result));
    let sink: Option<&mut dyn FnMut(&ProcessResult)> = if json || quiet {
        None
    } else {
        Some(&mut print_line)
    };

    let report = if let Some(path) = &args.fixture {
        info!("Using fixture {}", path.display());
        let mut store = MemoryStore::from_fixture(path)?;
        run_with_store(&mut store, &run_config, options, sink)?
    } else {
        let store_config = StoreConfig::from_layer(&layer)?;
        if !args.dry_run && !args.yes {
            let confirmed = confirm_live_run(&mut io::stdin().lock(), &mut io::stderr())?;
            if !confirmed {
                return Err(BulkEditError::Cancelled);
            }
        }
        let mut store = JiraStore::new(&store_config, run_config.fields.clone());
        store.connect()?;
        info!("Connected to {}", store_config.base_url);
        run_with_store(&mut store, &run_config, options, sink)?
    };

    print_report(&report, json, quiet)
}

/// Run one bulk edit against an already-built store.
///
/// `sink`, when given, receives each result as soon as it is produced.
///
/// # Errors
///
/// Returns the store error that aborted pagination.
pub fn run_with_store(
    store: &mut dyn IssueStore,
    config: &RunConfig,
    options: RunOptions,
    sink: Option<&mut dyn FnMut(&ProcessResult)>,
) -> Result<RunReport> {
    let mut paginator = paginator_for(config.strategy, config.query_spec());
    let processor = RecordProcessor::new(config.fields.clone());
    let mut orchestrator = RunOrchestrator::new(paginator.as_mut(), &processor);
    match sink {
        Some(sink) => orchestrator.on_result(sink).run(store, options),
        None => orchestrator.run(store, options),
    }
}

fn print_report(report: &RunReport, json: bool, quiet: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&RunOutput::new(report))?);
        return Ok(());
    }
    if quiet {
        return Ok(());
    }
    println!("{}", format_summary(report));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldNames, Issue, RunCounters};
    use crate::paginate::Strategy;

    fn config(strategy: Strategy) -> RunConfig {
        RunConfig {
            jql: "project = es".to_string(),
            fields: FieldNames::default(),
            page_size: 2,
            strategy,
        }
    }

    #[test]
    fn test_run_with_store_uses_configured_strategy() {
        let issues = (1..=5)
            .map(|i| Issue::new(format!("ES-{i}")).with_source(format!("S-1000{i}")))
            .collect();
        let mut store = MemoryStore::new(issues);
        let options = RunOptions {
            keep_results: true,
            ..RunOptions::default()
        };
        let mut lines = 0;
        let mut count = |_: &ProcessResult| lines += 1;
        let report = run_with_store(
            &mut store,
            &config(Strategy::RestartDrain),
            options,
            Some(&mut count),
        )
        .unwrap();
        assert_eq!(lines, 5);
        assert_eq!(report.strategy, Strategy::RestartDrain);
        assert_eq!(
            report.counters,
            RunCounters {
                processed: 5,
                updated: 5,
                skipped: 0,
                errors: 0,
            }
        );
        assert_eq!(report.results.len(), 5);
    }
}
