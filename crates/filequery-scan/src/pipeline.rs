//! Discovery, collection and extraction in one call.

use filequery_core::{QueryConfig, QueryError, RecordSet};

use crate::collect::MetadataCollector;
use crate::count::{Counter, WcCommand};
use crate::discover::Discoverer;
use crate::extract::TextExtractor;
use crate::probe::{Classifier, FileCommand};

/// Run discovery, metadata collection and text extraction for `config`.
///
/// The configuration is validated before any filesystem access. When
/// discovery finds nothing, an empty set is returned without running the
/// later stages.
pub fn run_query(
    config: &QueryConfig,
    classifier: &dyn Classifier,
    counter: &dyn Counter,
) -> Result<RecordSet, QueryError> {
    config.validate()?;

    let paths = Discoverer::from_config(config).discover()?;
    if paths.is_empty() {
        tracing::info!(root = %config.root.display(), "no files to report");
        return Ok(RecordSet::new());
    }

    let collector = MetadataCollector::new(classifier, counter, config.text_suffix.clone());
    let mut records = collector.collect(&paths);

    TextExtractor::new(config.snippet_sizes, config.text_suffix.clone()).extract(&mut records);

    tracing::info!(
        files = records.len(),
        failures = records.failure_count(),
        "query finished"
    );
    Ok(records)
}

/// Run a query with the `file` and `wc` commands.
pub fn run_query_with_shell_tools(config: &QueryConfig) -> Result<RecordSet, QueryError> {
    let classifier = FileCommand::new().with_timeout(config.tool_timeout);
    let counter = WcCommand::new().with_timeout(config.tool_timeout);
    run_query(config, &classifier, &counter)
}
