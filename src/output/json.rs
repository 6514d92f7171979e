//! JSON output formatting

use std::io;
use std::path::Path;

use serde::Serialize;

use crate::engine::PathResult;
use crate::sync::SyncReport;

/// One element of the JSON output: a report, or the error of a failed path.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum JsonEntry<'a> {
    Report(&'a SyncReport),
    Failure { path: &'a Path, error: String },
}

impl<'a> From<&'a PathResult> for JsonEntry<'a> {
    fn from(result: &'a PathResult) -> Self {
        match &result.outcome {
            Ok(report) => JsonEntry::Report(report),
            Err(e) => JsonEntry::Failure {
                path: &result.path,
                error: e.to_string(),
            },
        }
    }
}

/// Render results as pretty-printed JSON.
pub fn to_json(results: &[PathResult]) -> serde_json::Result<String> {
    let entries: Vec<JsonEntry<'_>> = results.iter().map(JsonEntry::from).collect();
    serde_json::to_string_pretty(&entries)
}

/// Print results as pretty-printed JSON to stdout.
pub fn print_json(results: &[PathResult]) -> io::Result<()> {
    let json = to_json(results).map_err(io::Error::other)?;
    println!("{}", json);
    Ok(())
}
