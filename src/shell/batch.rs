use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::shell::dispatcher::{Dispatcher, Reply};

/// What a batch run submitted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Non-blank lines handled
    pub commands: usize,
    /// Ids of the jobs the batch queued, in order
    pub jobs: Vec<u64>,
    /// Lines that were rejected
    pub errors: usize,
}

/// Feed every non-blank line of `path` through the dispatcher.
///
/// Each line is echoed as `Batch command: <line>` followed by its reply.
/// A failing line is reported and skipped; `quit` stops reading. Waiting for
/// the submitted jobs is left to the caller.
pub async fn run_batch<W: Write>(
    dispatcher: &Dispatcher,
    path: &Path,
    out: &mut W,
) -> Result<BatchReport> {
    let contents = tokio::fs::read_to_string(path).await?;
    tracing::info!(path = %path.display(), "Running batch file");

    let mut report = BatchReport::default();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        writeln!(out, "Batch command: {}", line)?;
        report.commands += 1;

        match dispatcher.dispatch(line).await {
            Ok(Reply::Quit) => break,
            Ok(reply) => {
                if let Reply::Submitted(id) = &reply {
                    report.jobs.push(*id);
                }
                let text = reply.text();
                if !text.is_empty() {
                    writeln!(out, "{}", text)?;
                }
            }
            Err(e) => {
                report.errors += 1;
                tracing::warn!(line, error = %e, "Batch command failed");
                writeln!(out, "Error: {}", e)?;
            }
        }
    }

    Ok(report)
}
