//! `namu blame` command implementation.

use std::path::PathBuf;

use clap::Args;
use namu_blame::{BlameSegment, Revision};
use serde::Serialize;
use uuid::Uuid;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the blame command.
#[derive(Args)]
pub(crate) struct BlameArgs {
    /// Successive revisions of one document, oldest first.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Number revisions 1, 2, 3... instead of using random ids.
    #[arg(long)]
    sequential: bool,
}

#[derive(Serialize)]
struct BlameReport<'a> {
    revisions: Vec<RevisionEntry>,
    blame: &'a [BlameSegment],
    lines: Vec<LineEntry<'a>>,
}

#[derive(Serialize)]
struct RevisionEntry {
    uuid: Uuid,
    file: String,
}

#[derive(Serialize)]
struct LineEntry<'a> {
    line: usize,
    /// Index into `revisions` of the line's owner.
    revision: Option<usize>,
    text: &'a str,
}

impl BlameArgs {
    /// Execute the blame command.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let mut revisions: Vec<Revision> = Vec::with_capacity(self.files.len());
        let mut entries = Vec::with_capacity(self.files.len());
        for (n, file) in self.files.iter().enumerate() {
            let content = std::fs::read_to_string(file)?;
            let uuid = if self.sequential {
                Uuid::from_u128(u128::try_from(n + 1).unwrap_or(u128::MAX))
            } else {
                Uuid::new_v4()
            };
            let revision = match revisions.last() {
                Some(previous) => previous.next(uuid, content),
                None => Revision::first(uuid, content),
            };
            tracing::info!(file = %file.display(), segments = revision.blame.len(), "Attributed revision");
            revisions.push(revision);
            entries.push(RevisionEntry {
                uuid,
                file: file.display().to_string(),
            });
        }

        let Some(last) = revisions.last() else {
            return Err(CliError::Validation("no revisions given".to_owned()));
        };
        let report = blame_report(last, entries);
        output.result(&serde_json::to_string_pretty(&report)?)?;
        output.info(&format!(
            "{} revisions, {} lines",
            report.revisions.len(),
            report.lines.len()
        ));
        Ok(())
    }
}

fn blame_report(last: &Revision, revisions: Vec<RevisionEntry>) -> BlameReport<'_> {
    let lines = last
        .line_owners()
        .into_iter()
        .zip(last.content.split('\n'))
        .enumerate()
        .map(|(n, (owner, text))| LineEntry {
            line: n + 1,
            revision: revisions.iter().position(|entry| entry.uuid == owner),
            text,
        })
        .collect();
    BlameReport {
        revisions,
        blame: &last.blame,
        lines,
    }
}
