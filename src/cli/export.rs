use std::io::Write;

use colored::Colorize;

use crate::backup::container::Container;
use crate::backup::export::{export_all_with_progress, planned_files};
use crate::cli::{create_progress_bar, wprintln};
use crate::NbuError;

/// Options for the `nbu export` subcommand.
pub struct ExportOptions {
    pub file: String,
    /// Output directory; created if missing.
    pub dir: String,
}

/// Export the backup's records and report what was written.
///
/// Every failed file is listed. The command fails if any file could not be
/// written, after all other files have been attempted.
pub fn execute(opts: &ExportOptions, writer: &mut dyn Write) -> Result<(), NbuError> {
    let mut backup = Container::open(&opts.file)?;

    let pb = create_progress_bar(planned_files(backup.records()), "files");
    let report = export_all_with_progress(&mut backup, &opts.dir, |_| pb.inc(1))?;
    pb.finish_and_clear();

    for path in &report.written {
        wprintln!(writer, "{}", path.display())?;
    }
    for failure in &report.failures {
        wprintln!(
            writer,
            "{} {}: {}",
            "FAILED".red(),
            failure.path.display(),
            failure.error
        )?;
    }
    wprintln!(
        writer,
        "{} files written to {}",
        report.written.len(),
        opts.dir
    )?;

    if report.is_complete() {
        Ok(())
    } else {
        Err(NbuError::Io(format!(
            "{} of {} exports failed",
            report.failures.len(),
            report.failures.len() + report.written.len()
        )))
    }
}
