//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use crate::progress::CliProgress;
use anyhow::Context;
use anyhow::Result;
use rarfile_core::MemberSelection;
use rarfile_core::NoopProgress;
use rarfile_core::ProgressCallback;
use rarfile_core::RarFile;
use std::fs;
use tracing::debug;

pub fn execute(
    args: &ExtractArgs,
    formatter: &dyn OutputFormatter,
    show_progress: bool,
) -> Result<()> {
    fs::create_dir_all(&args.dest).with_context(|| {
        format!(
            "failed to create output directory '{}'",
            args.dest.display()
        )
    })?;

    let config = super::archive_config(args.password.as_deref());
    let archive = add_archive_context(RarFile::open_with(&args.archive, config), &args.archive)?;

    debug!(
        archive = %args.archive.display(),
        dest = %args.dest.display(),
        members = args.members.len(),
        "extract requested"
    );
    let members: Vec<&str> = args.members.iter().map(String::as_str).collect();
    let members = (!members.is_empty()).then_some(members.as_slice());

    // Use progress bar if TTY is detected (not quiet, not JSON, is terminal)
    let mut progress: Box<dyn ProgressCallback> = if show_progress && CliProgress::should_show() {
        let total = archive.catalog().count_selected(&selection(&args.members));
        Box::new(CliProgress::new(total, "Extracting"))
    } else {
        Box::new(NoopProgress)
    };

    let report = add_archive_context(
        archive.extractall_with_progress(
            Some(args.dest.as_path()),
            members,
            None,
            progress.as_mut(),
        ),
        &args.archive,
    )?;
    drop(progress);

    formatter.format_extraction_result(&report)?;

    Ok(())
}

/// Members named by `--member`, or everything when none were given.
fn selection(members: &[String]) -> MemberSelection {
    if members.is_empty() {
        MemberSelection::All
    } else {
        MemberSelection::only(members.iter().cloned())
    }
}
