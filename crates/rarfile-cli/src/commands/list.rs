//! List command implementation

use crate::cli::ListArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use rarfile_core::RarFile;

pub fn execute(args: &ListArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let config = super::archive_config(args.password.as_deref());

    let archive = add_archive_context(RarFile::open_with(&args.archive, config), &args.archive)?;

    formatter.format_listing(&args.archive, archive.catalog())
}
