//! Subcommand implementations.

pub mod completion;
pub mod extract;
pub mod list;

use rarfile_core::ArchiveConfig;

/// Configuration carrying the `--password` flag as the session default, so
/// it also covers the listing pass.
fn archive_config(password: Option<&str>) -> ArchiveConfig {
    match password {
        Some(password) => ArchiveConfig::default().with_password(password),
        None => ArchiveConfig::default(),
    }
}
