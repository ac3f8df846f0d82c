//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rarfile")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List archive members
    List(ListArgs),
    /// Test archive integrity
    Test(TestArgs),
    /// Extract archive members
    Extract(ExtractArgs),
    /// Generate shell completions
    Completion(CompletionArgs),
}

#[derive(clap::Args)]
pub struct ListArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Password for archives with encrypted headers
    #[arg(short, long, value_name = "PASSWORD")]
    pub password: Option<String>,
}

#[derive(clap::Args)]
pub struct TestArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Password for encrypted archives
    #[arg(short, long, value_name = "PASSWORD")]
    pub password: Option<String>,
}

#[derive(clap::Args)]
pub struct ExtractArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Output directory
    #[arg(value_name = "DEST")]
    pub dest: PathBuf,

    /// Password for encrypted archives
    #[arg(short, long, value_name = "PASSWORD")]
    pub password: Option<String>,

    /// Extract only this member (can be repeated)
    #[arg(short, long = "member", value_name = "NAME")]
    pub members: Vec<String>,
}

#[derive(clap::Args)]
pub struct CompletionArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_extract_repeated_members() {
        let cli = Cli::try_parse_from([
            "rarfile", "extract", "a.rar", "out", "-m", "a.txt", "--member", "b/c.txt",
        ])
        .unwrap();
        let Commands::Extract(args) = cli.command else {
            panic!("expected extract");
        };
        assert_eq!(args.members, vec!["a.txt", "b/c.txt"]);
        assert_eq!(args.dest, PathBuf::from("out"));
        assert!(args.password.is_none());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["rarfile", "-q", "-v", "list", "a.rar"]).is_err());
    }
}
