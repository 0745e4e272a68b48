use clap::{Args, Parser, Subcommand};
use meta_duper_core::config::DEFAULT_CONFIG_PATH;
use meta_duper_core::CandidateSource;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "meta-duper")]
#[command(about = "Find duplicate recordings by their metadata sidecars", long_about = None)]
pub struct Cli {
    /// Configuration file, written with defaults when missing
    #[arg(short, long, global = true, value_name = "FILE", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Report duplicate recordings and write the audit log
    Scan(SourceArgs),
    /// Report duplicates, then delete the recordings that lost
    Resolve {
        #[command(flatten)]
        source: SourceArgs,
        /// Delete even when `delete_on_resolve` is off in the configuration
        #[arg(long)]
        delete: bool,
        /// Only show what would be deleted
        #[arg(long)]
        dry_run: bool,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Print configuration values
    PrintConfig,
    /// Write the default configuration file if it does not exist
    InitConfig,
}

#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Recording directory
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub path: PathBuf,

    /// List names with this command (whitespace separated) instead of reading the directory
    #[arg(long, value_name = "CMD", conflicts_with = "stdin")]
    pub list_command: Option<String>,

    /// Read names from standard input, one per line
    #[arg(long)]
    pub stdin: bool,
}

impl SourceArgs {
    pub fn candidate_source(&self) -> CandidateSource {
        if self.stdin {
            return CandidateSource::Stdin;
        }
        if let Some(command) = &self.list_command {
            let mut words = command.split_whitespace().map(str::to_string);
            if let Some(program) = words.next() {
                return CandidateSource::Command {
                    program,
                    args: words.collect(),
                };
            }
        }
        CandidateSource::Directory(self.path.clone())
    }
}

/// Standard input carries the name list, so it cannot also answer the
/// delete prompt. Deleting from a `--stdin` list needs `--yes`.
pub fn check_delete_args(source: &SourceArgs, dry_run: bool, yes: bool) -> Result<(), String> {
    if source.stdin && !dry_run && !yes {
        return Err("--yes is required to delete when names are read from --stdin".to_string());
    }
    Ok(())
}
