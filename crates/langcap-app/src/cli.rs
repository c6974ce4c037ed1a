use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "langcap",
    version,
    about = "Vocabulary capture backend: JSON requests on stdin, JSON replies on stdout"
)]
pub struct Cli {
    /// Profile to load from <data dir>/profiles
    #[arg(long, short = 'p', default_value = "main")]
    pub profile: String,

    /// Create this profile as a copy of main, then use it
    #[arg(long = "create-profile", value_name = "NAME", conflicts_with = "profile")]
    pub create_profile: Option<String>,

    /// Override the data directory (also LANGCAP_DATA_DIR)
    #[arg(long = "data-dir", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[arg(long = "log-format", value_enum, default_value = "pretty")]
    pub log_format: LogFormatArg,

    /// -v for debug, -vv for trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
