use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "swellcheck", version, about = "Surf condition alarm")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to config.yaml
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate one user right now
    Check {
        /// E-mail address of the user
        email: String,
        /// Print the decision without sending anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Send a test message through the configured mail provider
    TestEmail {
        /// Recipient; defaults to $TEST_EMAIL
        #[arg(long)]
        to: Option<String>,
    },
    /// Classify a wind direction for a beach
    Classify {
        beach_id: u32,
        /// Compass label (e.g. SSW) or bearing in degrees
        direction: String,
    },
    /// List the beach catalog
    Beaches,
    /// Re-run interactive setup
    Init,
}
