use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "patou")]
#[command(version)]
#[command(about = "A terminal client for the Patou pet-advice chatbot", long_about = None)]
pub struct Cli {
    /// Base URL of the chatbot server (e.g. http://127.0.0.1:5000)
    #[arg(short, long)]
    pub server: Option<String>,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Send a single message non-interactively and print the reply
    #[arg(short, long)]
    pub message: Option<String>,

    /// Image to attach to the non-interactive message
    #[arg(short, long, requires = "message")]
    pub image: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize configuration
    Init,
    /// Start a chat session (default)
    Chat,
    /// Show version information
    Version,
    /// Check that the chatbot server is reachable
    Status,
}
