use anyhow::Result;
use colored::Colorize;

use crate::app::{get_config_dir, init_config, Config};

use super::Commands;

/// Handle CLI subcommands. Returns true when the command was terminal and
/// the chat interface should not start.
pub async fn handle_command(command: &Commands, config: &Config) -> Result<bool> {
    match command {
        Commands::Init => {
            println!("Initializing Patou configuration...");
            init_config()?;
            println!("Configuration initialized successfully!");
            Ok(true)
        }
        Commands::Version => {
            show_version();
            Ok(true)
        }
        Commands::Status => {
            show_status(config).await?;
            Ok(true)
        }
        Commands::Chat => Ok(false), // Continue to chat interface
    }
}

/// Show version information
pub fn show_version() {
    println!("Patou v{}", env!("CARGO_PKG_VERSION"));
    println!("   A terminal client for the Patou pet-advice chatbot");
}

/// Show server reachability and configuration status
async fn show_status(config: &Config) -> Result<()> {
    println!("Patou Status:");
    println!();

    // Any HTTP answer, even an error status, means the server is up
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(3))
        .build()?;
    match client.get(&config.server.url).send().await {
        Ok(_) => println!("  [OK] Server: reachable at {}", config.server.url.green()),
        Err(_) => println!(
            "  [ERROR] Server: not reachable at {}",
            config.server.url.red()
        ),
    }

    // Check configuration
    let config_path = get_config_dir()?.join("config.toml");
    if config_path.exists() {
        println!("  [OK] Configuration: {}", config_path.display());
    } else {
        println!("  [WARNING] Configuration: Not found (using defaults)");
    }

    println!();
    Ok(())
}
