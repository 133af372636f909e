use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

use patou::{
    api::{ChatApi, HttpChatApi},
    app::{load_config, load_config_from, Config},
    chat::{ChatController, SendStatus},
    cli::{handle_command, Cli},
    tui::{run_ui, TuiApp},
    utils::init_logger,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    init_logger(cli.verbose);

    // Load configuration
    let mut config: Config = if let Some(config_path) = &cli.config {
        load_config_from(config_path)?
    } else {
        load_config().unwrap_or_default()
    };

    // CLI flags override the configured server
    if let Some(server) = &cli.server {
        config.server.url = server.clone();
    }

    // Handle terminal subcommands
    if let Some(command) = &cli.command {
        if handle_command(command, &config).await? {
            return Ok(());
        }
    }

    // Check if running in non-interactive mode
    if let Some(message) = cli.message.clone() {
        return run_one_shot(&config, &message, cli.image.as_deref()).await;
    }

    // Interactive chat interface
    let api: Arc<dyn ChatApi> = Arc::new(HttpChatApi::new(
        &config.server.url,
        config.server.request_timeout_secs,
    )?);
    let controller = Arc::new(Mutex::new(ChatController::new(api)));
    let app = TuiApp::new(controller, &config.ui);
    run_ui(app).await
}

/// Send a single message and print the reply
async fn run_one_shot(config: &Config, message: &str, image: Option<&Path>) -> Result<()> {
    let api: Arc<dyn ChatApi> = Arc::new(HttpChatApi::new(
        &config.server.url,
        config.server.request_timeout_secs,
    )?);
    let mut controller = ChatController::new(api);

    controller.start_new_conversation().await;
    if controller.active_id().is_none() {
        anyhow::bail!(
            "Could not start a conversation with the server at {}",
            config.server.url
        );
    }

    if let Some(path) = image {
        controller.attach_image(path)?;
    }

    let status = controller.send_message(message).await;
    let reply = controller
        .transcript()
        .last()
        .map(|m| m.text().to_string())
        .unwrap_or_default();

    match status {
        SendStatus::Replied => {
            println!("{}", reply.green());
            Ok(())
        }
        SendStatus::Fallback => {
            // The fallback text is all we have; exit non-zero so scripts notice
            eprintln!("{}", reply.red());
            std::process::exit(1);
        }
        SendStatus::Skipped => anyhow::bail!("Nothing to send"),
    }
}
