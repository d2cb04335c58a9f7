use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;

use tg_dispatch::application::errors::BotError;
use tg_dispatch::domain::traits::Transport;
use tg_dispatch::infrastructure::adapters::{ConsoleAdapter, TelegramAdapter};
use tg_dispatch::{
    Bot, Callback, ChatId, Command, ConfigError, Config, Handler, HandlerResult, InboundMessage,
    MenuPage, Responder,
};

#[derive(Parser)]
#[command(name = "tg-dispatch")]
#[command(about = "Command dispatch and inline menus for chat bots", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Bot token (overrides config)
    #[arg(short, long)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            if let Err(e) = run_bot(cli.config, cli.token).await {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Version => {
            println!("tg-dispatch v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => {
            init_config();
        }
    }
}

async fn run_bot(config_path: String, token_override: Option<String>) -> Result<(), BotError> {
    let config = if std::path::Path::new(&config_path).exists() {
        Config::load(&config_path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config: {}, using defaults", e);
            Config::load_env()
        })
    } else {
        Config::load_env()
    };

    tracing::info!("Starting tg-dispatch: {}", config.bot.name);

    let (updates_tx, updates_rx) = mpsc::channel(config.dispatch.queue_capacity.max(1));
    let token = token_override.or_else(|| config.telegram_token().map(String::from));

    let (running, input) = match token {
        Some(token) => {
            let poll_timeout = config
                .adapters
                .telegram
                .as_ref()
                .map(|t| t.poll_timeout_secs)
                .unwrap_or(30);
            let adapter = Arc::new(TelegramAdapter::new(token, poll_timeout));

            match adapter.get_me().await {
                Ok(username) => tracing::info!("Bot started: @{}", username),
                Err(e) => tracing::warn!("Failed to fetch bot info: {}", e),
            }

            let bot = build_bot(adapter.clone(), &config)?;
            if let Err(e) = adapter.register_commands(&bot.commands()).await {
                tracing::warn!("Failed to register commands: {}", e);
            }

            let running = bot.start(updates_rx)?;
            let poller = Arc::clone(&adapter);
            let input = tokio::spawn(async move {
                poller.poll_updates(updates_tx).await;
            });
            (running, input)
        }
        None => {
            // Console mode
            let adapter = Arc::new(ConsoleAdapter::new());
            let bot = build_bot(adapter.clone(), &config)?;
            let running = bot.start(updates_rx)?;

            println!("tg-dispatch console. Type /start, or cb:<data> to press a button. Ctrl+D to quit.");
            let input = tokio::spawn(async move {
                if let Err(e) = adapter.read_updates(updates_tx).await {
                    tracing::error!("Console input failed: {}", e);
                }
            });
            (running, input)
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => tracing::info!("Interrupted"),
        _ = input => tracing::info!("Input source finished"),
    }

    running.stop().await
}

fn build_bot(transport: Arc<dyn Transport>, config: &Config) -> Result<Bot, ConfigError> {
    let mut bot = Bot::from_config(transport, config);

    bot.register(
        Command::new("start", StartHandler)
            .with_description("Open the main menu"),
    )?;

    let version = format!("{} v{}", config.bot.name, env!("CARGO_PKG_VERSION"));
    bot.register(
        Command::with_reply("version", move |_| Some(version.clone()))
            .with_description("Show version"),
    )?;

    bot.register(
        Command::with_reply("echo", |msg| Some(msg.args.join(" ")).filter(|s| !s.is_empty()))
            .with_description("Echo the arguments back")
            .with_usage("echo <text>"),
    )?;

    bot.register(
        Command::new("count", CountHandler::default())
            .with_description("Count the messages that follow"),
    )?;

    // Help is rendered from everything registered so far
    let help = render_help(&bot, &config.bot.prefix);
    bot.register(
        Command::with_reply("help", move |_| Some(help.clone()))
            .with_description("Show available commands"),
    )?;

    bot.register_menu(
        MenuPage::new("main", "Main menu")
            .command("Help", "help", vec![])
            .command("Version", "version", vec![])
            .submenu(
                "Tools",
                MenuPage::new("tools", "Tools")
                    .command("Start counting", "count", vec![])
                    .command("Say hi", "echo", vec!["hi".to_string()])
                    .back("Back", "main"),
            ),
    )?;

    Ok(bot)
}

fn render_help(bot: &Bot, prefix: &str) -> String {
    let mut text = String::from("Available commands:\n");
    for command in bot.commands() {
        let usage = command.usage.as_deref().unwrap_or(&command.name);
        let description = command.description.as_deref().unwrap_or("");
        text.push_str(&format!("{}{} - {}\n", prefix, usage, description));
    }
    text.push_str(&format!("{}help - Show available commands", prefix));
    text
}

/// Sends the conversation to the main menu
struct StartHandler;

#[async_trait]
impl Handler for StartHandler {
    async fn handle(&self, _message: &InboundMessage, _responder: &Responder) -> HandlerResult {
        Ok(Some(Callback::transit_to("main")))
    }
}

/// Counts plain messages until the conversation moves on
#[derive(Default)]
struct CountHandler {
    counts: Mutex<HashMap<ChatId, usize>>,
}

#[async_trait]
impl Handler for CountHandler {
    async fn handle(&self, message: &InboundMessage, responder: &Responder) -> HandlerResult {
        let count = {
            let mut counts = self
                .counts
                .lock()
                .map_err(|_| BotError::Handler("count state poisoned".to_string()))?;
            let count = counts.entry(message.chat_id).or_insert(0);
            if !message.is_command() {
                *count += 1;
            }
            *count
        };

        if message.is_command() {
            responder.send_text("Counting. Send anything, or another command to stop.").await?;
        } else {
            responder.send_text(format!("{} so far", count)).await?;
        }
        Ok(None)
    }

    fn dump(&self, chat_id: ChatId) {
        if let Ok(mut counts) = self.counts.lock() {
            if let Some(count) = counts.remove(&chat_id) {
                tracing::info!("Chat {} counted {} messages", chat_id, count);
            }
        }
    }
}

fn init_config() {
    let config = Config::default();
    match config.to_yaml() {
        Ok(yaml) => {
            println!("{}", yaml);
            println!("\nSave this to config.yaml and adjust as needed.");
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
