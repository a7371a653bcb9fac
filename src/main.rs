//! Botyard - Registry and process supervisor for self-hosted bot processes
//!
//! Main entry point for the Botyard CLI.

use botyard::bot::{BotRecord, BotSelector, BotSource, BotSpec, BotSummary};
use botyard::config::BotyardConfig;
use botyard::registry::Registry;
use botyard::supervisor::BotManager;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

/// Botyard - Register and supervise self-hosted bot processes
#[derive(Parser, Debug)]
#[command(name = "botyard")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: ~/.config/botyard/config.yaml)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Register a bot whose code is already on disk
    Register {
        /// Unique bot name
        name: String,

        /// Directory containing the bot's code
        path: PathBuf,

        /// Entrypoint file, relative to the bot directory
        #[arg(short, long, default_value = "main.py")]
        entrypoint: String,

        /// Credential handed to the bot as DISCORD_TOKEN
        #[arg(long, env = botyard::supervisor::CREDENTIAL_ENV_VAR, hide_env_values = true)]
        credential: String,

        /// Database URI handed to the bot as BOT_DB_URI
        #[arg(long)]
        db_uri: Option<String>,
    },

    /// Clone a bot repository into the workspace and register it
    Ingest {
        /// Repository URL to clone
        url: String,

        /// Bot name (default: derived from the URL)
        #[arg(short, long)]
        name: Option<String>,

        /// Branch to check out
        #[arg(short, long)]
        branch: Option<String>,

        /// Entrypoint file, relative to the clone
        #[arg(short, long, default_value = "main.py")]
        entrypoint: String,

        /// Credential handed to the bot as DISCORD_TOKEN
        #[arg(long, env = botyard::supervisor::CREDENTIAL_ENV_VAR, hide_env_values = true)]
        credential: String,

        /// Database URI handed to the bot as BOT_DB_URI
        #[arg(long)]
        db_uri: Option<String>,
    },

    /// List registered bots
    List {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Start a bot's process
    Start {
        /// Bot id or name
        identifier: String,
    },

    /// Stop a bot's process
    Stop {
        /// Bot id or name
        identifier: String,

        /// Kill immediately instead of terminating gracefully
        #[arg(short, long)]
        force: bool,
    },

    /// Re-probe and report a bot's run state
    Status {
        /// Bot id or name
        identifier: String,
    },

    /// Show a bot's full record
    Show {
        /// Bot id or name
        identifier: String,
    },
}

fn main() {
    // A .env in the working directory feeds the manager and, through the
    // inherited environment, every bot it launches. Must happen before
    // argument parsing so env-fed options see the file's values.
    let env_file = dotenvy::dotenv().ok();

    // Initialize logging
    if let Err(e) = botyard::logging::init() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    if let Some(ref path) = env_file {
        tracing::debug!(path = %path.display(), "Loaded environment from .env file");
    }

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> botyard::Result<()> {
    // Load configuration
    let config = if let Some(ref config_path) = cli.config {
        BotyardConfig::load(config_path)?
    } else {
        BotyardConfig::load_or_default()?
    };

    let registry = Registry::new(config.registry_config())?;
    let manager = BotManager::new(registry, config.manager_config());

    match cli.command {
        Commands::Register {
            name,
            path,
            entrypoint,
            credential,
            db_uri,
        } => {
            // Resolve to an absolute path; also validates the directory exists
            let path = std::fs::canonicalize(&path)?;

            let mut spec = BotSpec::new(&name, BotSource::Local { path }, entrypoint, credential);
            if let Some(db_uri) = db_uri {
                spec = spec.with_extra_env(db_uri);
            }

            let id = manager.register(&spec)?;
            println!("Registered bot '{}' with id {}", name, id);
        }

        Commands::Ingest {
            url,
            name,
            branch,
            entrypoint,
            credential,
            db_uri,
        } => {
            let name = match name {
                Some(name) => name,
                None => botyard::git::repo_name_from_url(&url).ok_or_else(|| {
                    botyard::BotyardError::Git(format!(
                        "Cannot derive a bot name from '{}'; pass --name",
                        url
                    ))
                })?,
            };

            let dest = config.workspace_dir.join(&name);
            botyard::git::clone_repository(&url, &dest, branch.as_deref())?;
            println!("Cloned {} into {}", url, dest.display());

            let mut spec = BotSpec::new(
                &name,
                BotSource::Remote { url, path: dest },
                entrypoint,
                credential,
            );
            if let Some(db_uri) = db_uri {
                spec = spec.with_extra_env(db_uri);
            }

            let id = manager.register(&spec)?;
            println!("Registered bot '{}' with id {}", name, id);
        }

        Commands::List { json } => {
            let bots = manager.list()?;

            if json {
                println!("{}", serde_json::to_string_pretty(&bots)?);
            } else if bots.is_empty() {
                println!("No bots registered.");
            } else {
                println!("Found {} bots:", bots.len());
                println!();
                for bot in &bots {
                    print_bot_summary(bot);
                }
            }
        }

        Commands::Start { identifier } => {
            let pid = manager.start(&BotSelector::parse(&identifier))?;
            println!("Started bot {} (pid {})", identifier, pid);
        }

        Commands::Stop { identifier, force } => {
            manager.stop(&BotSelector::parse(&identifier), force)?;
            println!("Stopped bot {}", identifier);
        }

        Commands::Status { identifier } => {
            let status = manager.status(&BotSelector::parse(&identifier))?;
            println!("{}: {}", identifier, status);
        }

        Commands::Show { identifier } => {
            let record = manager.describe(&BotSelector::parse(&identifier))?;
            print_bot_detailed(&record);
        }
    }

    Ok(())
}

fn print_bot_summary(bot: &BotSummary) {
    let pid_str = bot
        .pid
        .map(|p| p.to_string())
        .unwrap_or_else(|| "-".to_string());

    println!("[{}] {} ({}) pid {}", bot.id, bot.name, bot.status, pid_str);
}

fn print_bot_detailed(bot: &BotRecord) {
    println!("{}: {}", bot.id, bot.name);
    println!("Status:       {}", bot.status);
    println!(
        "PID:          {}",
        bot.pid
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string())
    );

    if let Some(url) = bot.source.repo_url() {
        println!("Repository:   {}", url);
    }

    println!("Path:         {}", bot.source.local_path().display());
    println!("Entrypoint:   {}", bot.entrypoint);
    // Never echo the secret itself
    println!(
        "Credential:   {}",
        if bot.credential.is_empty() {
            "(not set)"
        } else {
            "(set)"
        }
    );

    if let Some(ref uri) = bot.extra_env {
        println!("Database URI: {}", uri);
    }

    println!("Log file:     {}", bot.log_file_name());
    println!("Created:      {}", bot.created_at);
    println!("Updated:      {}", bot.updated_at);
}
