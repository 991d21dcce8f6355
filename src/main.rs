use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::{
    AddCommand, ConfigCommand, CredentialArgs, DeleteCommand, EditCommand, HistoryCommand,
    TodayCommand,
};
use gymlog::auth::SessionContext;
use gymlog::backend;
use gymlog::config::Config;

#[derive(Parser)]
#[command(name = "gymlog")]
#[command(version)]
#[command(about = "Log workout sets and review daily training volume", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with email and password
    Login(CredentialArgs),

    /// Create an account
    Signup(CredentialArgs),

    /// Sign out and forget the saved session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Log a set
    Add(AddCommand),

    /// Show one day's sets and running volume
    Today(TodayCommand),

    /// Show all logged days, newest first
    History(HistoryCommand),

    /// Change a logged set
    Edit(EditCommand),

    /// Remove a logged set
    Delete(DeleteCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gymlog=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = Config::load(cli.config)?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(execute_command(cli.command, &config))
}

async fn execute_command(
    command: Option<Commands>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let command = match command {
        Some(Commands::Config(cmd)) => return cmd.run(config),
        Some(command) => command,
        None => {
            println!("Use --help to see available commands");
            return Ok(());
        }
    };

    // Restored once; every command below reads the user from here
    let provider = backend::auth_provider(config)?;
    let mut session =
        SessionContext::restore(config.session_path.value.clone(), provider.as_ref()).await?;

    match command {
        Commands::Login(args) => {
            commands::auth::login(&args, &mut session, provider.as_ref()).await
        }
        Commands::Signup(args) => {
            commands::auth::signup(&args, &mut session, provider.as_ref()).await
        }
        Commands::Logout => commands::auth::logout(&mut session, provider.as_ref()).await,
        Commands::Whoami => commands::auth::whoami(&session),
        Commands::Add(cmd) => {
            let user = session.require_user()?.id.clone();
            let store = backend::entry_store(config, session.session()).await?;
            cmd.run(store.as_ref(), user).await
        }
        Commands::Today(cmd) => {
            let user = session.require_user()?.id.clone();
            let store = backend::entry_store(config, session.session()).await?;
            cmd.run(store.as_ref(), user).await
        }
        Commands::History(cmd) => {
            let user = session.require_user()?.id.clone();
            let store = backend::entry_store(config, session.session()).await?;
            cmd.run(store.as_ref(), user).await
        }
        Commands::Edit(cmd) => {
            let user = session.require_user()?.id.clone();
            let store = backend::entry_store(config, session.session()).await?;
            cmd.run(store.as_ref(), user).await
        }
        Commands::Delete(cmd) => {
            let user = session.require_user()?.id.clone();
            let store = backend::entry_store(config, session.session()).await?;
            cmd.run(store.as_ref(), user).await
        }
        Commands::Config(_) => unreachable!("config runs before the session is restored"),
    }
}
