mod auth;
mod cli;
mod error;
mod fmt;
mod loader;
mod models;
mod normalize;
mod pipeline;
mod resolver;
mod session;
mod settings;
mod tui;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

fn init_tracing() {
    let filter = EnvFilter::try_from_env("MARCA_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init {
            workbook,
            credentials,
            currency,
        } => cli::init::run(&workbook, credentials.as_deref(), currency.as_deref()),
        Commands::Login {
            user,
            password_stdin,
        } => cli::login::login(user.as_deref(), password_stdin),
        Commands::Logout => cli::login::logout(),
        Commands::Status => cli::status::run(),
        Commands::Brands => cli::brands::list(),
        Commands::Options { selection } => cli::options::run(&selection),
        Commands::Report {
            selection,
            from_month,
            to_month,
            output,
        } => cli::report::run(&selection, from_month, to_month, &output),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "marca", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
