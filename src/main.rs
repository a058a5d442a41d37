use anyhow::Result;
use clap::{Parser, Subcommand};

mod admin;
mod candidate;
mod config;
mod import;

use crate::config::Config;

#[derive(Parser)]
#[clap(name = "interview-portal", version, about = "Admin and candidate client for the interview portal")]
struct Portal {
    #[clap(flatten)]
    config: Config,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and print the token to export as PORTAL_API_TOKEN.
    Login {
        #[clap(long)]
        email: String,
        #[clap(long, env = "PORTAL_PASSWORD", hide_env_values = true)]
        password: String,
    },
    #[clap(subcommand)]
    Categories(admin::CategoryCommand),
    #[clap(subcommand)]
    Questions(admin::QuestionCommand),
    #[clap(subcommand)]
    Tests(admin::TestCommand),
    #[clap(subcommand)]
    Results(admin::ResultCommand),
    #[clap(subcommand)]
    Import(import::ImportCommand),
    #[clap(subcommand)]
    Candidate(candidate::CandidateCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    #[cfg(feature = "env-file")]
    dotenvy::dotenv().ok();

    let portal = Portal::parse();
    portal.config.init_tracing();

    let client = portal.config.client();

    match portal.command {
        Command::Login { email, password } => admin::login(&client, &email, &password).await,
        Command::Categories(command) => admin::categories(&client, command).await,
        Command::Questions(command) => admin::questions(&client, command).await,
        Command::Tests(command) => admin::tests(&client, command).await,
        Command::Results(command) => admin::results(&client, command).await,
        Command::Import(command) => import::import(&client, command).await,
        Command::Candidate(command) => {
            candidate::candidate(&client, &portal.config.handoff(), command).await
        }
    }
}
