use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "roster",
    about = "Roster: inspect and edit user and session stores",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding the snapshot files
    #[arg(short, long, global = true, default_value = ".")]
    pub data_dir: PathBuf,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Manage users
    #[command(subcommand)]
    Users(UsersCommand),
    /// Inspect sessions
    #[command(subcommand)]
    Sessions(SessionsCommand),
}

#[derive(Subcommand)]
pub enum UsersCommand {
    /// List every user
    List,
    /// Show one user
    Show(IdArgs),
    /// Create a user
    Create(CreateArgs),
    /// Change a user's names
    Update(UpdateArgs),
    /// Delete a user and their sessions
    Remove(IdArgs),
    /// Find users by exact field values
    Search(SearchArgs),
    /// Count users
    Count,
}

#[derive(Subcommand)]
pub enum SessionsCommand {
    /// List every session
    List,
    /// Count sessions
    Count,
}

#[derive(Args)]
pub struct IdArgs {
    pub id: String,
}

#[derive(Args)]
pub struct CreateArgs {
    #[arg(long)]
    pub email: String,
    /// Plaintext password; only its Argon2id hash is stored
    #[arg(long)]
    pub password: String,
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
}

#[derive(Args)]
pub struct UpdateArgs {
    pub id: String,
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Terms of the form FIELD=VALUE; all must match
    #[arg(required = true)]
    pub terms: Vec<String>,
}
