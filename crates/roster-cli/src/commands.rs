use anyhow::{bail, Context};
use colored::Colorize;
use roster_sdk::{
    Argon2Hasher, Entity, Filter, NewUser, Roster, StoreConfig, User, UserSession,
    UserUpdate,
};
use roster_types::{serialize, Fields};
use serde_json::Value;
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = StoreConfig::new(&cli.data_dir);
    debug!(data_dir = %cli.data_dir.display(), "opening roster");
    let mut roster = Roster::open(config)
        .with_context(|| format!("cannot open roster in {}", cli.data_dir.display()))?;
    match cli.command {
        Command::Users(cmd) => run_users(&mut roster, cmd, cli.format),
        Command::Sessions(cmd) => run_sessions(&roster, cmd, cli.format),
    }
}

fn run_users(roster: &mut Roster, cmd: UsersCommand, format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        UsersCommand::List => {
            print_users(&roster.users().all(), format);
            Ok(())
        }
        UsersCommand::Show(args) => {
            let Some(user) = roster.users().get(args.id.as_str()) else {
                bail!("user {} not found", args.id);
            };
            print_record(serialize(user, false), format)
        }
        UsersCommand::Create(args) => cmd_create(roster, args, format),
        UsersCommand::Update(args) => {
            let update = UserUpdate {
                first_name: args.first_name,
                last_name: args.last_name,
            };
            if update.is_empty() {
                bail!("nothing to update: pass --first-name and/or --last-name");
            }
            let Some(user) = roster.update_user(&args.id, update)? else {
                bail!("user {} not found", args.id);
            };
            println!("{} Updated {}", "✓".green().bold(), user.id().to_string().yellow());
            Ok(())
        }
        UsersCommand::Remove(args) => {
            if roster.remove_user(&args.id)?.is_none() {
                bail!("user {} not found", args.id);
            }
            println!("{} Removed {}", "✓".green().bold(), args.id.yellow());
            Ok(())
        }
        UsersCommand::Search(args) => {
            let filter = parse_filter(&args.terms)?;
            print_users(&roster.users().search(&filter), format);
            Ok(())
        }
        UsersCommand::Count => {
            println!("{}", roster.users().count());
            Ok(())
        }
    }
}

fn cmd_create(roster: &mut Roster, args: CreateArgs, format: OutputFormat) -> anyhow::Result<()> {
    let new = NewUser {
        email: args.email,
        password: args.password,
        first_name: args.first_name,
        last_name: args.last_name,
    };
    if new.email.is_empty() {
        bail!("email missing");
    }
    if new.password.is_empty() {
        bail!("password missing");
    }

    let user = roster.create_user(new, &Argon2Hasher::new())?;
    match format {
        OutputFormat::Text => {
            println!("{} Created {}", "✓".green().bold(), user.id().to_string().yellow());
            Ok(())
        }
        OutputFormat::Json => print_record(serialize(user, false), format),
    }
}

fn run_sessions(roster: &Roster, cmd: SessionsCommand, format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        SessionsCommand::List => {
            let sessions = roster.sessions().all();
            match format {
                OutputFormat::Json => print_json_list(sessions.iter().map(|s| serialize(*s, false))),
                OutputFormat::Text => {
                    for session in sessions {
                        print_session(session);
                    }
                }
            }
            Ok(())
        }
        SessionsCommand::Count => {
            println!("{}", roster.sessions().count());
            Ok(())
        }
    }
}

/// Parse `FIELD=VALUE` terms. A value that parses as JSON is used as such
/// (so `last_name=null` matches unset names); anything else is a string.
pub fn parse_filter(terms: &[String]) -> anyhow::Result<Filter> {
    let mut filter = Filter::new();
    for term in terms {
        let Some((field, raw)) = term.split_once('=') else {
            bail!("search term {term:?} is not of the form FIELD=VALUE");
        };
        if field.is_empty() {
            bail!("search term {term:?} has an empty field name");
        }
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        filter = filter.eq(field, value);
    }
    Ok(filter)
}

fn print_users(users: &[&User], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json_list(users.iter().map(|u| serialize(*u, false))),
        OutputFormat::Text => {
            if users.is_empty() {
                println!("No users.");
            }
            for user in users {
                println!(
                    "{}  {}  {}",
                    user.id().to_string().yellow(),
                    user.display_name().bold(),
                    user.updated_at().to_string().dimmed()
                );
            }
        }
    }
}

fn print_session(session: &UserSession) {
    println!(
        "{}  user {}  {}",
        session.session_id.yellow(),
        session.user_id.cyan(),
        session.created_at().to_string().dimmed()
    );
}

fn print_record(record: Fields, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&Value::Object(record))?);
        }
        OutputFormat::Text => {
            for (key, value) in record {
                let shown = match value {
                    Value::String(s) => s,
                    Value::Null => "-".to_string(),
                    other => other.to_string(),
                };
                println!("{:>12}: {}", key.bold(), shown);
            }
        }
    }
    Ok(())
}

fn print_json_list(records: impl Iterator<Item = Fields>) {
    let list: Vec<Value> = records.map(Value::Object).collect();
    println!("{}", Value::Array(list));
}
