mod acl;
mod api;
mod cli;
mod commands;
mod config;
mod ssh;
mod ui;

use anyhow::{Context as AnyhowContext, Result};
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use std::io;

use api::PveClient;
use cli::{AclCommand, Cli, Commands, GroupCommand, StorageCommand, TokenCommand, UserCommand};
use ssh::SshTarget;

/// Global context for the application
pub struct Context {
    pub check: bool,
    pub yes: bool,
    pub quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    // Completions need no connection
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = Cli::command();
        generate(*shell, &mut cmd, "pveadm", &mut io::stdout());
        return Ok(());
    }

    let ctx = Context {
        check: cli.check,
        yes: cli.yes,
        quiet: cli.quiet,
    };
    let client = connect(&cli)?;

    match cli.command {
        Commands::Acl(cmd) => match cmd {
            AclCommand::Apply(args) => commands::acl::apply(&ctx, &client, &args),
            AclCommand::Remove(args) => commands::acl::remove(&ctx, &client, &args),
            AclCommand::List => commands::acl::list(&client),
        },
        Commands::Group(cmd) => match cmd {
            GroupCommand::Create { group, comment } => {
                commands::group::create(&ctx, &client, &group, comment.as_deref())
            }
            GroupCommand::Remove { group } => commands::group::remove(&ctx, &client, &group),
            GroupCommand::List => commands::group::list(&client),
            GroupCommand::Show { group } => commands::group::show(&client, &group),
        },
        Commands::User(cmd) => match cmd {
            UserCommand::Create(args) => commands::user::create(&ctx, &client, &args),
            UserCommand::Remove { userid } => commands::user::remove(&ctx, &client, &userid),
            UserCommand::List => commands::user::list(&client),
        },
        Commands::Token(cmd) => match cmd {
            TokenCommand::Create(args) => commands::token::create(&ctx, &client, &args),
            TokenCommand::Remove { userid, tokenid } => {
                commands::token::remove(&ctx, &client, &userid, &tokenid)
            }
            TokenCommand::List { userid } => commands::token::list(&client, &userid),
        },
        Commands::Storage(cmd) => match cmd {
            StorageCommand::Create(args) => commands::storage::create(&ctx, &client, &args),
            StorageCommand::Remove { storage } => {
                commands::storage::remove(&ctx, &client, &storage)
            }
            StorageCommand::List => commands::storage::list(&client),
        },
        Commands::Completions { .. } => unreachable!("handled above"),
    }
}

/// Resolve connection settings: flags and environment win over the config
/// file; the SSH user falls back to root.
fn connect(cli: &Cli) -> Result<PveClient> {
    let config = config::Config::load()?;

    let host = cli
        .host
        .clone()
        .or(config.host)
        .context("no target host - pass --host, set PVEADM_HOST, or add it to the config file")?;
    let user = cli
        .user
        .clone()
        .or(config.user)
        .unwrap_or_else(|| "root".to_string());

    Ok(PveClient::new(SshTarget::new(&host, &user)))
}
